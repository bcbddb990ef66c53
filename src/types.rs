//! Core data types: camera definitions, runtime settings and device identity.

use crate::errors::{DriverError, DriverResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vendor id reported for every device
pub const VENDOR_ID: u32 = 0;
/// Generic state device
pub const DEVICE_TYPE: u32 = 244;
/// Prefix of every generated device identifier
pub const GUID_PREFIX: &str = "ipcr";
/// Prefix of every device display name
pub const DISPLAY_NAME_PREFIX: &str = "IP Cam Recorder - ";

pub const DEFAULT_PAUSE_AFTER_UPDATE_MS: u64 = 5_000;
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 300_000;

/// Shell commands controlling a single camera
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub name: String,
    pub record_command: String,
    pub stop_command: String,
    pub check_status_command: String,
}

impl CameraConfig {
    pub fn new(
        name: impl Into<String>,
        record_command: impl Into<String>,
        stop_command: impl Into<String>,
        check_status_command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            record_command: record_command.into(),
            stop_command: stop_command.into(),
            check_status_command: check_status_command.into(),
        }
    }

    /// Internal identifier derived from the camera name
    pub fn guid(&self) -> String {
        device_guid(&self.name)
    }

    pub fn validate(&self) -> DriverResult<()> {
        if self.name.trim().is_empty() {
            return Err(DriverError::Validation(
                "Camera name can't be empty".to_string(),
            ));
        }
        if sanitize_name(&self.name).is_empty() {
            return Err(DriverError::Validation(format!(
                "Camera name '{}' must contain at least one letter or digit",
                self.name
            )));
        }
        for (label, command) in [
            ("record", &self.record_command),
            ("stop", &self.stop_command),
            ("check status", &self.check_status_command),
        ] {
            if command.trim().is_empty() {
                return Err(DriverError::Validation(format!(
                    "The {} command for '{}' can't be empty",
                    label, self.name
                )));
            }
        }
        Ok(())
    }
}

/// Strip everything but ASCII letters and digits
pub fn sanitize_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

pub fn device_guid(name: &str) -> String {
    format!("{}{}", GUID_PREFIX, sanitize_name(name))
}

pub fn display_name(name: &str) -> String {
    format!("{}{}", DISPLAY_NAME_PREFIX, name)
}

/// Process-wide timing settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Delay between a record/stop command finishing and the status re-check
    pub pause_after_update: Duration,
    /// Period of the recurring poll pass; zero disables the timer
    pub update_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pause_after_update: Duration::from_millis(DEFAULT_PAUSE_AFTER_UPDATE_MS),
            update_interval: Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS),
        }
    }
}

impl Settings {
    pub fn from_millis(pause_after_update_ms: u64, update_interval_ms: u64) -> Self {
        Self {
            pause_after_update: Duration::from_millis(pause_after_update_ms),
            update_interval: Duration::from_millis(update_interval_ms),
        }
    }

    /// Build settings from user-supplied seconds, rejecting negative, non-finite
    /// or out-of-range values
    pub fn from_seconds(pause_secs: f64, interval_secs: f64) -> DriverResult<Self> {
        let pause_ms = checked_millis(pause_secs, "The 'pause after update' interval")?;
        let interval_ms = checked_millis(interval_secs, "The 'update interval'")?;
        Ok(Self::from_millis(pause_ms, interval_ms))
    }

    pub fn pause_after_update_ms(&self) -> u64 {
        self.pause_after_update.as_millis() as u64
    }

    pub fn update_interval_ms(&self) -> u64 {
        self.update_interval.as_millis() as u64
    }

    pub fn pause_after_update_secs(&self) -> f64 {
        self.pause_after_update.as_secs_f64()
    }

    pub fn update_interval_secs(&self) -> f64 {
        self.update_interval.as_secs_f64()
    }
}

/// Largest millisecond count the TOML config file can hold
pub const MAX_SETTING_MS: u64 = i64::MAX as u64;

fn checked_millis(secs: f64, label: &str) -> DriverResult<u64> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(DriverError::Validation(format!(
            "{} must be a number and can't be negative. Please try again.",
            label
        )));
    }
    let millis = (secs * 1000.0).round();
    if millis >= MAX_SETTING_MS as f64 {
        return Err(DriverError::Validation(format!(
            "{} is too large. Please try again.",
            label
        )));
    }
    Ok(millis as u64)
}
