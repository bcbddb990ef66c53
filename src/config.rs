//! Configuration management for the recorder driver
//!
//! Loads the timing settings and camera list from a TOML file (with `IPCAM_*`
//! environment overrides), validates them and writes the snapshot back when the
//! host asks the driver to persist.

use crate::errors::{DriverError, DriverResult};
use crate::types::{
    CameraConfig, Settings, DEFAULT_PAUSE_AFTER_UPDATE_MS, DEFAULT_UPDATE_INTERVAL_MS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment prefix for overrides, e.g. `IPCAM_UPDATE_INTERVAL_MS=60000`
pub const ENV_PREFIX: &str = "IPCAM";

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Milliseconds to wait after a record/stop command before re-checking status
    pub pause_after_update_ms: u64,
    /// Milliseconds between poll passes
    pub update_interval_ms: u64,
    /// Configured cameras
    pub cameras: Vec<CameraConfig>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            pause_after_update_ms: DEFAULT_PAUSE_AFTER_UPDATE_MS,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            cameras: Vec::new(),
        }
    }
}

impl DriverConfig {
    /// Load configuration from a TOML file layered with environment overrides.
    /// A missing file yields the built-in defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> DriverResult<Self> {
        let path = path.as_ref();

        let layered = ::config::Config::builder()
            .add_source(
                ::config::File::from(path.to_path_buf())
                    .format(::config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: DriverConfig = layered.try_deserialize()?;
        config.validate()?;

        log::info!(
            "Loaded configuration from {:?} ({} cameras)",
            path,
            config.cameras.len()
        );
        Ok(config)
    }

    /// Load configuration from a TOML file without environment overrides
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> DriverResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| DriverError::Config(format!("Failed to read config file: {}", e)))?;

        let config: DriverConfig = toml::from_str(&contents)
            .map_err(|e| DriverError::Config(format!("Failed to parse config file: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DriverResult<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    DriverError::Persistence(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self).map_err(|e| {
            DriverError::Persistence(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, toml_string).map_err(|e| {
            DriverError::Persistence(format!("Failed to write config file: {}", e))
        })?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("ipcam-recorder.toml")
    }

    pub fn settings(&self) -> Settings {
        Settings::from_millis(self.pause_after_update_ms, self.update_interval_ms)
    }

    /// Validate camera entries: well-formed and unique by name and identifier
    pub fn validate(&self) -> DriverResult<()> {
        let mut names = HashSet::new();
        let mut guids = HashSet::new();
        for camera in &self.cameras {
            camera.validate()?;
            if !names.insert(camera.name.as_str()) || !guids.insert(camera.guid()) {
                return Err(DriverError::DuplicateCamera(camera.name.clone()));
            }
        }
        Ok(())
    }
}
