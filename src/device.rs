//! A single IP camera exposed to the host as a writable state device
//!
//! Writing `record` or `stop` runs the matching shell command, waits the
//! configured pause and re-checks the camera status. Status checks emit a
//! `data` event with the trimmed command output; failures are logged and
//! swallowed.

use crate::errors::CommandResult;
use crate::events::{Event, EventEmitter, EventHandler, EventHub, SubscriptionId, DATA_EVENT};
use crate::exec::CommandRunner;
use crate::types::{display_name, CameraConfig, Settings, DEVICE_TYPE, VENDOR_ID};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const RECORD_TRIGGER: &str = "record";
pub const STOP_TRIGGER: &str = "stop";

/// Commands a caller can trigger through `write`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAction {
    Record,
    Stop,
}

impl DeviceAction {
    /// Exact, case-sensitive match on the trigger token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            RECORD_TRIGGER => Some(Self::Record),
            STOP_TRIGGER => Some(Self::Stop),
            _ => None,
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            Self::Record => RECORD_TRIGGER,
            Self::Stop => STOP_TRIGGER,
        }
    }
}

/// Identity metadata reported to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub guid: String,
    pub name: String,
    pub vendor_id: u32,
    pub device_type: u32,
    pub readable: bool,
    pub writable: bool,
}

pub struct Device {
    info: DeviceInfo,
    camera: CameraConfig,
    runner: Arc<dyn CommandRunner>,
    settings: watch::Receiver<Settings>,
    events: EventHub,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("info", &self.info)
            .field("camera", &self.camera)
            .finish_non_exhaustive()
    }
}

impl Device {
    pub fn new(
        camera: CameraConfig,
        runner: Arc<dyn CommandRunner>,
        settings: watch::Receiver<Settings>,
    ) -> Self {
        let info = DeviceInfo {
            guid: camera.guid(),
            name: display_name(&camera.name),
            vendor_id: VENDOR_ID,
            device_type: DEVICE_TYPE,
            readable: true,
            writable: true,
        };
        log::info!("Creating device {} ({}), readable and writable", info.name, info.guid);

        Self {
            info,
            camera,
            runner,
            settings,
            events: EventHub::new(),
        }
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    pub fn guid(&self) -> &str {
        &self.info.guid
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    pub fn camera(&self) -> &CameraConfig {
        &self.camera
    }

    /// Command string bound to an action
    pub fn command_for(&self, action: DeviceAction) -> &str {
        match action {
            DeviceAction::Record => &self.camera.record_command,
            DeviceAction::Stop => &self.camera.stop_command,
        }
    }

    /// Handle a write from the host. Unknown tokens are ignored and return `None`;
    /// otherwise the command runs in the background and the handle may be dropped.
    pub fn write(self: &Arc<Self>, token: &str) -> Option<JoinHandle<()>> {
        log::info!("Device {} received data: {}", self.info.name, token);
        let Some(action) = DeviceAction::from_token(token) else {
            log::debug!("Device {} ignoring unknown token {:?}", self.info.guid, token);
            return None;
        };

        let device = Arc::clone(self);
        Some(tokio::spawn(async move {
            let _ = device.execute(action).await;
        }))
    }

    /// Run the action's command, then pause and re-check status
    pub async fn execute(&self, action: DeviceAction) -> CommandResult {
        let command = self.command_for(action);
        log::info!("{} executing {} command: {}", self.info.name, action.token(), command);

        let result = self.runner.run(command).await;
        match &result {
            Ok(stdout) => log::info!(
                "{} {} command finished: {}",
                self.info.name,
                action.token(),
                stdout.trim()
            ),
            Err(failure) => log::warn!(
                "{} ({}) {} command failed: {}",
                self.info.name,
                self.info.guid,
                action.token(),
                failure
            ),
        }

        let pause = self.settings.borrow().pause_after_update;
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        let _ = self.check_status().await;

        result
    }

    /// Issue the status check in the background
    pub fn poll_status(self: &Arc<Self>) -> JoinHandle<()> {
        let device = Arc::clone(self);
        tokio::spawn(async move {
            let _ = device.check_status().await;
        })
    }

    /// Run the status command; emits `data` with the trimmed output on success
    pub async fn check_status(&self) -> CommandResult {
        log::info!(
            "{} executing status command: {}",
            self.info.name,
            self.camera.check_status_command
        );

        let result = self.runner.run(&self.camera.check_status_command).await;
        match &result {
            Ok(stdout) => {
                let value = stdout.trim();
                log::info!("Updating device {} - emitting data: {}", self.info.name, value);
                self.events.emit(Event::new(DATA_EVENT, &self.info.guid, value));
            }
            Err(failure) => log::warn!(
                "{} ({}) status check failed: {}",
                self.info.name,
                self.info.guid,
                failure
            ),
        }
        result
    }
}

impl EventEmitter for Device {
    fn emit(&self, event: Event) {
        self.events.emit(event);
    }

    fn subscribe(&self, name: &str, handler: EventHandler) -> SubscriptionId {
        self.events.subscribe(name, handler)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}
