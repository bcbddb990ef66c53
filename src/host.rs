//! Host contract: device registration and configuration persistence

use crate::config::DriverConfig;
use crate::device::Device;
use crate::errors::{DriverError, DriverResult};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Services the hosting application provides to the driver
pub trait Host: Send + Sync {
    /// Add a device to the host's live device tree. There is no inverse.
    fn register(&self, device: Arc<Device>);

    /// Flush the current settings and camera list to durable storage
    fn save(&self, config: &DriverConfig) -> DriverResult<()>;
}

/// Standalone host keeping its device tree in memory and persisting to a TOML file
#[derive(Debug)]
pub struct FileHost {
    path: PathBuf,
    devices: Mutex<Vec<Arc<Device>>>,
}

impl FileHost {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            devices: Mutex::new(Vec::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.devices
            .lock()
            .map(|devices| devices.clone())
            .unwrap_or_default()
    }

    pub fn find(&self, guid: &str) -> Option<Arc<Device>> {
        self.devices()
            .into_iter()
            .find(|device| device.guid() == guid)
    }
}

impl Host for FileHost {
    fn register(&self, device: Arc<Device>) {
        log::info!("Registering device {} ({})", device.name(), device.guid());
        match self.devices.lock() {
            Ok(mut devices) => devices.push(device),
            Err(_) => log::warn!("Device tree poisoned, {} not registered", device.guid()),
        }
    }

    /// Blocking write, called with the driver's registry lock held. The file is
    /// a few hundred bytes; move this to `spawn_blocking` if it grows.
    fn save(&self, config: &DriverConfig) -> DriverResult<()> {
        config.save_to_file(&self.path).map_err(|e| match e {
            DriverError::Persistence(_) => e,
            other => DriverError::Persistence(other.to_string()),
        })
    }
}
