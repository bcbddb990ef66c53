//! ipcam-recorder: IP camera recorder driver for home-automation hosts
//!
//! Each configured camera becomes a writable state device. Writing `record` or
//! `stop` runs the camera's shell command (typically over SSH); a recurring poll
//! pass runs every camera's status command and emits the trimmed output as a
//! `data` event. Cameras and timings are edited through the host's form RPC.
//!
//! # Usage
//! ```rust,ignore
//! use ipcam_recorder::{Driver, DriverConfig, FileHost, ShellRunner};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     ipcam_recorder::init_logging();
//!     let config = DriverConfig::load("ipcam-recorder.toml")?;
//!     let host = Arc::new(FileHost::new("ipcam-recorder.toml"));
//!     let driver = Driver::initialize(config, host, Arc::new(ShellRunner::new()))?;
//!     driver.start(async {});
//!     tokio::signal::ctrl_c().await?;
//!     driver.shutdown();
//!     Ok(())
//! }
//! ```
pub mod commands;
pub mod config;
#[cfg(feature = "standalone")]
pub mod console;
pub mod device;
pub mod driver;
pub mod errors;
pub mod events;
pub mod exec;
pub mod host;
pub mod types;

// Testing utilities - in-memory host and scripted shell
pub mod testing;

// Re-exports for convenience
pub use commands::{handle_config_rpc, FormItem, FormResponse, RpcRequest};
pub use crate::config::DriverConfig;
pub use device::{Device, DeviceAction, DeviceInfo};
pub use driver::{Driver, PollPass};
pub use errors::{CommandFailure, CommandResult, DriverError, DriverResult};
pub use events::{Event, EventEmitter, EventHub};
pub use exec::{CommandRunner, ShellRunner};
pub use host::{FileHost, Host};
pub use types::{CameraConfig, Settings};

/// Initialize logging for the driver
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "ipcam_recorder=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}
