#![allow(dead_code)]

use ipcam_recorder::events::{Event, EventEmitter, DATA_EVENT};
use ipcam_recorder::testing::{MockHost, ScriptedRunner};
use ipcam_recorder::{CameraConfig, Device, Driver, DriverConfig};
use std::sync::{Arc, Mutex};

pub fn camera(name: &str) -> CameraConfig {
    let key = name.to_lowercase().replace(' ', "-");
    CameraConfig::new(
        name,
        format!("ssh cam@10.0.0.2 ~/ipcam.sh start {}", key),
        format!("ssh cam@10.0.0.2 ~/ipcam.sh stop {}", key),
        format!("ssh cam@10.0.0.2 ~/ipcam.sh status {}", key),
    )
}

/// Driver with no pause and no periodic timer, so tests control every pass
pub fn quiet_driver(cameras: Vec<CameraConfig>) -> (Arc<Driver>, Arc<MockHost>, Arc<ScriptedRunner>) {
    let host = Arc::new(MockHost::new());
    let runner = Arc::new(ScriptedRunner::new());
    let config = DriverConfig {
        pause_after_update_ms: 0,
        update_interval_ms: 0,
        cameras,
    };
    let driver = Driver::initialize(config, host.clone(), runner.clone()).unwrap();
    (driver, host, runner)
}

/// Collect the payloads of every `data` event a device emits
pub fn collect_data(device: &Device) -> Arc<Mutex<Vec<String>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    device.subscribe(
        DATA_EVENT,
        Arc::new(move |event: &Event| sink.lock().unwrap().push(event.payload.clone())),
    );
    seen
}
