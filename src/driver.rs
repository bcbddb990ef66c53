//! Device registry and poll scheduler
//!
//! The driver owns the camera list, the matching devices and the recurring
//! poll timer. Camera slots are removed logically: a removed camera leaves an
//! empty slot in both lists and its device stays registered with the host until
//! the process restarts.

use crate::config::DriverConfig;
use crate::device::Device;
use crate::errors::{DriverError, DriverResult};
use crate::events::{
    Event, EventEmitter, EventHandler, EventHub, SubscriptionId, POLL_EVENT, REGISTER_EVENT,
};
use crate::exec::CommandRunner;
use crate::host::Host;
use crate::types::{CameraConfig, Settings};
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

const DRIVER_SOURCE: &str = "ipcam-recorder";

/// Parallel camera/device slots. `None` marks a removed entry.
#[derive(Default)]
struct Registry {
    cameras: Vec<Option<CameraConfig>>,
    devices: Vec<Option<Arc<Device>>>,
    /// Identifiers of removed devices still registered with the host
    retired: HashSet<String>,
    ready: bool,
}

impl Registry {
    fn live_cameras(&self) -> impl Iterator<Item = &CameraConfig> {
        self.cameras.iter().flatten()
    }

    fn live_devices(&self) -> Vec<Arc<Device>> {
        self.devices.iter().flatten().cloned().collect()
    }

    fn check_unique(&self, camera: &CameraConfig) -> DriverResult<()> {
        let guid = camera.guid();
        if self
            .live_cameras()
            .any(|existing| existing.name == camera.name || existing.guid() == guid)
        {
            return Err(DriverError::DuplicateCamera(camera.name.clone()));
        }
        if self.retired.contains(&guid) {
            return Err(DriverError::Validation(format!(
                "Camera '{}' was removed and its device is still registered. \
                 Restart before adding it again.",
                camera.name
            )));
        }
        Ok(())
    }
}

/// Status checks started by one poll pass
#[derive(Debug, Default)]
pub struct PollPass {
    handles: Vec<JoinHandle<()>>,
}

impl PollPass {
    /// Number of devices polled
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every status check of this pass to finish
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

pub struct Driver {
    host: Arc<dyn Host>,
    runner: Arc<dyn CommandRunner>,
    registry: Mutex<Registry>,
    settings: watch::Sender<Settings>,
    events: EventHub,
    poll_passes: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Driver {
    /// Resolve the configuration and build an idle driver. Devices are created
    /// once the host signals readiness.
    pub fn initialize(
        config: DriverConfig,
        host: Arc<dyn Host>,
        runner: Arc<dyn CommandRunner>,
    ) -> DriverResult<Arc<Self>> {
        config.validate()?;
        let settings = config.settings();
        log::info!(
            "Initializing driver: {} cameras, pause {} ms, interval {} ms",
            config.cameras.len(),
            settings.pause_after_update_ms(),
            settings.update_interval_ms()
        );

        let (settings_tx, _) = watch::channel(settings);
        Ok(Arc::new(Self {
            host,
            runner,
            registry: Mutex::new(Registry {
                cameras: config.cameras.into_iter().map(Some).collect(),
                devices: Vec::new(),
                retired: HashSet::new(),
                ready: false,
            }),
            settings: settings_tx,
            events: EventHub::new(),
            poll_passes: AtomicU64::new(0),
            timer: Mutex::new(None),
        }))
    }

    /// Wait for the host's readiness signal in the background, then bring devices up
    pub fn start<F>(self: &Arc<Self>, ready: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let driver = Arc::clone(self);
        tokio::spawn(async move {
            ready.await;
            if let Err(e) = driver.on_ready() {
                log::warn!("Driver failed to come up: {}", e);
            }
        })
    }

    /// Create and register one device per configured camera, run an immediate
    /// poll pass and arm the recurring timer. Only the first call has any effect.
    pub fn on_ready(self: &Arc<Self>) -> DriverResult<PollPass> {
        let created = {
            let mut registry = self.registry.lock()?;
            if registry.ready {
                log::warn!("Ready signal received more than once, ignoring");
                return Ok(PollPass::default());
            }
            registry.ready = true;
            let devices: Vec<Option<Arc<Device>>> = registry
                .cameras
                .iter()
                .map(|slot| slot.as_ref().map(|camera| self.build_device(camera.clone())))
                .collect();
            registry.devices = devices;
            registry.live_devices()
        };

        for device in created {
            self.register(device);
        }

        let pass = self.poll_all();
        self.start_timer()?;
        Ok(pass)
    }

    pub fn is_ready(&self) -> bool {
        self.registry
            .lock()
            .map(|registry| registry.ready)
            .unwrap_or(false)
    }

    /// Check every live device's status. The checks run in the background; the
    /// returned pass may be dropped or joined.
    pub fn poll_all(&self) -> PollPass {
        let devices = match self.registry.lock() {
            Ok(registry) => registry.live_devices(),
            Err(_) => {
                log::warn!("Device registry poisoned, skipping poll pass");
                return PollPass::default();
            }
        };

        log::info!("Updating all devices ({})...", devices.len());
        let handles: Vec<JoinHandle<()>> = devices.iter().map(|d| d.poll_status()).collect();
        self.poll_passes.fetch_add(1, Ordering::SeqCst);
        self.events
            .emit(Event::new(POLL_EVENT, DRIVER_SOURCE, handles.len().to_string()));

        PollPass { handles }
    }

    /// Append a camera, persist, register its device and trigger a poll pass
    pub fn add_camera(&self, camera: CameraConfig) -> DriverResult<Option<Arc<Device>>> {
        camera.validate()?;

        let device = {
            let mut registry = self.registry.lock()?;
            registry.check_unique(&camera)?;

            let mut snapshot = self.snapshot_of(&registry);
            snapshot.cameras.push(camera.clone());
            self.host.save(&snapshot)?;

            // Before readiness the device is built with the rest at `on_ready`
            let device = registry
                .ready
                .then(|| self.build_device(camera.clone()));
            registry.cameras.push(Some(camera));
            if let Some(device) = &device {
                registry.devices.push(Some(Arc::clone(device)));
            }
            device
        };

        if let Some(device) = &device {
            self.register(Arc::clone(device));
        }
        let _ = self.poll_all();
        Ok(device)
    }

    /// Blank the camera's slots in both lists, persist and trigger a poll pass.
    /// The device stays in the host's device tree until restart.
    pub fn remove_camera(&self, name: &str) -> DriverResult<()> {
        {
            let mut registry = self.registry.lock()?;
            let camera_index = registry
                .cameras
                .iter()
                .position(|slot| matches!(slot, Some(camera) if camera.name == name))
                .ok_or_else(|| DriverError::CameraNotFound(name.to_string()))?;

            let mut snapshot = self.snapshot_of(&registry);
            snapshot.cameras.retain(|camera| camera.name != name);
            self.host.save(&snapshot)?;

            registry.cameras[camera_index] = None;
            let retired: Vec<String> = registry
                .devices
                .iter_mut()
                .filter(|slot| matches!(slot, Some(device) if device.camera().name == name))
                .filter_map(Option::take)
                .map(|device| device.guid().to_string())
                .collect();
            registry.retired.extend(retired);
        }

        log::info!("Removed camera {} (restart required to drop its device)", name);
        let _ = self.poll_all();
        Ok(())
    }

    /// Validate and apply new timings given in seconds, persist and trigger a poll pass
    pub fn update_settings(&self, pause_secs: f64, interval_secs: f64) -> DriverResult<Settings> {
        let settings = Settings::from_seconds(pause_secs, interval_secs)?;

        {
            // Published under the registry lock so a concurrent mutation never
            // persists the previous timings.
            let registry = self.registry.lock()?;
            let mut snapshot = self.snapshot_of(&registry);
            snapshot.pause_after_update_ms = settings.pause_after_update_ms();
            snapshot.update_interval_ms = settings.update_interval_ms();
            self.host.save(&snapshot)?;
            self.settings.send_replace(settings);
        }

        log::info!(
            "Settings updated: pause {} ms, interval {} ms",
            settings.pause_after_update_ms(),
            settings.update_interval_ms()
        );
        let _ = self.poll_all();
        Ok(settings)
    }

    pub fn settings(&self) -> Settings {
        *self.settings.borrow()
    }

    /// Live camera entries
    pub fn cameras(&self) -> Vec<CameraConfig> {
        self.registry
            .lock()
            .map(|registry| registry.live_cameras().cloned().collect())
            .unwrap_or_default()
    }

    /// Camera slots including removed (empty) entries
    pub fn camera_slots(&self) -> Vec<Option<CameraConfig>> {
        self.registry
            .lock()
            .map(|registry| registry.cameras.clone())
            .unwrap_or_default()
    }

    /// Live devices
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.registry
            .lock()
            .map(|registry| registry.live_devices())
            .unwrap_or_default()
    }

    /// Device slots including removed (empty) entries
    pub fn device_slots(&self) -> Vec<Option<Arc<Device>>> {
        self.registry
            .lock()
            .map(|registry| registry.devices.clone())
            .unwrap_or_default()
    }

    pub fn find_device(&self, guid: &str) -> Option<Arc<Device>> {
        self.devices().into_iter().find(|device| device.guid() == guid)
    }

    /// Snapshot of what would be persisted right now
    pub fn config_snapshot(&self) -> DriverResult<DriverConfig> {
        let registry = self.registry.lock()?;
        Ok(self.snapshot_of(&registry))
    }

    /// Number of poll passes run since initialization
    pub fn poll_passes(&self) -> u64 {
        self.poll_passes.load(Ordering::SeqCst)
    }

    /// Stop the recurring poll timer. In-flight commands are left to finish.
    pub fn shutdown(&self) {
        if let Ok(mut timer) = self.timer.lock() {
            if let Some(handle) = timer.take() {
                log::info!("Stopping poll timer");
                handle.abort();
            }
        }
    }

    fn build_device(&self, camera: CameraConfig) -> Arc<Device> {
        Arc::new(Device::new(
            camera,
            Arc::clone(&self.runner),
            self.settings.subscribe(),
        ))
    }

    fn register(&self, device: Arc<Device>) {
        let guid = device.guid().to_string();
        self.host.register(device);
        self.events.emit(Event::new(REGISTER_EVENT, DRIVER_SOURCE, guid));
    }

    fn snapshot_of(&self, registry: &Registry) -> DriverConfig {
        let settings = self.settings();
        DriverConfig {
            pause_after_update_ms: settings.pause_after_update_ms(),
            update_interval_ms: settings.update_interval_ms(),
            cameras: registry.live_cameras().cloned().collect(),
        }
    }

    fn start_timer(self: &Arc<Self>) -> DriverResult<()> {
        let handle = tokio::spawn(poll_loop(Arc::downgrade(self), self.settings.subscribe()));
        if let Some(previous) = self.timer.lock()?.replace(handle) {
            previous.abort();
        }
        Ok(())
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl EventEmitter for Driver {
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

/// Recurring poll timer. Re-arms whenever the update interval changes; a zero
/// interval parks the loop until the settings change again.
async fn poll_loop(driver: Weak<Driver>, mut settings: watch::Receiver<Settings>) {
    loop {
        let period = settings.borrow_and_update().update_interval;
        if period.is_zero() {
            log::info!("Periodic polling disabled (update interval is zero)");
            if settings.changed().await.is_err() {
                return;
            }
            continue;
        }

        log::debug!("Poll timer armed every {:?}", period);
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(driver) = driver.upgrade() else {
                        return;
                    };
                    let _ = driver.poll_all();
                }
                changed = settings.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    if settings.borrow_and_update().update_interval != period {
                        break;
                    }
                }
            }
        }
    }
}
