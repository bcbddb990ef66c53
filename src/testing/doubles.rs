use crate::config::DriverConfig;
use crate::device::Device;
use crate::errors::{CommandFailure, CommandResult, DriverError, DriverResult};
use crate::exec::CommandRunner;
use crate::host::Host;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Host double recording registrations and saved snapshots
#[derive(Debug, Default)]
pub struct MockHost {
    registered: Mutex<Vec<Arc<Device>>>,
    saved: Mutex<Vec<DriverConfig>>,
    fail_saves: AtomicBool,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registered(&self) -> Vec<Arc<Device>> {
        self.registered.lock().unwrap().clone()
    }

    pub fn registered_guids(&self) -> Vec<String> {
        self.registered()
            .iter()
            .map(|device| device.guid().to_string())
            .collect()
    }

    pub fn saves(&self) -> Vec<DriverConfig> {
        self.saved.lock().unwrap().clone()
    }

    pub fn last_save(&self) -> Option<DriverConfig> {
        self.saved.lock().unwrap().last().cloned()
    }

    /// Make subsequent `save` calls fail
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl Host for MockHost {
    fn register(&self, device: Arc<Device>) {
        self.registered.lock().unwrap().push(device);
    }

    fn save(&self, config: &DriverConfig) -> DriverResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(DriverError::Persistence("disk full".to_string()));
        }
        self.saved.lock().unwrap().push(config.clone());
        Ok(())
    }
}

/// Command runner returning scripted results; unknown commands fail with exit 127
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Mutex<HashMap<String, CommandResult>>,
    invocations: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, command: &str, result: CommandResult) {
        self.responses
            .lock()
            .unwrap()
            .insert(command.to_string(), result);
    }

    pub fn succeed(&self, command: &str, stdout: &str) {
        self.respond(command, Ok(stdout.to_string()));
    }

    pub fn fail(&self, command: &str, code: i32) {
        self.respond(
            command,
            Err(CommandFailure::ExitStatus {
                code: Some(code),
                stderr: String::new(),
            }),
        );
    }

    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn count(&self, command: &str) -> usize {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.as_str() == command)
            .count()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str) -> CommandResult {
        self.invocations.lock().unwrap().push(command.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(command)
            .cloned()
            .unwrap_or_else(|| {
                Err(CommandFailure::ExitStatus {
                    code: Some(127),
                    stderr: format!("{}: command not found", command),
                })
            })
    }
}
