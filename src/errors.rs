use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Camera already exists: {0}")]
    DuplicateCamera(String),

    #[error("Camera not found: {0}")]
    CameraNotFound(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("lock poisoned by previous panic")]
    PoisonedLock,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DriverError {
    pub fn code(&self) -> &'static str {
        match self {
            DriverError::Config(_) => "CONFIG_ERROR",
            DriverError::Validation(_) => "VALIDATION_ERROR",
            DriverError::DuplicateCamera(_) => "DUPLICATE_CAMERA",
            DriverError::CameraNotFound(_) => "CAMERA_NOT_FOUND",
            DriverError::Persistence(_) => "PERSISTENCE_ERROR",
            DriverError::PoisonedLock => "POISONED_LOCK",
            DriverError::Io(_) => "IO_ERROR",
            DriverError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Validation failures are reported back to the user instead of the host.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DriverError::Validation(_)
                | DriverError::DuplicateCamera(_)
                | DriverError::CameraNotFound(_)
        )
    }
}

impl From<::config::ConfigError> for DriverError {
    fn from(error: ::config::ConfigError) -> Self {
        DriverError::Config(error.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for DriverError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        DriverError::PoisonedLock
    }
}

/// Error payload for RPC consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&DriverError> for ErrorResponse {
    fn from(error: &DriverError) -> Self {
        ErrorResponse {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

impl From<DriverError> for ErrorResponse {
    fn from(error: DriverError) -> Self {
        ErrorResponse::from(&error)
    }
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Failure of a single external command invocation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandFailure {
    #[error("failed to launch command: {0}")]
    Launch(String),

    #[error("command exited with status {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("command wrote to stderr: {0}")]
    Stderr(String),
}

pub type CommandResult = Result<String, CommandFailure>;
