//! Testing utilities for the recorder driver
//!
//! In-memory stand-ins for the host and the shell so driver behaviour can be
//! exercised offline, plus a `log` capture for asserting on warnings.

pub mod doubles;
pub mod logs;

pub use doubles::{MockHost, ScriptedRunner};
pub use logs::LogCapture;
