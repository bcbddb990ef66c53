pub mod config;
pub mod forms;

pub use self::config::*;
pub use self::forms::*;
