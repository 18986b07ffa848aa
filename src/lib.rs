// Library exports for pm-log

#[macro_use]
mod macros;

pub mod config;
pub mod console;
pub mod error;
pub mod logger;
pub mod logs;

pub use config::{Environment, LogConfig};
pub use error::{LogError, Result};
pub use logger::{ChannelStatus, Logger, Logging};
pub use logs::{ChannelKind, FieldValue, Fields, Severity};
