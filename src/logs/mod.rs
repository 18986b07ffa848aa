// Logs module - record rendering, rotation, retention and channel dispatch

mod channel;
pub mod format;
mod record;
pub mod retention;
pub mod rotation;
mod routing;

pub use channel::{Channel, ChannelKind};
pub use format::Formatter;
pub use record::{FieldValue, Fields, LogRecord, Severity};
pub use retention::prune_expired;
pub use rotation::{
    Clock, FileTemplate, ManualClock, RotatingFile, RotationPolicy, RotationState, SystemClock,
};
pub use routing::{RoutingTable, ACCESS_PREFIX};
