use crate::logs::{Channel, ChannelKind, Fields, Severity};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Lifecycle state of a channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    Uninitialized,
    Active,
    /// Bootstrap failed; every emission is a no-op
    Failed(String),
}

pub(crate) enum ChannelSlot {
    Uninitialized,
    Active(Channel),
    Failed(String),
}

/// Handle to one log channel
///
/// Cheap to clone; clones share the channel, so a reconfiguration through
/// `Logging::set_config` is seen by every handle. When the channel is not
/// active every operation returns without doing anything.
#[derive(Clone)]
pub struct Logger {
    kind: ChannelKind,
    slot: Arc<RwLock<ChannelSlot>>,
}

impl Logger {
    pub(crate) fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            slot: Arc::new(RwLock::new(ChannelSlot::Uninitialized)),
        }
    }

    pub(crate) fn slot(&self) -> &RwLock<ChannelSlot> {
        &self.slot
    }

    /// Whether a record of `severity` would be written
    pub fn enabled(&self, severity: Severity) -> bool {
        match &*self.slot.read() {
            ChannelSlot::Active(channel) => channel.enabled(severity),
            _ => false,
        }
    }

    /// Emit a record with structured fields
    ///
    /// The message is rendered with no lock held, so its `Display` impl may
    /// itself use this logger.
    pub fn log_with_fields(&self, severity: Severity, message: impl fmt::Display, fields: Fields) {
        if !self.enabled(severity) {
            return;
        }
        let message = message.to_string();

        if let ChannelSlot::Active(channel) = &*self.slot.read() {
            channel.emit(severity, message, fields);
        }
    }

    /// Emit a record without fields
    pub fn log(&self, severity: Severity, message: impl fmt::Display) {
        self.log_with_fields(severity, message, Fields::new());
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(Severity::Info, message);
    }

    pub fn warn(&self, message: impl fmt::Display) {
        self.log(Severity::Warn, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(Severity::Error, message);
    }

    /// Write a fatal record, then exit the process with status 1
    pub fn fatal(&self, message: impl fmt::Display) -> ! {
        self.log(Severity::Fatal, message);
        std::process::exit(1)
    }

    /// Write a panic record, then panic with the same message
    pub fn panic(&self, message: impl fmt::Display) -> ! {
        let message = message.to_string();
        self.log(Severity::Panic, &message);
        panic!("{}", message)
    }

    /// Record an access entry (ip, method, url, status_code, response_size)
    pub fn access_info(&self, message: impl fmt::Display, fields: Fields) {
        self.log_with_fields(Severity::Info, message, fields);
    }

    /// Run a retention sweep; returns the number of files deleted
    pub fn sweep_expired(&self) -> usize {
        match &*self.slot.read() {
            ChannelSlot::Active(channel) => channel.sweep_expired(),
            _ => 0,
        }
    }

    pub fn status(&self) -> ChannelStatus {
        match &*self.slot.read() {
            ChannelSlot::Uninitialized => ChannelStatus::Uninitialized,
            ChannelSlot::Active(_) => ChannelStatus::Active,
            ChannelSlot::Failed(reason) => ChannelStatus::Failed(reason.clone()),
        }
    }

    /// Whether records are echoed to stdout
    pub fn console_echo(&self) -> bool {
        match &*self.slot.read() {
            ChannelSlot::Active(channel) => channel.console_echo(),
            _ => false,
        }
    }

    /// Paths of the files currently open on this channel
    pub fn active_paths(&self) -> Vec<std::path::PathBuf> {
        match &*self.slot.read() {
            ChannelSlot::Active(channel) => channel.active_paths(),
            _ => Vec::new(),
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("kind", &self.kind)
            .field("status", &self.status())
            .finish()
    }
}
