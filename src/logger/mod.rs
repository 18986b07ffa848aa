// Logger module - channel facade and bootstrap of both channels

mod facade;

pub use facade::{ChannelStatus, Logger};

use crate::config::{Environment, LogConfig};
use crate::console;
use crate::logs::{Channel, ChannelKind, Clock, SystemClock};
use facade::ChannelSlot;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{error, info};

/// Owner of the logging configuration and both channels
///
/// Constructed once by the host application; components receive `Logger`
/// clones from `general()` and `access()`.
pub struct Logging {
    config: RwLock<LogConfig>,
    general: Logger,
    access: Logger,
    clock: Arc<dyn Clock>,
    environment: Environment,
}

impl Logging {
    /// Bootstrap both channels with the system clock and process environment
    pub fn new(config: LogConfig) -> Self {
        Self::with_parts(config, Arc::new(SystemClock), Environment::from_process())
    }

    /// Bootstrap both channels with the default configuration
    pub fn with_defaults() -> Self {
        Self::new(LogConfig::default())
    }

    /// Bootstrap both channels with an explicit clock and environment
    ///
    /// Never fails: a channel that cannot be bootstrapped is left in the
    /// failed state and the reason is printed to the console.
    pub fn with_parts(config: LogConfig, clock: Arc<dyn Clock>, environment: Environment) -> Self {
        let logging = Self {
            config: RwLock::new(config.clone()),
            general: Logger::new(ChannelKind::General),
            access: Logger::new(ChannelKind::Access),
            clock,
            environment,
        };
        logging.set_config(config);
        logging
    }

    /// Replace the configuration and re-initialize both channels
    ///
    /// Blocks until in-flight writes finish; old files are closed before the
    /// new channels are opened.
    pub fn set_config(&self, config: LogConfig) {
        let mut current = self.config.write();
        let mut general = self.general.slot().write();
        let mut access = self.access.slot().write();

        *general = ChannelSlot::Uninitialized;
        *access = ChannelSlot::Uninitialized;

        let console_echo = config.console_echo && self.environment.is_development();
        *general = self.bootstrap(ChannelKind::General, &config, console_echo);
        *access = self.bootstrap(ChannelKind::Access, &config, console_echo);

        info!(
            log_dir = %config.log_dir.display(),
            console_echo,
            "Logging configured"
        );
        *current = config;
    }

    fn bootstrap(&self, kind: ChannelKind, config: &LogConfig, console_echo: bool) -> ChannelSlot {
        match Channel::open(kind, config, console_echo, Arc::clone(&self.clock)) {
            Ok(channel) => ChannelSlot::Active(channel),
            Err(e) => {
                error!(channel = %kind, "Failed to initialize log channel: {}", e);
                console::print_error(&format!("Failed to initialize {} log: {}", kind, e));
                ChannelSlot::Failed(e.to_string())
            }
        }
    }

    /// Snapshot of the active configuration
    pub fn config(&self) -> LogConfig {
        self.config.read().clone()
    }

    /// Handle to the general channel
    pub fn general(&self) -> &Logger {
        &self.general
    }

    /// Handle to the access channel
    pub fn access(&self) -> &Logger {
        &self.access
    }

    /// Run a retention sweep on both channels; returns the number of files deleted
    pub fn sweep_expired(&self) -> usize {
        self.general.sweep_expired() + self.access.sweep_expired()
    }
}

impl Default for Logging {
    fn default() -> Self {
        Self::with_defaults()
    }
}
