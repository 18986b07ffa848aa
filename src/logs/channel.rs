use crate::config::LogConfig;
use crate::console;
use crate::error::{LogError, Result};
use crate::logs::format::Formatter;
use crate::logs::record::{Fields, LogRecord, Severity};
use crate::logs::rotation::{Clock, FileTemplate, RotatingFile};
use crate::logs::routing::RoutingTable;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

/// The two independent log channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Leveled application messages
    General,
    /// Structured HTTP access records
    Access,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::General => "general",
            ChannelKind::Access => "access",
        }
    }

    /// Formatter used for this channel's files
    pub fn formatter(&self) -> Formatter {
        match self {
            ChannelKind::General => Formatter::Plain,
            ChannelKind::Access => Formatter::Access,
        }
    }

    /// Routing table this channel uses under `config`
    pub fn routing(&self, config: &LogConfig) -> RoutingTable {
        match self {
            ChannelKind::General => config.routing.clone(),
            ChannelKind::Access => RoutingTable::access(),
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One rotating file plus whether its last write failed
struct FileGroup {
    file: RotatingFile,
    /// Set while writes keep failing, so a failure streak is reported once
    failing: bool,
}

/// A log channel: routes records to its file groups and optionally echoes them
pub struct Channel {
    kind: ChannelKind,
    routing: RoutingTable,
    formatter: Formatter,
    level: Severity,
    console_echo: bool,
    clock: Arc<dyn Clock>,
    /// File groups keyed by file prefix
    groups: BTreeMap<String, Mutex<FileGroup>>,
}

impl Channel {
    /// Bootstrap a channel under `config`
    ///
    /// # Arguments
    /// * `kind` - Which channel to build
    /// * `config` - Directory, thresholds, level and routing
    /// * `console_echo` - Whether records are also echoed to stdout
    /// * `clock` - Time source for timestamps and rotation
    ///
    /// # Returns
    /// * `Ok(Channel)` - Directory is usable; files open on first write
    /// * `Err(LogError)` - Invalid configuration or unusable directory
    pub fn open(
        kind: ChannelKind,
        config: &LogConfig,
        console_echo: bool,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        let routing = kind.routing(config);

        fs::create_dir_all(&config.log_dir).map_err(|e| {
            LogError::DirectoryError(format!(
                "Failed to create log directory {}: {}",
                config.log_dir.display(),
                e
            ))
        })?;
        if !config.log_dir.is_dir() {
            return Err(LogError::DirectoryError(format!(
                "Not a directory: {}",
                config.log_dir.display()
            )));
        }

        let policy = config.rotation_policy();
        let groups = routing
            .prefixes()
            .into_iter()
            .map(|prefix| {
                let file = RotatingFile::new(
                    &config.log_dir,
                    FileTemplate::new(prefix),
                    policy,
                    config.retention(),
                    Arc::clone(&clock),
                );
                (
                    prefix.to_string(),
                    Mutex::new(FileGroup {
                        file,
                        failing: false,
                    }),
                )
            })
            .collect();

        Ok(Self {
            kind,
            formatter: kind.formatter(),
            routing,
            level: config.level,
            console_echo,
            clock,
            groups,
        })
    }

    /// Whether records of `severity` pass the level filter
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.level
    }

    /// Build a record stamped with the channel clock and write it
    pub fn emit(&self, severity: Severity, message: String, fields: Fields) {
        if !self.enabled(severity) {
            return;
        }
        let record = LogRecord::new(self.clock.now(), severity, message).with_fields(fields);
        self.write(&record);
    }

    /// Write a record to its routed file and echo it when enabled
    ///
    /// The echo is a sink of its own: every record that passed the level
    /// filter is echoed, including ones with no routed file or whose write
    /// fails. Write failures are reported on the console and the record is
    /// dropped from the file.
    pub fn write(&self, record: &LogRecord) {
        if self.console_echo {
            console::echo(record);
        }

        let group = match self
            .routing
            .target(record.severity)
            .and_then(|prefix| self.groups.get(prefix))
        {
            Some(group) => group,
            None => return,
        };

        let line = self.formatter.format(record);

        let mut group = group.lock();
        match group.file.write_line(line.as_bytes()) {
            Ok(()) => group.failing = false,
            Err(e) => {
                if !group.failing {
                    error!(channel = %self.kind, "Dropped log record: {}", e);
                    console::print_error(&e.to_string());
                }
                group.failing = true;
            }
        }
    }

    /// Run a retention sweep over every file group
    ///
    /// Returns the number of files deleted.
    pub fn sweep_expired(&self) -> usize {
        let mut deleted = 0;
        for group in self.groups.values() {
            let group = group.lock();
            match group.file.sweep_expired() {
                Ok(count) => deleted += count,
                Err(e) => {
                    error!(channel = %self.kind, "Retention sweep failed: {}", e);
                    console::print_error(&e.to_string());
                }
            }
        }
        deleted
    }

    /// Paths of the currently open files
    pub fn active_paths(&self) -> Vec<PathBuf> {
        self.groups
            .values()
            .filter_map(|group| group.lock().file.state().map(|state| state.path.clone()))
            .collect()
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn console_echo(&self) -> bool {
        self.console_echo
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::rotation::ManualClock;
    use chrono::{Local, TimeZone};
    use tempfile::TempDir;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2024, 7, 4, 12, 0, 0).unwrap(),
        ))
    }

    fn read(dir: &std::path::Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap_or_default()
    }

    #[test]
    fn test_general_channel_routing() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::with_dir(temp_dir.path());
        let channel = Channel::open(ChannelKind::General, &config, false, clock()).unwrap();

        channel.emit(Severity::Info, "started".to_string(), Fields::new());
        channel.emit(Severity::Warn, "slow".to_string(), Fields::new());
        channel.emit(Severity::Error, "broken".to_string(), Fields::new());

        let info = read(temp_dir.path(), "info.2024-07-04.log");
        let errors = read(temp_dir.path(), "error.2024-07-04.log");
        assert_eq!(
            info,
            "[2024-07-04 12:00:00] [info] started\n[2024-07-04 12:00:00] [warning] slow\n"
        );
        assert_eq!(errors, "[2024-07-04 12:00:00] [error] broken\n");
    }

    #[test]
    fn test_level_filter_drops_debug() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::with_dir(temp_dir.path());
        let channel = Channel::open(ChannelKind::General, &config, false, clock()).unwrap();

        channel.emit(Severity::Debug, "noise".to_string(), Fields::new());

        assert!(!channel.enabled(Severity::Debug));
        assert!(!temp_dir.path().join("info.2024-07-04.log").exists());
    }

    #[test]
    fn test_unrouted_severity_skips_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig {
            routing: RoutingTable::empty().route(Severity::Error, "error"),
            ..LogConfig::with_dir(temp_dir.path())
        };
        let channel = Channel::open(ChannelKind::General, &config, false, clock()).unwrap();

        channel.emit(Severity::Info, "nowhere".to_string(), Fields::new());

        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_access_channel_format() {
        let temp_dir = TempDir::new().unwrap();
        let config = LogConfig::with_dir(temp_dir.path());
        let channel = Channel::open(ChannelKind::Access, &config, false, clock()).unwrap();

        let fields = Fields::new()
            .with("ip", "172.16.0.9")
            .with("method", "DELETE")
            .with("url", "/items/7")
            .with("status_code", 204)
            .with("response_size", 0);
        channel.emit(Severity::Info, "deleted".to_string(), fields);

        assert_eq!(
            read(temp_dir.path(), "access.2024-07-04.log"),
            "[2024-07-04 12:00:00] [172.16.0.9] [DELETE] [/items/7] [204] [0] deleted\n"
        );
        assert_eq!(
            channel.active_paths(),
            vec![temp_dir.path().join("access.2024-07-04.log")]
        );
    }

    #[test]
    fn test_open_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let config = LogConfig::with_dir(&nested);

        let channel = Channel::open(ChannelKind::General, &config, false, clock());
        assert!(channel.is_ok());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_open_fails_under_regular_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let config = LogConfig::with_dir(blocker.join("logs"));

        let result = Channel::open(ChannelKind::General, &config, false, clock());
        assert!(matches!(result, Err(LogError::DirectoryError(_))));
    }

    #[test]
    fn test_write_failure_drops_record() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("logs");
        let config = LogConfig::with_dir(&log_dir);
        let channel = Channel::open(ChannelKind::General, &config, false, clock()).unwrap();

        // Directory vanishes after bootstrap
        fs::remove_dir_all(&log_dir).unwrap();
        channel.emit(Severity::Info, "lost".to_string(), Fields::new());
        channel.emit(Severity::Info, "lost again".to_string(), Fields::new());
        assert!(channel.active_paths().is_empty());

        // Writes resume once the directory is back
        fs::create_dir_all(&log_dir).unwrap();
        channel.emit(Severity::Info, "back".to_string(), Fields::new());
        assert_eq!(
            read(&log_dir, "info.2024-07-04.log"),
            "[2024-07-04 12:00:00] [info] back\n"
        );
    }
}
