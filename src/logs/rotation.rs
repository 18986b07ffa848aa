use crate::error::{LogError, Result};
use crate::logs::retention;
use chrono::{DateTime, Local, NaiveDate};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Date layout embedded in log file names
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Source of the current time for rotation decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        if let Some(next) = chrono::Duration::from_std(by)
            .ok()
            .and_then(|step| now.checked_add_signed(step))
        {
            *now = next;
        }
    }

    pub fn set(&self, to: DateTime<Local>) {
        *self.now.lock() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock()
    }
}

/// File naming scheme of one file group: `<prefix>.<YYYY-MM-DD>.log[.N]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTemplate {
    prefix: String,
}

impl FileTemplate {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// File name for a date and generation (generation 0 has no suffix)
    pub fn file_name(&self, date: NaiveDate, generation: u32) -> String {
        let base = format!("{}.{}.log", self.prefix, date.format(DATE_FORMAT));
        if generation == 0 {
            base
        } else {
            format!("{}.{}", base, generation)
        }
    }

    /// Parse a file name produced by this template back into (date, generation)
    pub fn parse(&self, name: &str) -> Option<(NaiveDate, u32)> {
        let rest = name.strip_prefix(self.prefix.as_str())?.strip_prefix('.')?;
        let date_part = rest.get(..10)?;
        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT).ok()?;
        let suffix = rest.get(10..)?.strip_prefix(".log")?;

        if suffix.is_empty() {
            return Some((date, 0));
        }

        let generation = suffix.strip_prefix('.')?.parse::<u32>().ok()?;
        if generation == 0 {
            return None;
        }
        Some((date, generation))
    }
}

/// Rotation thresholds; `None` disables that axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    interval: Option<chrono::Duration>,
    max_bytes: Option<u64>,
}

impl RotationPolicy {
    /// Build a policy; a zero interval or size disables that axis
    pub fn new(interval: Duration, max_bytes: u64) -> Self {
        let interval = if interval.is_zero() {
            None
        } else {
            // Intervals beyond chrono's range never elapse
            chrono::Duration::from_std(interval).ok()
        };

        Self {
            interval,
            max_bytes: (max_bytes > 0).then_some(max_bytes),
        }
    }

    /// Decide whether the active file must be rotated before writing
    /// `incoming` more bytes at `now`.
    ///
    /// With the interval axis enabled, a change of calendar date also
    /// rotates, so the dated name always matches the records inside.
    ///
    /// Size rotation is pre-emptive: a non-empty file is rotated before a
    /// write that would push it past the limit, so rotated-out files never
    /// exceed it unless a single record is larger than the limit.
    pub fn should_rotate(&self, state: &RotationState, now: DateTime<Local>, incoming: u64) -> bool {
        if let Some(interval) = self.interval {
            if now.date_naive() != state.opened_at.date_naive() {
                return true;
            }
            if now.signed_duration_since(state.opened_at) >= interval {
                return true;
            }
        }

        if let Some(max_bytes) = self.max_bytes {
            if state.bytes_written >= max_bytes {
                return true;
            }
            if state.bytes_written > 0 && state.bytes_written.saturating_add(incoming) > max_bytes {
                return true;
            }
        }

        false
    }
}

/// Bookkeeping for the active file of a rotating file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    /// Path of the active file
    pub path: PathBuf,
    /// When the active file was opened
    pub opened_at: DateTime<Local>,
    /// Bytes in the active file, including any it held when opened
    pub bytes_written: u64,
    /// Generation suffix of the active file for its date
    pub generation: u32,
}

struct ActiveFile {
    file: File,
    state: RotationState,
}

/// A log file of one file group that rolls over according to a RotationPolicy
///
/// Not synchronized on its own; the channel guards each one with a mutex so
/// the rotate check, the open and the write form one critical section.
pub struct RotatingFile {
    dir: PathBuf,
    template: FileTemplate,
    policy: RotationPolicy,
    /// Retention window; `None` keeps rotated files forever
    max_age: Option<Duration>,
    clock: Arc<dyn Clock>,
    active: Option<ActiveFile>,
}

impl RotatingFile {
    /// Create a rotating file; nothing is opened until the first write
    pub fn new(
        dir: &Path,
        template: FileTemplate,
        policy: RotationPolicy,
        max_age: Option<Duration>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dir: dir.to_path_buf(),
            template,
            policy,
            max_age,
            clock,
            active: None,
        }
    }

    /// Append one complete line, rotating first when the policy says so
    ///
    /// # Arguments
    /// * `line` - Fully rendered line, newline included
    ///
    /// # Returns
    /// * `Ok(())` - Line appended
    /// * `Err(LogError)` - The file could not be opened or written; the line is lost
    pub fn write_line(&mut self, line: &[u8]) -> Result<()> {
        let now = self.clock.now();
        let incoming = line.len() as u64;

        // A reopened file may already be full, so the policy is checked on
        // every write, the first one included
        let current = match self.active.take() {
            Some(active) => active,
            None => self.open_latest(now)?,
        };
        let current = if self.policy.should_rotate(&current.state, now, incoming) {
            self.rotate(current, now)?
        } else {
            current
        };
        let active = self.active.insert(current);

        active.file.write_all(line).map_err(|e| {
            LogError::LogWriteError(format!("{}: {}", active.state.path.display(), e))
        })?;
        active.state.bytes_written += incoming;

        Ok(())
    }

    /// Close `previous` and open the next file, then prune expired files
    fn rotate(&self, mut previous: ActiveFile, now: DateTime<Local>) -> Result<ActiveFile> {
        let _ = previous.file.flush();
        let previous = previous.state;

        let date = now.date_naive();
        let mut generation = if previous.opened_at.date_naive() == date {
            previous.generation + 1
        } else {
            0
        };
        while self.dir.join(self.template.file_name(date, generation)).exists() {
            generation += 1;
        }

        let opened = self.open_generation(now, generation).map_err(|e| {
            LogError::LogRotationError(format!(
                "Failed to rotate {}: {}",
                previous.path.display(),
                e
            ))
        })?;

        debug!(
            from = %previous.path.display(),
            to = %opened.state.path.display(),
            bytes = previous.bytes_written,
            "Rotated log file"
        );

        if let Err(e) = self.prune(Some(&opened.state.path)) {
            warn!("Retention sweep after rotation failed: {}", e);
            crate::console::print_error(&e.to_string());
        }

        Ok(opened)
    }

    /// Open today's newest generation in append mode
    fn open_latest(&self, now: DateTime<Local>) -> Result<ActiveFile> {
        let date = now.date_naive();
        let mut generation = 0;
        while self
            .dir
            .join(self.template.file_name(date, generation + 1))
            .exists()
        {
            generation += 1;
        }
        self.open_generation(now, generation)
    }

    fn open_generation(&self, now: DateTime<Local>, generation: u32) -> Result<ActiveFile> {
        let path = self
            .dir
            .join(self.template.file_name(now.date_naive(), generation));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LogError::LogFileError(format!("{}: {}", path.display(), e)))?;

        // Appending to an existing file continues its byte count
        let bytes_written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(ActiveFile {
            file,
            state: RotationState {
                path,
                opened_at: now,
                bytes_written,
                generation,
            },
        })
    }

    /// Delete files of this group older than the retention window
    ///
    /// The active file is never deleted. Returns the number of files removed.
    pub fn sweep_expired(&self) -> Result<usize> {
        let keep = self.active.as_ref().map(|active| active.state.path.as_path());
        self.prune(keep)
    }

    fn prune(&self, keep: Option<&Path>) -> Result<usize> {
        match self.max_age {
            Some(max_age) => {
                retention::prune_expired(&self.dir, &self.template, max_age, self.clock.now(), keep)
            }
            None => Ok(0),
        }
    }

    /// State of the active file, if one is open
    pub fn state(&self) -> Option<&RotationState> {
        self.active.as_ref().map(|active| &active.state)
    }

    pub fn template(&self) -> &FileTemplate {
        &self.template
    }
}
