// Retention - pruning of rotated log files past their maximum age

use crate::error::{LogError, Result};
use crate::logs::rotation::FileTemplate;
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

/// Delete the files of one file group whose modification time is older than `max_age`
///
/// Only names produced by `template` are considered, and `keep` (the active
/// file) is never deleted. A file that cannot be removed is reported and
/// skipped; the next sweep retries it.
///
/// # Arguments
/// * `dir` - Directory holding the log files
/// * `template` - Naming scheme of the file group to prune
/// * `max_age` - Retention window
/// * `now` - Reference time for the age computation
/// * `keep` - Path that must survive regardless of age
///
/// # Returns
/// * `Ok(usize)` - Number of files deleted
/// * `Err(LogError)` - The directory could not be listed
pub fn prune_expired(
    dir: &Path,
    template: &FileTemplate,
    max_age: Duration,
    now: DateTime<Local>,
    keep: Option<&Path>,
) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let cutoff = SystemTime::from(now)
        .checked_sub(max_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let entries = fs::read_dir(dir).map_err(|e| {
        LogError::RetentionError(format!("Failed to list {}: {}", dir.display(), e))
    })?;

    let mut deleted_count = 0;

    for entry in entries.flatten() {
        let path = entry.path();

        let belongs_to_group = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|name| template.parse(name).is_some())
            .unwrap_or(false);
        if !belongs_to_group || keep == Some(path.as_path()) {
            continue;
        }

        // Symlinks and directories are left alone
        match entry.file_type() {
            Ok(file_type) if file_type.is_file() => {}
            _ => continue,
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        if modified >= cutoff {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Removed expired log file");
                deleted_count += 1;
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to remove expired log file: {}", e);
                crate::console::print_warning(&format!(
                    "Failed to remove expired log file {}: {}",
                    path.display(),
                    e
                ));
            }
        }
    }

    Ok(deleted_count)
}
