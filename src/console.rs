// Console output - development echo of records, timestamped prints and the
// console-error channel

use crate::logs::format::TIMESTAMP_FORMAT;
use crate::logs::{LogRecord, Severity};
use chrono::{DateTime, Local};
use colored::*;
use std::fmt;

/// Print an absorbed failure to stderr
pub fn print_error(error: &str) {
    eprintln!("{} {}", "✗ Error:".red().bold(), error);
}

/// Print a non-fatal problem to stderr
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠ Warning:".yellow().bold(), message);
}

/// Echo a record to stdout in human-readable form
pub fn echo(record: &LogRecord) {
    println!("{}", render_echo(record));
}

/// Print `[YYYY-MM-DD HH:MM:SS] ` followed by `args` to stdout
///
/// Independent of any channel: works before bootstrap and in every
/// environment. See also the `timestamped!` macro.
pub fn timestamped(args: fmt::Arguments<'_>) {
    println!("{}", render_timestamped(Local::now(), args));
}

pub fn render_timestamped(now: DateTime<Local>, args: fmt::Arguments<'_>) -> String {
    format!("[{}] {}", now.format(TIMESTAMP_FORMAT), args)
}

/// Human-readable rendering: padded colored level, timestamp, message, then fields
pub fn render_echo(record: &LogRecord) -> String {
    let label = format!("{:<7}", record.severity.as_str().to_uppercase());
    let label = match record.severity {
        Severity::Debug => label.dimmed(),
        Severity::Info => label.cyan(),
        Severity::Warn => label.yellow(),
        Severity::Error => label.red(),
        Severity::Fatal | Severity::Panic => label.red().bold(),
    };

    let mut line = format!(
        "{} [{}] {}",
        label,
        record.timestamp.format(TIMESTAMP_FORMAT),
        record.message
    );

    for (key, value) in record.fields.iter() {
        line.push_str(&format!(" {}={}", key.bold(), value));
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logs::Fields;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_render_echo_contains_parts() {
        colored::control::set_override(false);

        let timestamp = Local.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
        let record = LogRecord::new(timestamp, Severity::Warn, "slow request")
            .with_fields(Fields::new().with("url", "/health").with("status_code", 200));

        let line = render_echo(&record);
        assert_eq!(
            line,
            "WARNING [2024-06-01 08:30:00] slow request status_code=200 url=/health"
        );
    }

    #[test]
    fn test_render_timestamped_prefix() {
        let now = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 5).unwrap();

        let line = render_timestamped(now, format_args!("worker {} ready", 3));
        assert_eq!(line, "[2024-12-31 23:59:05] worker 3 ready");

        let empty = render_timestamped(now, format_args!(""));
        assert_eq!(empty, "[2024-12-31 23:59:05] ");
    }
}
