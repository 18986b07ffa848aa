use crate::logs::record::{Fields, LogRecord};

/// Timestamp layout shared by every rendered line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Line formatter of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    /// `[timestamp] [severity] message`
    Plain,
    /// `[timestamp] [ip] [method] [url] [status_code] [response_size] message`
    Access,
}

impl Formatter {
    /// Render a record to a single newline-terminated line
    ///
    /// Never fails: missing access fields fall back to their defaults.
    pub fn format(&self, record: &LogRecord) -> String {
        let timestamp = record.timestamp.format(TIMESTAMP_FORMAT);

        match self {
            Formatter::Plain => {
                format!("[{}] [{}] {}\n", timestamp, record.severity, record.message)
            }
            Formatter::Access => {
                let fields = &record.fields;
                format!(
                    "[{}] [{}] [{}] [{}] [{}] [{}] {}\n",
                    timestamp,
                    field_or(fields, "ip", "0.0.0.0"),
                    field_or(fields, "method", "GET"),
                    field_or(fields, "url", "/"),
                    field_or(fields, "status_code", "200"),
                    field_or(fields, "response_size", "0"),
                    record.message
                )
            }
        }
    }
}

/// Stringify a field, or fall back to `default` when it is absent
fn field_or(fields: &Fields, key: &str, default: &str) -> String {
    fields
        .get(key)
        .map(|value| value.to_string())
        .unwrap_or_else(|| default.to_string())
}
