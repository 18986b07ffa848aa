use thiserror::Error;

/// Main error type for the pm-log logging facility
#[derive(Debug, Error)]
pub enum LogError {
    // Directory and file errors
    #[error("Log directory error: {0}")]
    DirectoryError(String),

    #[error("Failed to open log file: {0}")]
    LogFileError(String),

    #[error("Failed to write log: {0}")]
    LogWriteError(String),

    #[error("Log rotation failed: {0}")]
    LogRotationError(String),

    #[error("Retention sweep failed: {0}")]
    RetentionError(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // IO errors (automatically converted from std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pm-log operations
pub type Result<T> = std::result::Result<T, LogError>;
