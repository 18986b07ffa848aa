use anyhow::{Context, Result};
use pm_log::{infof, timestamped, Fields, LogConfig, Logging};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable naming an optional TOML/JSON config file
const CONFIG_ENV: &str = "PM_LOG_CONFIG";

fn main() -> Result<()> {
    // Diagnostics of the logger itself
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pm_log=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            LogConfig::from_file(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => LogConfig::default(),
    };

    timestamped!("pm-log demo using {}", config.log_dir.display());

    let logging = Logging::new(config);
    let log = logging.general().clone();

    log.info("pm-log demo started");
    infof!(log, "writing to {}", logging.config().log_dir.display());
    log.warn("warnings share the info file");
    log.error("errors get their own file");

    logging.access().access_info(
        "request served",
        Fields::new()
            .with("ip", "127.0.0.1")
            .with("method", "GET")
            .with("url", "/health")
            .with("status_code", 200)
            .with("response_size", 2),
    );

    let removed = logging.sweep_expired();
    infof!(log, "retention sweep removed {} file(s)", removed);

    Ok(())
}
