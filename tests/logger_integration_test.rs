// Integration tests for the logger facade: no-op behavior, concurrency and echo gating

use chrono::{Local, TimeZone};
use pm_log::logs::ManualClock;
use pm_log::{access_infof, errorf, infof, warnf};
use pm_log::{ChannelStatus, Environment, Fields, LogConfig, Logging, Severity};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

fn production() -> Environment {
    Environment::from_vars([("ENV", "production")])
}

fn fixed_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Local.with_ymd_and_hms(2024, 8, 20, 16, 45, 0).unwrap(),
    ))
}

/// Every line of every file in `dir` whose name starts with `prefix`
fn lines_with_prefix(dir: &Path, prefix: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in fs::read_dir(dir).unwrap().filter_map(|e| e.ok()) {
        let name = entry.file_name().into_string().unwrap();
        if name.starts_with(prefix) {
            let content = fs::read_to_string(entry.path()).unwrap();
            assert!(content.is_empty() || content.ends_with('\n'), "truncated file {}", name);
            lines.extend(content.lines().map(str::to_string));
        }
    }
    lines
}

#[test]
fn test_failed_bootstrap_makes_every_call_a_noop() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();

    let logging = Logging::with_parts(
        LogConfig::with_dir(blocker.join("logs")),
        fixed_clock(),
        production(),
    );
    let log = logging.general().clone();
    let access = logging.access().clone();

    assert!(matches!(log.status(), ChannelStatus::Failed(_)));
    assert!(matches!(access.status(), ChannelStatus::Failed(_)));

    log.debug("debug");
    log.info("info");
    log.warn("warn");
    log.error("error");
    log.log(Severity::Fatal, "fatal severity without exiting");
    infof!(log, "formatted {}", 1);
    access.access_info("request", Fields::new().with("ip", "10.1.1.1"));
    access_infof!(access, Fields::new(), "request {}", 2);
    assert_eq!(logging.sweep_expired(), 0);

    // Nothing but the blocking file was ever created
    let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert!(blocker.is_file());
}

#[test]
fn test_parallel_writers_produce_whole_lines() {
    let temp_dir = TempDir::new().unwrap();
    let config = LogConfig {
        // Small enough to rotate many times during the run
        rotation_size_bytes: 4096,
        ..LogConfig::with_dir(temp_dir.path())
    };
    let logging = Logging::with_parts(config, fixed_clock(), production());

    let writers = 8;
    let records = 250;

    thread::scope(|scope| {
        for worker in 0..writers {
            let log = logging.general().clone();
            scope.spawn(move || {
                for record in 0..records {
                    if record % 2 == 0 {
                        infof!(log, "worker-{} record-{}", worker, record);
                    } else {
                        warnf!(log, "worker-{} record-{}", worker, record);
                    }
                }
            });
        }
    });

    let lines = lines_with_prefix(temp_dir.path(), "info.");
    assert_eq!(lines.len(), writers * records);

    let mut seen = HashSet::new();
    for line in &lines {
        assert!(
            line.starts_with("[2024-08-20 16:45:00] [info] worker-")
                || line.starts_with("[2024-08-20 16:45:00] [warning] worker-"),
            "malformed line: {}",
            line
        );
        let message = line.rsplit("] ").next().unwrap().to_string();
        assert!(seen.insert(message), "duplicate line: {}", line);
    }

    // Rotation happened, and no file grew past the limit
    let files: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().filter_map(|e| e.ok()).collect();
    assert!(files.len() > 1);
    for file in files {
        assert!(file.metadata().unwrap().len() <= 4096);
    }
}

#[test]
fn test_parallel_writers_during_reconfiguration() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let logging = Logging::with_parts(LogConfig::with_dir(first.path()), fixed_clock(), production());

    let writers = 4;
    let records = 200;

    thread::scope(|scope| {
        for worker in 0..writers {
            let log = logging.general().clone();
            scope.spawn(move || {
                for record in 0..records {
                    errorf!(log, "worker-{} record-{}", worker, record);
                }
            });
        }
        scope.spawn(|| logging.set_config(LogConfig::with_dir(second.path())));
    });

    // Every record landed in exactly one of the two directories
    let total = lines_with_prefix(first.path(), "error.").len()
        + lines_with_prefix(second.path(), "error.").len();
    assert_eq!(total, writers * records);
}

#[test]
fn test_general_and_access_files_stay_separate() {
    let temp_dir = TempDir::new().unwrap();
    let logging = Logging::with_parts(LogConfig::with_dir(temp_dir.path()), fixed_clock(), production());

    logging.general().info("application message");
    logging.general().error("application failure");
    logging.access().access_info(
        "GET /users",
        Fields::new()
            .with("ip", "203.0.113.7")
            .with("method", "GET")
            .with("url", "/users")
            .with("status_code", 200)
            .with("response_size", 1532),
    );

    let info = lines_with_prefix(temp_dir.path(), "info.");
    let error = lines_with_prefix(temp_dir.path(), "error.");
    let access = lines_with_prefix(temp_dir.path(), "access.");

    assert_eq!(info, vec!["[2024-08-20 16:45:00] [info] application message"]);
    assert_eq!(error, vec!["[2024-08-20 16:45:00] [error] application failure"]);
    assert_eq!(
        access,
        vec!["[2024-08-20 16:45:00] [203.0.113.7] [GET] [/users] [200] [1532] GET /users"]
    );
}

#[test]
fn test_debug_written_when_level_lowered() {
    let temp_dir = TempDir::new().unwrap();
    let config = LogConfig {
        level: Severity::Debug,
        ..LogConfig::with_dir(temp_dir.path())
    };
    let logging = Logging::with_parts(config, fixed_clock(), production());

    logging.general().debug("cache miss");

    let info = lines_with_prefix(temp_dir.path(), "info.");
    assert_eq!(info, vec!["[2024-08-20 16:45:00] [debug] cache miss"]);
}

#[test]
fn test_environment_gates_console_echo() {
    let temp_dir = TempDir::new().unwrap();
    let config = LogConfig::with_dir(temp_dir.path());

    let cases = [
        (Environment::from_vars([("ENV", "Development")]), true),
        (Environment::from_vars([("APP_ENV", "dev")]), true),
        (Environment::from_vars([("ENV", "production")]), false),
        (Environment::from_vars(Vec::<(String, String)>::new()), false),
    ];

    for (environment, expected) in cases {
        let logging = Logging::with_parts(config.clone(), fixed_clock(), environment);
        assert_eq!(logging.general().console_echo(), expected);
        assert_eq!(logging.access().console_echo(), expected);
    }
}
