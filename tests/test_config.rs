use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use streamix::config::{CONFIG_FILE_VAR, Config, ConfigError};

// The process environment is shared; tests that touch it serialize here.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const STREAMIX_VARS: &[&str] = &[
    CONFIG_FILE_VAR,
    "STREAMIX_LISTEN",
    "STREAMIX_FILE",
    "STREAMIX_CHUNK_SIZE",
    "STREAMIX_WORKERS",
    "STREAMIX_QUEUE_DEPTH",
    "STREAMIX_STALL_TIMEOUT_MS",
    "STREAMIX_MAX_STALLS",
];

fn clean_env() -> MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap();
    for var in STREAMIX_VARS {
        unsafe {
            std::env::remove_var(var);
        }
    }
    guard
}

#[test]
fn test_config_defaults() {
    let _guard = clean_env();

    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen.to_string(), "0.0.0.0:8080");
    assert_eq!(cfg.file.to_str().unwrap(), "/var/www/big_file");
    assert_eq!(cfg.chunk_size, 512 * 1024);
    assert_eq!(cfg.queue_depth, 256);
    assert!(cfg.workers >= 1);
}

#[test]
fn test_config_env_overrides() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("STREAMIX_LISTEN", "127.0.0.1:3000");
        std::env::set_var("STREAMIX_FILE", "/tmp/served.bin");
        std::env::set_var("STREAMIX_CHUNK_SIZE", "4096");
        std::env::set_var("STREAMIX_WORKERS", "2");
    }

    let cfg = Config::load().unwrap();
    assert_eq!(cfg.listen.to_string(), "127.0.0.1:3000");
    assert_eq!(cfg.file.to_str().unwrap(), "/tmp/served.bin");
    assert_eq!(cfg.chunk_size, 4096);
    assert_eq!(cfg.workers, 2);
    // Untouched fields keep their defaults
    assert_eq!(cfg.queue_depth, 256);
}

#[test]
fn test_config_rejects_unparseable_env_value() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("STREAMIX_CHUNK_SIZE", "lots");
    }

    let err = Config::load().unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn test_config_rejects_zero_workers() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("STREAMIX_WORKERS", "0");
    }

    let err = Config::load().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "workers",
            ..
        }
    ));
}

#[test]
fn test_config_rejects_zero_queue_depth() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("STREAMIX_QUEUE_DEPTH", "0");
    }

    let err = Config::load().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "queue_depth",
            ..
        }
    ));
}

#[test]
fn test_config_rejects_zero_chunk_size() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("STREAMIX_CHUNK_SIZE", "0");
    }

    let err = Config::load().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "chunk_size",
            ..
        }
    ));
}

#[test]
fn test_config_rejects_zero_max_stalls() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("STREAMIX_MAX_STALLS", "0");
    }

    let err = Config::load().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "max_stalls",
            ..
        }
    ));
}

#[test]
fn test_config_rejects_non_ipv4_listen_address() {
    let _guard = clean_env();
    unsafe {
        std::env::set_var("STREAMIX_LISTEN", "[::1]:8080");
    }

    let err = Config::load().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "STREAMIX_LISTEN",
            ..
        }
    ));
}

#[test]
fn test_config_file_with_partial_fields() {
    let _guard = clean_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen: \"127.0.0.1:9000\"").unwrap();
    writeln!(file, "chunk_size: 65536").unwrap();
    file.flush().unwrap();

    let cfg = Config::from_file(file.path()).unwrap();
    assert_eq!(cfg.listen.to_string(), "127.0.0.1:9000");
    assert_eq!(cfg.chunk_size, 65536);
    // Everything the file omits keeps its default
    assert_eq!(cfg.file.to_str().unwrap(), "/var/www/big_file");
    assert_eq!(cfg.max_stalls, 30);
}

#[test]
fn test_config_file_rejects_unknown_field() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen_port: 9000").unwrap();
    file.flush().unwrap();

    let err = Config::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_config_env_wins_over_file() {
    let _guard = clean_env();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "listen: \"127.0.0.1:9000\"").unwrap();
    writeln!(file, "queue_depth: 8").unwrap();
    file.flush().unwrap();

    unsafe {
        std::env::set_var(CONFIG_FILE_VAR, file.path());
        std::env::set_var("STREAMIX_LISTEN", "127.0.0.1:9100");
    }

    let cfg = Config::load().unwrap();
    // The variable overrides the file; the file still beats the default
    assert_eq!(cfg.listen.to_string(), "127.0.0.1:9100");
    assert_eq!(cfg.queue_depth, 8);
}

#[test]
fn test_config_missing_file_is_an_error() {
    let err = Config::from_file(std::path::Path::new("/nonexistent/streamix.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
