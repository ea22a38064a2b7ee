use std::env;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_FILE_VAR: &str = "STREAMIX_CONFIG";

const DEFAULT_LISTEN_PORT: u16 = 8080;
const DEFAULT_FILE_PATH: &str = "/var/www/big_file";
const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;
const DEFAULT_QUEUE_DEPTH: usize = 256;
const DEFAULT_STALL_TIMEOUT_MS: u64 = 1000;
const DEFAULT_MAX_STALLS: u32 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Immutable server configuration, populated once at startup.
///
/// Values come from, in increasing precedence: built-in defaults, an optional
/// YAML file named by `STREAMIX_CONFIG`, and `STREAMIX_*` environment
/// variables. The loaded value is shared read-only with the accept loop and
/// every worker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// IPv4 address and port to listen on.
    pub listen: SocketAddrV4,
    /// Path of the single file served to every GET/HEAD request.
    pub file: PathBuf,
    /// Upper bound on the bytes requested per sendfile call.
    pub chunk_size: usize,
    /// Number of connection-handling worker threads.
    pub workers: usize,
    /// Capacity of the queue between the accept loop and the workers.
    pub queue_depth: usize,
    /// How long one wait for socket writability may take, in milliseconds.
    pub stall_timeout_ms: u64,
    /// Consecutive expired waits (no bytes moved) before a transfer is abandoned.
    pub max_stalls: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_LISTEN_PORT),
            file: PathBuf::from(DEFAULT_FILE_PATH),
            chunk_size: DEFAULT_CHUNK_SIZE,
            workers: num_cpus::get().max(1),
            queue_depth: DEFAULT_QUEUE_DEPTH,
            stall_timeout_ms: DEFAULT_STALL_TIMEOUT_MS,
            max_stalls: DEFAULT_MAX_STALLS,
        }
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    ///
    /// Reads the YAML file named by `STREAMIX_CONFIG` when set, applies any
    /// `STREAMIX_*` variable on top, then validates the result.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match env::var_os(CONFIG_FILE_VAR) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses a YAML config file. Missing fields keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(path) = env::var_os("STREAMIX_FILE") {
            self.file = PathBuf::from(path);
        }
        override_parsed("STREAMIX_LISTEN", &mut self.listen)?;
        override_parsed("STREAMIX_CHUNK_SIZE", &mut self.chunk_size)?;
        override_parsed("STREAMIX_WORKERS", &mut self.workers)?;
        override_parsed("STREAMIX_QUEUE_DEPTH", &mut self.queue_depth)?;
        override_parsed("STREAMIX_STALL_TIMEOUT_MS", &mut self.stall_timeout_ms)?;
        override_parsed("STREAMIX_MAX_STALLS", &mut self.max_stalls)?;
        Ok(())
    }

    /// Rejects values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_nonzero("workers", self.workers)?;
        require_nonzero("queue_depth", self.queue_depth)?;
        require_nonzero("chunk_size", self.chunk_size)?;
        require_nonzero("max_stalls", self.max_stalls as usize)?;
        Ok(())
    }
}

/// Replaces `slot` with the parsed value of `var` when that variable is set.
fn override_parsed<T>(var: &'static str, slot: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => {
            *slot = raw.parse().map_err(|e| ConfigError::Invalid {
                field: var,
                reason: format!("{raw:?}: {e}"),
            })?;
            Ok(())
        }
        Err(env::VarError::NotPresent) => Ok(()),
        Err(e) => Err(ConfigError::Invalid {
            field: var,
            reason: e.to_string(),
        }),
    }
}

fn require_nonzero(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid {
            field,
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}
