//! Configuration for hygrolog
//!
//! All knobs live in one explicit value that is handed to the components
//! that need it; there is no process-wide data directory. The binary loads
//! it from environment variables, with `.env` support provided by the
//! caller.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::query::WindowPreset;

/// Configuration for the store and the serving layer
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the shard files
    pub data_dir: PathBuf,
    /// Address the HTTP server binds to
    pub listen_addr: SocketAddr,
    /// Window preset used when a request names none
    pub default_window: WindowPreset,
    /// Collection cycle length in hours before a new shard is started
    pub cycle_hours: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            default_window: WindowPreset::Day,
            cycle_hours: 24,
        }
    }
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the shard data directory
    pub fn with_data_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Set the HTTP listen address
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Set the default window preset
    pub fn with_default_window(mut self, preset: WindowPreset) -> Self {
        self.default_window = preset;
        self
    }

    /// Set the collection cycle length in hours
    pub fn with_cycle_hours(mut self, hours: u32) -> Self {
        self.cycle_hours = hours;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Optional, with defaults:
    /// - `HYGROLOG_DATA_DIR` - shard directory (default: `data`)
    /// - `HYGROLOG_LISTEN_ADDR` - bind address (default: `0.0.0.0:5000`)
    /// - `HYGROLOG_DEFAULT_RANGE` - window preset label (default: `24h`)
    /// - `HYGROLOG_CYCLE_HOURS` - collection cycle length (default: `24`)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(dir) = env::var("HYGROLOG_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(addr) = env::var("HYGROLOG_LISTEN_ADDR") {
            config.listen_addr = addr
                .parse()
                .map_err(|_| Error::config(format!("invalid HYGROLOG_LISTEN_ADDR: {}", addr)))?;
        }

        if let Ok(range) = env::var("HYGROLOG_DEFAULT_RANGE") {
            config.default_window = range
                .parse()
                .map_err(|_| Error::config(format!("invalid HYGROLOG_DEFAULT_RANGE: {}", range)))?;
        }

        if let Ok(hours) = env::var("HYGROLOG_CYCLE_HOURS") {
            config.cycle_hours = hours
                .parse()
                .map_err(|_| Error::config(format!("invalid HYGROLOG_CYCLE_HOURS: {}", hours)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(Error::config("data directory must not be empty"));
        }

        if self.cycle_hours < 1 {
            return Err(Error::config("cycle length must be at least 1 hour"));
        }

        Ok(())
    }

    /// Get the collection cycle length as a duration
    ///
    /// Handed to [`crate::ShardWriter::with_cycle_len`] by collector
    /// binaries.
    pub fn cycle_len(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.cycle_hours))
    }

    /// Log the loaded configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  data dir       : {}", self.data_dir.display());
        tracing::info!("  listen addr    : {}", self.listen_addr);
        tracing::info!("  default window : {}", self.default_window);
        tracing::info!("  cycle hours    : {}", self.cycle_hours);
    }
}
