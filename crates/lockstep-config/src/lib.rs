//! Configuration management for Lockstep
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence)
//! 2. Environment variables (LOCKSTEP_* prefix)
//! 3. lockstep.local.toml (gitignored, local overrides)
//! 4. lockstep.toml (git-tracked, project config)
//! 5. ~/.config/lockstep/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Lockstep configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LockstepConfig {
    pub server: ServerSection,
    pub simulation: SimulationSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind_address: String,
    pub max_connections: u32,
    pub read_buffer_size: usize,
    pub write_buffer_size: usize,
    /// Idle connections are closed after this many seconds; absent
    /// means never.
    pub idle_timeout_secs: Option<u64>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:50051".to_string(),
            max_connections: 1024,
            read_buffer_size: 64 * 1024,
            write_buffer_size: 64 * 1024,
            idle_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSection {
    /// Fixed communication step size. Absent means each `doStep` call
    /// supplies its own interval.
    pub fixed_step_size: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Tracing filter directive, e.g. `info` or `lockstep_server=debug`.
    pub filter: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl LockstepConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Load configuration from one explicit TOML file, skipping the
    /// merge chain entirely.
    pub fn from_toml_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The server bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind_address.parse().map_err(|_| {
            ConfigError::ValidationError(format!(
                "server.bind_address is not a socket address: {}",
                self.server.bind_address
            ))
        })
    }

    /// Checks cross-field consistency before the config is acted on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.server.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "server.max_connections must be at least 1".to_string(),
            ));
        }

        if let Some(step) = self.simulation.fixed_step_size {
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "simulation.fixed_step_size must be positive and finite, got {step}"
                )));
            }
        }

        Ok(())
    }
}
