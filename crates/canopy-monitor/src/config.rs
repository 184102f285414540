//! Configuration loading from TOML and environment variables.
//!
//! The monitor reads its configuration from:
//! 1. A TOML config file (default: config/canopy.toml)
//! 2. Environment variables (override TOML values)
//!
//! Environment variable prefix: CANOPY_

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use canopy_protocol::NetworkAddress;

/// Top-level monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Polling configuration.
    #[serde(default)]
    pub poll: PollConfig,
    /// Cluster contact configuration.
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Layout configuration.
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Polling loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds between hierarchy refreshes.
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
    /// Optional bound on a single topology query, in seconds. Absent by
    /// default: a hanging query stalls its iteration.
    #[serde(default)]
    pub query_timeout_secs: Option<u64>,
}

/// Cluster contact configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Bootstrap addresses (host:port) handed to the topology source.
    #[serde(default)]
    pub bootstrap: Vec<String>,
    /// JSON leader-description file for the built-in file-backed source.
    #[serde(default)]
    pub topology_file: Option<PathBuf>,
}

/// Layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Canvas size the radial layout scales to.
    #[serde(default = "default_canvas_size")]
    pub canvas_size: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "canopy_monitor=debug").
    #[serde(default = "default_log_level")]
    pub level: String,
}

// -- Defaults --

fn default_interval() -> u64 {
    canopy_protocol::DEFAULT_POLLING_INTERVAL_SECS
}
fn default_canvas_size() -> f64 {
    canopy_protocol::DEFAULT_CANVAS_SIZE
}
fn default_log_level() -> String {
    "info".to_string()
}

// -- Trait impls --

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll: PollConfig::default(),
            cluster: ClusterConfig::default(),
            layout: LayoutConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            query_timeout_secs: None,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            bootstrap: Vec::new(),
            topology_file: None,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_size: default_canvas_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: MonitorConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, with environment variable
    /// overrides. A missing file falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, anyhow::Error> {
        let mut config = if let Some(path) = path {
            if path.exists() {
                Self::from_file(path)?
            } else {
                tracing::warn!(
                    path = %path.display(),
                    "Config file not found, using defaults"
                );
                Self::default()
            }
        } else {
            Self::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("CANOPY_POLL_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.poll.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("CANOPY_QUERY_TIMEOUT") {
            if let Ok(secs) = val.parse() {
                self.poll.query_timeout_secs = Some(secs);
            }
        }
        if let Ok(val) = std::env::var("CANOPY_BOOTSTRAP") {
            self.cluster.bootstrap = val.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(val) = std::env::var("CANOPY_TOPOLOGY_FILE") {
            self.cluster.topology_file = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("CANOPY_CANVAS_SIZE") {
            if let Ok(size) = val.parse() {
                self.layout.canvas_size = size;
            }
        }
        if let Ok(val) = std::env::var("CANOPY_LOG_LEVEL") {
            self.logging.level = val;
        }
    }

    /// Parse the configured bootstrap strings into network addresses.
    pub fn bootstrap_addresses(&self) -> Result<Vec<NetworkAddress>, anyhow::Error> {
        self.cluster
            .bootstrap
            .iter()
            .map(|s| Ok(s.parse()?))
            .collect()
    }

    /// The query timeout as a `Duration`, if configured.
    pub fn query_timeout(&self) -> Option<Duration> {
        self.poll.query_timeout_secs.map(Duration::from_secs)
    }
}
