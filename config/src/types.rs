// Configuration Types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
  /// Global proxy settings
  pub proxy: ProxyConfig,
}

/// Settings applied when the global proxy is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
  /// Install the proxy found in the environment at all
  pub enabled: bool,
  /// Honor `NO_PROXY` / `no_proxy` on the proxying client
  pub respect_no_proxy: bool,
  /// Connect timeout in seconds
  pub connect_timeout_secs: Option<u64>,
  /// Whole-request timeout in seconds
  pub timeout_secs: Option<u64>,
  /// User agent sent by built clients
  pub user_agent: Option<String>,
}

impl Default for ProxyConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      respect_no_proxy: false,
      connect_timeout_secs: None,
      timeout_secs: None,
      user_agent: None,
    }
  }
}

impl ProxyConfig {
  pub fn connect_timeout(&self) -> Option<Duration> {
    self.connect_timeout_secs.map(Duration::from_secs)
  }

  pub fn timeout(&self) -> Option<Duration> {
    self.timeout_secs.map(Duration::from_secs)
  }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
  /// Config file could not be read
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// Config file is not valid TOML
  #[error("failed to parse {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },

  /// Merged layers do not form a valid configuration
  #[error("invalid configuration: {0}")]
  Invalid(#[from] toml::de::Error),

  /// CLI override is not of the form `key=value`
  #[error("invalid override {0:?}, expected KEY=VALUE")]
  MalformedOverride(String),
}

/// Alias for Result<T, ConfigError>
pub type Result<T> = std::result::Result<T, ConfigError>;
