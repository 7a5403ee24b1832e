// Configuration Loader
// Layered configuration loading system

use std::path::{Path, PathBuf};

use envproxy_env::EnvSource;
use tracing::debug;

use crate::layered::{ConfigLayer, ConfigLayerSource, LayeredConfig};
use crate::types::{Config, ConfigError, Result};

/// Environment variable that relocates the global config directory.
pub const HOME_ENV_VAR: &str = "ENVPROXY_HOME";

const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loader with layered support
#[derive(Debug, Clone)]
pub struct ConfigLoader {
  /// Global config directory
  global_dir: PathBuf,
  /// File passed explicitly, loaded after the global one
  config_file: Option<PathBuf>,
}

impl ConfigLoader {
  /// Create a loader rooted at `~/.envproxy`
  pub fn new() -> Self {
    let global_dir = dirs::home_dir()
      .unwrap_or_else(|| PathBuf::from("."))
      .join(".envproxy");

    Self::with_global_dir(global_dir)
  }

  /// Create a loader honoring `ENVPROXY_HOME` from `env`
  pub fn from_env(env: &impl EnvSource) -> Self {
    match env.non_empty(HOME_ENV_VAR) {
      Some(dir) => Self::with_global_dir(PathBuf::from(dir)),
      None => Self::new(),
    }
  }

  pub fn with_global_dir(global_dir: PathBuf) -> Self {
    Self {
      global_dir,
      config_file: None,
    }
  }

  /// Set an explicit config file
  pub fn with_config_file(mut self, path: PathBuf) -> Self {
    self.config_file = Some(path);
    self
  }

  pub fn global_config_path(&self) -> PathBuf {
    self.global_dir.join(CONFIG_FILE_NAME)
  }

  /// Load configuration without CLI overrides
  pub fn load(&self) -> Result<Config> {
    self.load_with_cli_overrides(Vec::new())
  }

  /// Load configuration with CLI overrides
  pub fn load_with_cli_overrides(&self, cli_overrides: Vec<(String, String)>) -> Result<Config> {
    // Load layers in order:
    // 1. Built-in defaults (serde defaults)
    // 2. Global config (~/.envproxy/config.toml)
    // 3. Explicit --config-file
    // 4. CLI overrides
    let mut layered = LayeredConfig::new();

    let global_path = self.global_config_path();
    if global_path.exists() {
      layered.add_layer(ConfigLayer {
        source: ConfigLayerSource::GlobalConfig,
        values: read_toml(&global_path)?,
      });
    } else {
      debug!(path = %global_path.display(), "global config not found");
    }

    // An explicit file must exist.
    if let Some(path) = &self.config_file {
      layered.add_layer(ConfigLayer {
        source: ConfigLayerSource::ExplicitFile,
        values: read_toml(path)?,
      });
    }

    for (key, value) in cli_overrides {
      layered.add_layer(ConfigLayer {
        source: ConfigLayerSource::CliOverride,
        values: override_value(&key, &value),
      });
    }

    let sources: Vec<_> = layered.layers().iter().map(|layer| &layer.source).collect();
    debug!(?sources, "merging configuration layers");

    let config = layered.merge().try_into::<Config>()?;
    Ok(config)
  }
}

impl Default for ConfigLoader {
  fn default() -> Self {
    Self::new()
  }
}

/// Split a `key=value` CLI override.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
  let (key, value) = raw
    .split_once('=')
    .ok_or_else(|| ConfigError::MalformedOverride(raw.to_string()))?;
  let key = key.trim();
  if key.is_empty() {
    return Err(ConfigError::MalformedOverride(raw.to_string()));
  }
  Ok((key.to_string(), value.trim().to_string()))
}

fn read_toml(path: &Path) -> Result<toml::Value> {
  let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  let table: toml::Table = toml::from_str(&content).map_err(|source| ConfigError::Parse {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(toml::Value::Table(table))
}

/// Turn `proxy.timeout_secs=5` into `{ proxy = { timeout_secs = 5 } }`.
fn override_value(key: &str, raw: &str) -> toml::Value {
  let leaf = parse_scalar(raw);
  key.rsplit('.').fold(leaf, |inner, segment| {
    let mut table = toml::map::Map::new();
    table.insert(segment.to_string(), inner);
    toml::Value::Table(table)
  })
}

fn parse_scalar(raw: &str) -> toml::Value {
  if let Ok(flag) = raw.parse::<bool>() {
    return toml::Value::Boolean(flag);
  }
  if let Ok(number) = raw.parse::<i64>() {
    return toml::Value::Integer(number);
  }
  toml::Value::String(raw.trim_matches('"').to_string())
}
