// Layered Configuration
// Support for layered configuration with precedence

/// Layered configuration wrapper
#[derive(Debug, Clone, Default)]
pub struct LayeredConfig {
  /// Configuration layers, lowest precedence first
  layers: Vec<ConfigLayer>,
}

/// Configuration layer with source tracking
#[derive(Debug, Clone)]
pub struct ConfigLayer {
  /// Layer source
  pub source: ConfigLayerSource,
  /// Configuration values
  pub values: toml::Value,
}

/// Configuration layer source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayerSource {
  /// Global user config
  GlobalConfig,
  /// File passed on the command line
  ExplicitFile,
  /// CLI override
  CliOverride,
}

impl LayeredConfig {
  /// Create a new layered configuration
  pub fn new() -> Self {
    Self { layers: Vec::new() }
  }

  /// Add a layer on top of the existing ones
  pub fn add_layer(&mut self, layer: ConfigLayer) {
    self.layers.push(layer);
  }

  pub fn layers(&self) -> &[ConfigLayer] {
    &self.layers
  }

  /// Get merged configuration; later layers win key by key.
  pub fn merge(&self) -> toml::Value {
    let mut merged = toml::Value::Table(toml::map::Map::new());
    for layer in &self.layers {
      Self::merge_values(&mut merged, &layer.values);
    }
    merged
  }

  fn merge_values(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
      (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
        for (key, value) in overlay_table {
          match base_table.get_mut(key) {
            Some(existing) => Self::merge_values(existing, value),
            None => {
              base_table.insert(key.clone(), value.clone());
            }
          }
        }
      }
      (base, overlay) => *base = overlay.clone(),
    }
  }
}
