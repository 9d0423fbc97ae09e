//! Engine configuration.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Side length of the default virtual canvas.
pub const DEFAULT_CANVAS_EXTENT: f64 = 5000.0;

/// Side length of the default mini-map.
pub const DEFAULT_MINIMAP_EXTENT: f64 = 150.0;

/// Storage key the canvas is saved under unless configured otherwise.
pub const DEFAULT_DOCUMENT_KEY: &str = "ucanvas";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tunables for the canvas engine.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Size of the virtual canvas in canvas units.
    pub canvas_size: Size,
    /// Minimum zoom scale.
    pub min_scale: f64,
    /// Maximum zoom scale.
    pub max_scale: f64,
    /// Size of the mini-map overview.
    pub minimap_size: Size,
    /// Maximum number of undone primitives kept for redo.
    pub max_history: usize,
    /// Key under which the canvas is persisted.
    pub document_key: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            canvas_size: Size::new(DEFAULT_CANVAS_EXTENT, DEFAULT_CANVAS_EXTENT),
            min_scale: 0.5,
            max_scale: 5.0,
            minimap_size: Size::new(DEFAULT_MINIMAP_EXTENT, DEFAULT_MINIMAP_EXTENT),
            max_history: 100,
            document_key: DEFAULT_DOCUMENT_KEY.to_string(),
        }
    }
}

impl CanvasConfig {
    /// Parse a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale && self.max_scale.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "scale range {}..{} must be positive and ordered",
                self.min_scale, self.max_scale
            )));
        }
        for (name, size) in [("canvas_size", self.canvas_size), ("minimap_size", self.minimap_size)] {
            if !(size.width > 0.0 && size.height > 0.0) {
                return Err(ConfigError::Invalid(format!("{name} must be positive, got {size:?}")));
            }
        }
        if self.document_key.is_empty() {
            return Err(ConfigError::Invalid("document_key must not be empty".to_string()));
        }
        Ok(())
    }
}
