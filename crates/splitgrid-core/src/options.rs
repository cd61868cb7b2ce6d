// ABOUTME: Construction options for splitview and gridview components.
// ABOUTME: Loads and saves options from TOML so hosts can keep them in a config file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Orientation;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Axis of a splitview, or of the root branch of a grid
    pub orientation: Orientation,

    /// Scale panels by their current share when the container resizes.
    /// When false, the size change goes to panels by priority instead.
    pub proportional_layout: bool,

    /// Ignore container resize notifications; the host calls `layout` itself
    pub disable_auto_resizing: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            proportional_layout: true,
            disable_auto_resizing: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("Failed to read options file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse options: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize options: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

impl LayoutOptions {
    pub fn with_orientation(self, orientation: Orientation) -> Self {
        Self {
            orientation,
            ..self
        }
    }

    pub fn with_proportional_layout(self, proportional_layout: bool) -> Self {
        Self {
            proportional_layout,
            ..self
        }
    }

    pub fn with_disable_auto_resizing(self, disable_auto_resizing: bool) -> Self {
        Self {
            disable_auto_resizing,
            ..self
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a path
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded layout options from {}", path.display());
        Ok(options)
    }

    /// Load options from a path, falling back to defaults if missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(options) => options,
            Err(e) => {
                tracing::warn!("Using default layout options: {}", e);
                Self::default()
            }
        }
    }

    pub fn to_toml_string(&self) -> Result<String, OptionsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save options to a path
    pub fn save(&self, path: &Path) -> Result<(), OptionsError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let options = LayoutOptions::from_toml_str("orientation = \"vertical\"").unwrap();
        assert_eq!(options.orientation, Orientation::Vertical);
        assert!(options.proportional_layout);
        assert!(!options.disable_auto_resizing);
    }

    #[test]
    fn builders_do_not_touch_other_fields() {
        let options = LayoutOptions::default()
            .with_proportional_layout(false)
            .with_orientation(Orientation::Vertical);
        assert!(!options.proportional_layout);
        assert_eq!(options.orientation, Orientation::Vertical);
        assert!(!options.disable_auto_resizing);
    }

    #[test]
    fn test_options_file_roundtrip() {
        let options = LayoutOptions::default()
            .with_orientation(Orientation::Vertical)
            .with_disable_auto_resizing(true);

        let temp_path = std::env::temp_dir()
            .join("splitgrid-options-test")
            .join("layout.toml");
        options.save(&temp_path).unwrap();

        let loaded = LayoutOptions::load(&temp_path).unwrap();
        assert_eq!(loaded, options);

        // Cleanup
        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let path = std::env::temp_dir().join("splitgrid-does-not-exist.toml");
        assert_eq!(LayoutOptions::load_or_default(&path), LayoutOptions::default());
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = LayoutOptions::from_toml_str("orientation = 3").unwrap_err();
        assert!(matches!(err, OptionsError::ParseError(_)));
    }
}
