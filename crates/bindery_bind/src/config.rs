//! Engine configuration
//!
//! Loaded from TOML; every field is optional:
//!
//! ```toml
//! event_tag = "pressed"
//! model_tag = "datamodel"
//! visibility = "in_tree"   # or "self_only"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::property::PropertyKind;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What "currently visible" means for gating non-visibility bindings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityMode {
    /// The widget and every ancestor are visible
    #[default]
    InTree,
    /// Only the widget's own flag is consulted
    SelfOnly,
}

/// Binding engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Tag wiring a widget's activation event
    pub event_tag: String,
    /// Tag triggering one-shot model-driven child expansion
    pub model_tag: String,
    pub visibility: VisibilityMode,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            event_tag: "pressed".to_string(),
            model_tag: "datamodel".to_string(),
            visibility: VisibilityMode::InTree,
        }
    }
}

impl BindConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: BindConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Check that the special tags are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, tag) in [("event_tag", &self.event_tag), ("model_tag", &self.model_tag)] {
            if tag.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
            if PropertyKind::from_tag(tag).is_some() {
                return Err(ConfigError::Invalid(format!(
                    "{} '{}' shadows a property tag",
                    field, tag
                )));
            }
        }
        if self.event_tag == self.model_tag {
            return Err(ConfigError::Invalid(format!(
                "event_tag and model_tag are both '{}'",
                self.event_tag
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BindConfig::from_toml_str("").unwrap();
        assert_eq!(config, BindConfig::default());
        assert_eq!(config.event_tag, "pressed");
        assert_eq!(config.model_tag, "datamodel");
        assert_eq!(config.visibility, VisibilityMode::InTree);
    }

    #[test]
    fn test_partial_override() {
        let config = BindConfig::from_toml_str(
            r#"
            event_tag = "activated"
            visibility = "self_only"
            "#,
        )
        .unwrap();
        assert_eq!(config.event_tag, "activated");
        assert_eq!(config.model_tag, "datamodel");
        assert_eq!(config.visibility, VisibilityMode::SelfOnly);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            BindConfig::from_toml_str("event_tag = \"\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BindConfig::from_toml_str("model_tag = \"text\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BindConfig::from_toml_str("model_tag = \"pressed\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            BindConfig::from_toml_str("visibility = \"sometimes\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = BindConfig {
            visibility: VisibilityMode::SelfOnly,
            ..BindConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(BindConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = BindConfig::load(Path::new("/nonexistent/bindery.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
