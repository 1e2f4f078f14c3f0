//! Cleaner configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::DEFAULT_SERVER_LABEL;
use crate::policy::RetentionPolicy;
use crate::Result;

/// Default media store location.
pub const DEFAULT_MEDIA_ROOT: &str = "/var/lib/synapse/media_store";

/// Configuration for the media cleaner.
///
/// ```toml
/// media_root = "/srv/matrix/media_store"
/// server_label = "catcord"
///
/// [policy]
/// image_retention_days = 90
/// non_image_retention_days = 30
/// pressure_threshold = 0.85
/// emergency_threshold = 0.92
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanerConfig {
    /// Root directory of the media store.
    #[serde(default = "default_media_root")]
    pub media_root: PathBuf,

    /// Server name reported in run payloads.
    #[serde(default = "default_server_label")]
    pub server_label: String,

    /// Retention policy; missing fields take their defaults.
    #[serde(default)]
    pub policy: RetentionPolicy,
}

fn default_media_root() -> PathBuf {
    PathBuf::from(DEFAULT_MEDIA_ROOT)
}

fn default_server_label() -> String {
    DEFAULT_SERVER_LABEL.to_string()
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            media_root: default_media_root(),
            server_label: default_server_label(),
            policy: RetentionPolicy::default(),
        }
    }
}

impl CleanerConfig {
    /// Parse a TOML document. Threshold ranges and ordering are validated.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), media_root = %config.media_root.display(), "Loaded cleaner config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CleanerError;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CleanerConfig::from_toml_str("").unwrap();
        assert_eq!(config, CleanerConfig::default());
        assert_eq!(config.policy.image_retention_days(), 90);
    }

    #[test]
    fn test_partial_policy() {
        let config = CleanerConfig::from_toml_str(
            r#"
            media_root = "/srv/media"
            server_label = "staging"

            [policy]
            non_image_retention_days = 14
            pressure_threshold = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.media_root, PathBuf::from("/srv/media"));
        assert_eq!(config.server_label, "staging");
        assert_eq!(config.policy.non_image_retention_days(), 14);
        assert_eq!(config.policy.image_retention_days(), 90);
        assert_eq!(config.policy.pressure_threshold(), 0.8);
        assert_eq!(config.policy.emergency_threshold(), 0.92);
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let err = CleanerConfig::from_toml_str(
            r#"
            [policy]
            pressure_threshold = 0.95
            emergency_threshold = 0.90
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
        assert!(err.to_string().contains("pressure_threshold"));
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cleaner.toml");
        fs::write(&path, "server_label = \"prod\"\n").unwrap();

        let config = CleanerConfig::load(&path).unwrap();
        assert_eq!(config.server_label, "prod");

        assert!(matches!(
            CleanerConfig::load(&temp_dir.path().join("missing.toml")),
            Err(CleanerError::Io(_))
        ));
    }
}
