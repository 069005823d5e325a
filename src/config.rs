//! `infragraph.toml` loading

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use infragraph_advisor::DriftOptions;
use infragraph_core::BuildOptions;
use infragraph_layout::LayoutOptions;

pub const CONFIG_FILE: &str = "infragraph.toml";

/// Engine settings. Every table and field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub build: BuildOptions,
    pub layout: LayoutOptions,
    pub drift: DriftOptions,
}

impl EngineConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(EngineConfig::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// `--config` if given, otherwise `infragraph.toml` in the working directory.
pub fn config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use infragraph_layout::{Direction, LayeringStrategy, LayoutAlgorithm};

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert!(config.build.warn_on_dangling);
        assert_eq!(config.layout.algorithm, LayoutAlgorithm::Hierarchical);
        assert!(config.drift.fallback_matching);
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
[build]
columns_per_band = 6

[layout]
algorithm = "radial"

[layout.hierarchical]
direction = "left-right"
strategy = "longest-path"

[layout.force]
seed = 7

[drift]
fallback_matching = false
"#,
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.build.columns_per_band, 6);
        assert!(config.build.warn_on_dangling);
        assert_eq!(config.layout.algorithm, LayoutAlgorithm::Radial);
        assert_eq!(config.layout.hierarchical.direction, Direction::LeftRight);
        assert_eq!(config.layout.hierarchical.strategy, LayeringStrategy::LongestPath);
        assert_eq!(config.layout.force.seed, Some(7));
        assert_eq!(config.layout.force.iterations, 2000);
        assert!(!config.drift.fallback_matching);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[layout]\nalgorithm = \"spiral\"\n").unwrap();
        assert!(EngineConfig::load(&path).is_err());
    }
}
