//! CLI configuration: an optional YAML file, overridden by flags.
//!
//! ```yaml
//! corpus_dir: ./abis
//! artifact: ./registry.json
//! log:
//!   level: info
//!   components:
//!     abiscope-registry: debug
//! decoder:
//!   max_array_elements: 256
//!   max_decoded_bytes: 1048576
//! builder:
//!   extensions: [json]
//! ```

use abiscope_evm::DecoderConfig;
use abiscope_observability::LogConfig;
use abiscope_registry::BuilderConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub builder: BuilderConfig,
    /// Interface corpus used when neither `--corpus` nor `--registry` is given
    #[serde(default)]
    pub corpus_dir: Option<PathBuf>,
    /// Prebuilt registry artifact; preferred over `corpus_dir`
    #[serde(default)]
    pub artifact: Option<PathBuf>,
}

impl AppConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parse config file '{}'", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply the global logging flags.
    pub fn with_log_flags(mut self, verbose: bool, json_logs: bool) -> Self {
        if verbose {
            self.log.level = "debug".into();
        }
        if json_logs {
            self.log.json = true;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_yaml() {
        let config = AppConfig::from_yaml(
            "
corpus_dir: ./abis
artifact: ./registry.json
log:
  level: info
  components:
    abiscope-registry: debug
decoder:
  max_array_elements: 256
builder:
  extensions: [json]
",
        )
        .unwrap();
        assert_eq!(config.corpus_dir, Some(PathBuf::from("./abis")));
        assert_eq!(config.artifact, Some(PathBuf::from("./registry.json")));
        assert_eq!(config.log.directives(), "info,abiscope_registry=debug");
        assert_eq!(config.decoder.max_array_elements, 256);
        assert_eq!(config.decoder.max_total_elements, DecoderConfig::default().max_total_elements);
        assert_eq!(config.builder.extensions, vec!["json".to_string()]);
    }

    #[test]
    fn empty_file_means_defaults() {
        let config = AppConfig::from_yaml("{}").unwrap();
        assert!(config.corpus_dir.is_none());
        assert_eq!(config.decoder, DecoderConfig::default());
        assert_eq!(config.log, LogConfig::default());
    }

    #[test]
    fn flags_override_log_settings() {
        let config = AppConfig::default().with_log_flags(true, true);
        assert_eq!(config.log.level, "debug");
        assert!(config.log.json);
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abiscope.yaml");
        std::fs::write(&path, "corpus_dir: /srv/abis\n").unwrap();
        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.corpus_dir, Some(PathBuf::from("/srv/abis")));
        assert!(AppConfig::load(Some(&dir.path().join("missing.yaml"))).is_err());
    }
}
