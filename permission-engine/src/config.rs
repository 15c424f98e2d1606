// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine configuration read from a TOML file.
//!
//! ```toml
//! catalog = "permissions.toml"
//! match_mode = "suffix"
//! override_mode = "lenient"
//! ```
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{CatalogError, NodeCatalog};
use crate::checker::MatchMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read engine configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed engine configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// How permission lists submitted for persistence are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideMode {
    /// Entries without `+` or `-` are dropped silently, nothing else is checked.
    #[default]
    Lenient,

    /// Unsigned, malformed or uncatalogued entries are rejected with a validation error.
    Strict,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Location of the node catalog, TOML or JSON.
    pub catalog: PathBuf,

    #[serde(default)]
    pub match_mode: MatchMode,

    #[serde(default)]
    pub override_mode: OverrideMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("permissions.toml"),
            match_mode: MatchMode::default(),
            override_mode: OverrideMode::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Reads the configuration file, a relative catalog path is resolved against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_toml_str(&fs::read_to_string(path)?)?;

        if config.catalog.is_relative() {
            if let Some(parent) = path.parent() {
                config.catalog = parent.join(&config.catalog);
            }
        }

        Ok(config)
    }

    /// Loads the node catalog this configuration points at.
    pub fn load_catalog(&self) -> Result<NodeCatalog, ConfigError> {
        Ok(NodeCatalog::from_path(&self.catalog)?)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::checker::MatchMode;

    use super::{ConfigError, EngineConfig, OverrideMode};

    #[test]
    fn defaults() {
        let config = EngineConfig::from_toml_str(r#"catalog = "nodes.json""#).unwrap();
        assert_eq!(config.catalog, PathBuf::from("nodes.json"));
        assert_eq!(config.match_mode, MatchMode::Suffix);
        assert_eq!(config.override_mode, OverrideMode::Lenient);
    }

    #[test]
    fn all_options() {
        let config = EngineConfig::from_toml_str(
            r#"
            catalog = "/etc/permissions.toml"
            match_mode = "exact"
            override_mode = "strict"
            "#,
        )
        .unwrap();
        assert_eq!(config.match_mode, MatchMode::Exact);
        assert_eq!(config.override_mode, OverrideMode::Strict);
    }

    #[test]
    fn rejects_unknown_options() {
        assert!(matches!(
            EngineConfig::from_toml_str("catalog = \"a.toml\"\nmatch_mode = \"prefix\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("catalog = \"a.toml\"\ncache = true"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn shipped_configuration() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/engine.toml");
        let config = EngineConfig::from_path(path).unwrap();
        assert!(config.catalog.ends_with("config/permissions.toml"));

        let catalog = config.load_catalog().unwrap();
        assert!(catalog.contains("group", "update"));
    }

    #[test]
    fn missing_catalog() {
        let config = EngineConfig {
            catalog: PathBuf::from("/does/not/exist.toml"),
            ..Default::default()
        };
        assert!(matches!(
            config.load_catalog(),
            Err(ConfigError::Catalog(_))
        ));
    }
}
