// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dictionary of permission nodes and the actions which can be granted on them.
//!
//! The catalog is loaded once when the process starts and never changes afterwards. Components
//! which need it receive it explicitly, usually behind an `Arc`.
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::permission::validate_name;

/// Errors which occur while loading a node catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog source could not be read.
    #[error("could not read node catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog source is not a TOML table of node names to action lists.
    #[error("malformed node catalog: {0}")]
    Toml(#[from] toml::de::Error),

    /// Catalog source is not a JSON object of node names to action lists.
    #[error("malformed node catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// Node or action name contains characters other than lowercase letters and underscores.
    #[error("invalid node or action name '{0}' in catalog")]
    InvalidName(String),
}

/// Immutable mapping from node names to the actions which are legal on them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NodeCatalog {
    nodes: BTreeMap<String, Vec<String>>,
}

impl NodeCatalog {
    /// Builds a catalog from node names and their actions.
    ///
    /// Duplicate actions of a node are collapsed, their first occurrence determines the order.
    pub fn from_nodes<I, N, A>(nodes: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
    {
        let mut catalog = BTreeMap::new();

        for (node, actions) in nodes {
            let node = node.into();
            if !validate_name(&node) {
                return Err(CatalogError::InvalidName(node));
            }

            let mut unique: Vec<String> = Vec::new();
            for action in actions {
                let action = action.into();
                if !validate_name(&action) {
                    return Err(CatalogError::InvalidName(action));
                }
                if !unique.contains(&action) {
                    unique.push(action);
                }
            }

            catalog.insert(node, unique);
        }

        debug!(nodes = catalog.len(), "loaded permission node catalog");

        Ok(Self { nodes: catalog })
    }

    /// Parses a TOML document, for example `survey = ["create", "read"]`.
    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let nodes: BTreeMap<String, Vec<String>> = toml::from_str(source)?;
        Self::from_nodes(nodes)
    }

    /// Parses a JSON document, for example `{ "survey": ["create", "read"] }`.
    pub fn from_json_str(source: &str) -> Result<Self, CatalogError> {
        let nodes: BTreeMap<String, Vec<String>> = serde_json::from_str(source)?;
        Self::from_nodes(nodes)
    }

    /// Reads a catalog file, `.json` files are parsed as JSON and everything else as TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;

        match path.extension().and_then(|extension| extension.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_toml_str(&source),
        }
    }

    /// Returns `true` if the node exists and lists the given action.
    pub fn contains(&self, node: &str, action: &str) -> bool {
        self.nodes
            .get(node)
            .is_some_and(|actions| actions.iter().any(|a| a == action))
    }

    /// Returns the legal actions of a node.
    pub fn actions(&self, node: &str) -> Option<&[String]> {
        self.nodes.get(node).map(Vec::as_slice)
    }

    /// Read-only view of all nodes and their actions.
    pub fn all(&self) -> &BTreeMap<String, Vec<String>> {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
