//! The typed API handle.
//!
//! A nested map from module names to function references, mirroring the
//! `api` object a Convex project generates:
//!
//! ```json
//! { "todos": { "create": "todos:create" }, "lib_utils": { "format": "lib/utils:format" } }
//! ```

use crate::transport::FunctionReference;
use convex_schema::ParsedFunction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading an API manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read API manifest {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid API manifest {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One node of the API handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiNode {
    /// A callable, holding its canonical transport name.
    Function(String),

    /// A module or directory of further nodes.
    Namespace(BTreeMap<String, ApiNode>),
}

impl Default for ApiNode {
    fn default() -> Self {
        ApiNode::Namespace(BTreeMap::new())
    }
}

impl ApiNode {
    /// Walk the handle along a dotted path.
    ///
    /// Returns `None` when any segment is missing, when a function is reached
    /// before the last segment, or when the path ends on a namespace.
    pub fn resolve(&self, path: &str) -> Option<FunctionReference> {
        let mut current = self;
        for segment in path.split('.') {
            match current {
                ApiNode::Namespace(children) => current = children.get(segment)?,
                ApiNode::Function(_) => return None,
            }
        }

        match current {
            ApiNode::Function(name) => Some(FunctionReference::new(name.clone())),
            ApiNode::Namespace(_) => None,
        }
    }

    /// Build a handle from discovered functions that carry a reference.
    ///
    /// Functions without a reference are left out, as are functions whose
    /// path collides with one already inserted.
    pub fn from_functions(functions: &[ParsedFunction]) -> Self {
        let mut root = ApiNode::default();
        for function in functions {
            let Some(reference) = &function.reference else {
                continue;
            };
            if !root.insert(&function.path, reference) {
                tracing::debug!("Skipping conflicting API path {}", function.path);
            }
        }
        root
    }

    /// Load a handle from a JSON manifest file.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ManifestError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of callables reachable from this node.
    pub fn function_count(&self) -> usize {
        match self {
            ApiNode::Function(_) => 1,
            ApiNode::Namespace(children) => children.values().map(ApiNode::function_count).sum(),
        }
    }

    fn insert(&mut self, path: &str, reference: &str) -> bool {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((last, parents)) = segments.split_last() else {
            return false;
        };

        let mut current = self;
        for segment in parents {
            let ApiNode::Namespace(children) = current else {
                return false;
            };
            current = children
                .entry(segment.to_string())
                .or_insert_with(ApiNode::default);
        }

        let ApiNode::Namespace(children) = current else {
            return false;
        };
        if children.contains_key(*last) {
            return false;
        }
        children.insert(last.to_string(), ApiNode::Function(reference.to_string()));
        true
    }
}
