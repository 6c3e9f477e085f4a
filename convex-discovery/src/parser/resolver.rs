//! Module resolution from the generated API barrel.
//!
//! The code generator emits one namespace import per backend module:
//!
//! ```text
//! import type * as todos from "../todos.js";
//! import type * as lib_utils from "../lib/utils.js";
//! ```
//!
//! Only imports of that exact shape are considered; everything else in the
//! barrel is ignored.

use super::{SourceLanguage, node_text, parse_source, strip_quotes};
use crate::error::DiscoveryError;
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tree_sitter::{Query, QueryCursor};

/// Specifier prefix of a module one directory above the generated output.
pub const PARENT_PREFIX: &str = "../";

/// Specifier suffix the code generator uses for compiled modules.
pub const COMPILED_SUFFIX: &str = ".js";

const NAMESPACE_IMPORT_QUERY: &str = r#"
(import_statement
  (import_clause
    (namespace_import (identifier) @name))
  source: (string) @source)
"#;

/// A backend module declared by the barrel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleEntry {
    /// Logical module name (the namespace identifier).
    pub name: String,

    /// Path relative to the backend directory, without extension (e.g. `lib/utils`).
    pub file: String,
}

impl ModuleEntry {
    /// Canonical transport name of a function exported by this module.
    pub fn reference(&self, function: &str) -> String {
        format!("{}:{}", self.file, function)
    }
}

/// Extract module entries from the barrel file's text, in declaration order.
pub fn resolve_modules(content: &str) -> Result<Vec<ModuleEntry>, DiscoveryError> {
    let language = SourceLanguage::TypeScript.grammar();
    let tree = parse_source(&language, content, "api.d.ts")?;

    let query = Query::new(&language, NAMESPACE_IMPORT_QUERY)
        .map_err(|e| DiscoveryError::TreeSitterError(format!("Invalid import query: {}", e)))?;
    let name_index = query.capture_index_for_name("name");
    let source_index = query.capture_index_for_name("source");

    let mut modules = Vec::new();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), content.as_bytes());
    while let Some(match_) = matches.next() {
        let mut name = None;
        let mut source = None;
        for capture in match_.captures {
            if Some(capture.index) == name_index {
                name = Some(node_text(capture.node, content));
            } else if Some(capture.index) == source_index {
                source = Some(strip_quotes(node_text(capture.node, content)));
            }
        }

        let (Some(name), Some(specifier)) = (name, source) else {
            continue;
        };

        match module_file(specifier) {
            Some(file) => modules.push(ModuleEntry {
                name: name.to_string(),
                file: file.to_string(),
            }),
            None => tracing::debug!("Ignoring non-module import: {}", specifier),
        }
    }

    Ok(modules)
}

/// Read and resolve a barrel file. A missing barrel is the "no backend
/// generated yet" state and yields an empty list.
pub fn read_barrel(path: &Path) -> Result<Vec<ModuleEntry>, DiscoveryError> {
    if !path.exists() {
        tracing::debug!("No API barrel at {}", path.display());
        return Ok(vec![]);
    }

    let content = std::fs::read_to_string(path)?;
    resolve_modules(&content)
}

fn module_file(specifier: &str) -> Option<&str> {
    specifier
        .strip_prefix(PARENT_PREFIX)
        .and_then(|rest| rest.strip_suffix(COMPILED_SUFFIX))
        .filter(|file| !file.is_empty())
}
