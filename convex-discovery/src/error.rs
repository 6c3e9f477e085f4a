//! Error types for function discovery.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving or parsing backend modules.
///
/// The discovery pass recovers from all of these locally; they exist so
/// callers and logs can tell "nothing there" apart from "something broke".
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Failed to read a file from disk.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Tree-sitter produced no syntax tree for a file.
    #[error("Failed to parse file: {path}")]
    ParseFailed {
        /// The path (or logical name) of the source that failed to parse.
        path: String,
    },

    /// An error occurred in the tree-sitter parsing library.
    #[error("Tree-sitter error: {0}")]
    TreeSitterError(String),
}

/// Errors from the on-disk discovery cache.
///
/// Never surfaced to the user; the cache degrades to a miss instead.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Source directory not found: {0}")]
    MissingSourceDir(PathBuf),
}
