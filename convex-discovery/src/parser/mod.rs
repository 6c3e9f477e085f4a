//! Source parsing for function discovery.
//!
//! All parsing uses tree-sitter AST analysis; nothing is evaluated. The
//! submodules split the work the same way the discovery pass does:
//!
//! 1. [`resolver`] reads the generated API barrel to find source modules
//! 2. [`extractor`] walks each module for exported `query`/`mutation`/`action` calls
//! 3. [`expr`] lowers validator expressions into a closed set of shapes
//! 4. [`validator`] maps those shapes to argument definitions

pub mod expr;
pub mod extractor;
pub mod resolver;
pub mod validator;

pub use expr::Expr;
pub use extractor::SignatureExtractor;
pub use resolver::{ModuleEntry, resolve_modules};
pub use validator::parse_validator;

use crate::error::DiscoveryError;
use std::path::Path;
use tree_sitter::{Language, Node, Parser as TSParser, Tree};

/// Grammar used to parse a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    TypeScript,
    JavaScript,
}

impl SourceLanguage {
    /// Pick the grammar from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())? {
            "ts" | "mts" | "cts" => Some(SourceLanguage::TypeScript),
            "js" | "mjs" | "cjs" => Some(SourceLanguage::JavaScript),
            _ => None,
        }
    }

    /// File extension probed when resolving a module, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            SourceLanguage::TypeScript => "ts",
            SourceLanguage::JavaScript => "js",
        }
    }

    pub(crate) fn grammar(&self) -> Language {
        match self {
            SourceLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceLanguage::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

/// Parse `content` into a syntax tree.
///
/// Syntax errors do not fail the parse; tree-sitter recovers and marks
/// `ERROR` nodes, which the walkers simply skip over.
pub(crate) fn parse_source(
    language: &Language,
    content: &str,
    path: &str,
) -> Result<Tree, DiscoveryError> {
    let mut parser = TSParser::new();
    parser
        .set_language(language)
        .map_err(|e| DiscoveryError::TreeSitterError(format!("Failed to set language: {}", e)))?;

    parser
        .parse(content, None)
        .ok_or_else(|| DiscoveryError::ParseFailed {
            path: path.to_string(),
        })
}

pub(crate) fn node_text<'a>(node: Node, content: &'a str) -> &'a str {
    node.utf8_text(content.as_bytes()).unwrap_or("")
}

/// Remove the surrounding quotes of a string literal.
pub(crate) fn strip_quotes(text: &str) -> &str {
    text.trim_matches(|c| c == '"' || c == '\'' || c == '`')
}

/// Named children of `node`, skipping comments.
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}
