//! Signature extraction from backend source modules.
//!
//! Detects top-level exports of the form:
//!
//! ```text
//! export const create = mutation({
//!   args: { text: v.string(), done: v.optional(v.boolean()) },
//!   handler: async (ctx, args) => { ... },
//! });
//! ```
//!
//! Any export whose initializer is not a direct call to `query`, `mutation`
//! or `action` is skipped.

use super::expr::Expr;
use super::validator::parse_validator;
use super::{SourceLanguage, named_children, node_text, parse_source, strip_quotes};
use crate::error::DiscoveryError;
use convex_schema::{ArgDefinition, FunctionDefinition, FunctionType};
use std::collections::BTreeMap;
use tree_sitter::{Language, Node, Parser as TSParser};

/// Extracts exported function declarations with their argument validators.
pub struct SignatureExtractor {
    typescript: Language,
    javascript: Language,
}

impl SignatureExtractor {
    /// Create a new extractor.
    ///
    /// # Errors
    /// Returns an error if either grammar cannot be loaded into tree-sitter.
    pub fn new() -> Result<Self, DiscoveryError> {
        let typescript = SourceLanguage::TypeScript.grammar();
        let javascript = SourceLanguage::JavaScript.grammar();

        // Verify both grammars are ABI-compatible before any file is parsed
        let mut parser = TSParser::new();
        for language in [&typescript, &javascript] {
            parser.set_language(language).map_err(|e| {
                DiscoveryError::TreeSitterError(format!("Failed to set language: {}", e))
            })?;
        }

        Ok(Self {
            typescript,
            javascript,
        })
    }

    fn grammar(&self, language: SourceLanguage) -> &Language {
        match language {
            SourceLanguage::TypeScript => &self.typescript,
            SourceLanguage::JavaScript => &self.javascript,
        }
    }

    /// Extract every exported callable from one module, in source order.
    ///
    /// # Arguments
    /// * `content` - The module's source text
    /// * `module` - Logical module name recorded on each definition
    /// * `language` - Grammar to parse with
    pub fn extract(
        &self,
        content: &str,
        module: &str,
        language: SourceLanguage,
    ) -> Result<Vec<FunctionDefinition>, DiscoveryError> {
        let tree = parse_source(self.grammar(language), content, module)?;
        let mut functions = Vec::new();

        for statement in named_children(tree.root_node()) {
            if statement.kind() != "export_statement" {
                continue;
            }
            let Some(declaration) = statement.child_by_field_name("declaration") else {
                continue;
            };
            if !matches!(
                declaration.kind(),
                "lexical_declaration" | "variable_declaration"
            ) {
                continue;
            }

            for declarator in named_children(declaration) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(function) = parse_declarator(declarator, content, module) {
                    functions.push(function);
                }
            }
        }

        Ok(functions)
    }
}

/// Classify one `name = initializer` pair.
fn parse_declarator(declarator: Node, content: &str, module: &str) -> Option<FunctionDefinition> {
    let name = declarator
        .child_by_field_name("name")
        .filter(|n| n.kind() == "identifier")?;
    let value = declarator.child_by_field_name("value")?;
    if value.kind() != "call_expression" {
        return None;
    }

    let callee = value.child_by_field_name("function")?;
    let function_type = FunctionType::from_factory(node_text(callee, content))?;

    let args = value
        .child_by_field_name("arguments")
        .map(|arguments| extract_args(arguments, content))
        .unwrap_or_default();

    Some(FunctionDefinition {
        name: node_text(name, content).to_string(),
        function_type,
        module: Some(module.to_string()),
        args: Some(args),
    })
}

/// Read the `args` object of the factory call's configuration object.
///
/// Anything other than `{ args: { ... } }` as the first argument means the
/// function takes no arguments.
fn extract_args(arguments: Node, content: &str) -> BTreeMap<String, ArgDefinition> {
    let Some(config) = named_children(arguments).into_iter().next() else {
        return BTreeMap::new();
    };
    if config.kind() != "object" {
        return BTreeMap::new();
    }

    let args_object = object_pairs(config, content)
        .into_iter()
        .find(|(key, _)| *key == "args")
        .map(|(_, value)| value)
        .filter(|value| value.kind() == "object");

    match args_object {
        Some(object) => object_pairs(object, content)
            .into_iter()
            .map(|(key, value)| {
                (
                    key.to_string(),
                    parse_validator(&Expr::from_node(value, content)),
                )
            })
            .collect(),
        None => BTreeMap::new(),
    }
}

/// `key: value` pairs of an object literal; shorthand and spread entries are skipped.
fn object_pairs<'t, 'c>(object: Node<'t>, content: &'c str) -> Vec<(&'c str, Node<'t>)> {
    named_children(object)
        .into_iter()
        .filter(|child| child.kind() == "pair")
        .filter_map(|pair| {
            let key = pair.child_by_field_name("key")?;
            let value = pair.child_by_field_name("value")?;
            Some((strip_quotes(node_text(key, content)), value))
        })
        .collect()
}
