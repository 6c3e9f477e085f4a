//! Validator expressions lowered from the syntax tree.
//!
//! Validator parsing only ever needs four shapes, so the tree is lowered into
//! [`Expr`] once and all classification happens over that closed enum.

use super::{named_children, node_text, strip_quotes};
use serde_json::Value;
use tree_sitter::Node;

/// A validator expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `v.string()`, `v.optional(inner)`, `literal("a")`.
    Call {
        /// Final property name of the callee, or the bare identifier.
        method: Option<String>,
        args: Vec<Expr>,
    },

    /// `v.string`
    Member { property: String },

    /// A string, number, boolean or null literal.
    Literal(Value),

    /// Anything else.
    Other,
}

impl Expr {
    /// Shorthand for a call with a named callee.
    pub fn call(method: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            method: Some(method.to_string()),
            args,
        }
    }

    /// Shorthand for a property access.
    pub fn member(property: &str) -> Self {
        Expr::Member {
            property: property.to_string(),
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// Lower a tree-sitter expression node.
    pub fn from_node(node: Node, content: &str) -> Self {
        match node.kind() {
            "call_expression" => {
                let method = node
                    .child_by_field_name("function")
                    .and_then(|callee| callee_name(callee, content));
                let args = node
                    .child_by_field_name("arguments")
                    .map(|args| {
                        named_children(args)
                            .into_iter()
                            .map(|arg| Expr::from_node(arg, content))
                            .collect()
                    })
                    .unwrap_or_default();
                Expr::Call { method, args }
            }
            "member_expression" => match node.child_by_field_name("property") {
                Some(property) => Expr::Member {
                    property: node_text(property, content).to_string(),
                },
                None => Expr::Other,
            },
            "parenthesized_expression" => named_children(node)
                .first()
                .map(|inner| Expr::from_node(*inner, content))
                .unwrap_or(Expr::Other),
            "string" => Expr::Literal(Value::String(
                strip_quotes(node_text(node, content)).to_string(),
            )),
            "number" => parse_number(node_text(node, content))
                .map(Expr::Literal)
                .unwrap_or(Expr::Other),
            "true" => Expr::Literal(Value::Bool(true)),
            "false" => Expr::Literal(Value::Bool(false)),
            "null" => Expr::Literal(Value::Null),
            _ => Expr::Other,
        }
    }
}

fn callee_name(callee: Node, content: &str) -> Option<String> {
    match callee.kind() {
        "identifier" => Some(node_text(callee, content).to_string()),
        "member_expression" => callee
            .child_by_field_name("property")
            .map(|property| node_text(property, content).to_string()),
        _ => None,
    }
}

fn parse_number(text: &str) -> Option<Value> {
    let cleaned = text.replace('_', "");
    if let Ok(n) = cleaned.parse::<i64>() {
        return Some(Value::from(n));
    }
    cleaned
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
