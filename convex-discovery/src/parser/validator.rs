//! Mapping from validator expressions to argument definitions.

use super::expr::Expr;
use convex_schema::{ArgDefinition, ArgType};
use serde_json::Value;

/// Classify a validator expression.
///
/// Unrecognized shapes fall back to a required string so that one odd
/// validator never aborts discovery of the whole module.
pub fn parse_validator(expr: &Expr) -> ArgDefinition {
    match expr {
        Expr::Call {
            method: Some(method),
            args,
        } if method == "optional" => match args.first() {
            Some(inner) => ArgDefinition {
                required: false,
                ..parse_validator(inner)
            },
            None => fallback(),
        },
        Expr::Call {
            method: Some(method),
            args,
        } => from_method(method, args),
        Expr::Member { property } => from_method(property, &[]),
        Expr::Call { method: None, .. } | Expr::Literal(_) | Expr::Other => fallback(),
    }
}

fn fallback() -> ArgDefinition {
    ArgDefinition::required(ArgType::String)
}

fn from_method(method: &str, args: &[Expr]) -> ArgDefinition {
    match method {
        "string" | "id" => ArgDefinition::required(ArgType::String),
        "number" | "float64" => ArgDefinition::required(ArgType::Number),
        "int64" | "bigint" => ArgDefinition::required(ArgType::Integer),
        "boolean" => ArgDefinition::required(ArgType::Boolean),
        "object" | "record" => ArgDefinition::required(ArgType::Object),
        "array" => {
            let def = ArgDefinition::required(ArgType::Array);
            match args.first() {
                Some(inner) => def.with_items(parse_validator(inner).arg_type),
                None => def,
            }
        }
        "literal" => match args.first().and_then(Expr::as_literal) {
            Some(value) => {
                ArgDefinition::required(ArgType::of_literal(value)).with_enum(vec![value.clone()])
            }
            None => fallback(),
        },
        "union" => union_of(args),
        _ => fallback(),
    }
}

/// A union of literals becomes an enum; any other union is a plain string.
fn union_of(args: &[Expr]) -> ArgDefinition {
    let literals: Option<Vec<Value>> = args.iter().map(literal_member).collect();

    match literals {
        Some(values) if !values.is_empty() => {
            let first = ArgType::of_literal(&values[0]);
            let arg_type = if values.iter().all(|v| ArgType::of_literal(v) == first) {
                first
            } else {
                ArgType::String
            };
            ArgDefinition::required(arg_type).with_enum(values)
        }
        _ => fallback(),
    }
}

fn literal_member(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Call {
            method: Some(method),
            args,
        } if method == "literal" => args.first().and_then(Expr::as_literal).cloned(),
        _ => None,
    }
}
