//! Flags generated from argument schemas, and the input object built from them.
//!
//! Every schema property becomes one `--kebab-name <VALUE>` flag whose value
//! parser converts the token to the JSON value sent to the deployment, so an
//! invalid token is rejected by clap before anything is dispatched.

use crate::naming::kebab_case;
use clap::builder::{PossibleValuesParser, TypedValueParser, ValueParser};
use clap::{Arg, ArgAction, ArgMatches};
use convex_schema::{ArgType, JsonSchema};
use serde_json::{Map, Value};

/// Id of the catch-all argument on commands with an open schema.
pub const OPEN_ARGS_ID: &str = "__open_args";

/// Accept exactly `true` or `false`.
pub fn parse_boolean(token: &str) -> Result<Value, String> {
    match token {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(format!(
            "Invalid boolean value: {}. Use 'true' or 'false'.",
            token
        )),
    }
}

/// Parse a finite number; `integer` floors it.
pub fn parse_number(token: &str, integer: bool) -> Result<Value, String> {
    let trimmed = token.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::from(n));
    }

    let n = trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| format!("Invalid number: {}", token))?;

    if integer {
        let floored = n.floor();
        if floored >= i64::MIN as f64 && floored <= i64::MAX as f64 {
            return Ok(Value::from(floored as i64));
        }
        return Ok(Value::from(floored));
    }
    Ok(Value::from(n))
}

/// Parse a JSON object token.
pub fn parse_object(token: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(token) {
        Ok(value @ Value::Object(_)) => Ok(value),
        _ => Err(format!("Invalid JSON object: {}", token)),
    }
}

fn parse_string(token: &str) -> Result<Value, String> {
    Ok(Value::String(token.to_string()))
}

/// Token representing `value` on the command line.
pub(crate) fn token_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn scalar_parser(arg_type: ArgType) -> ValueParser {
    match arg_type {
        ArgType::Boolean => ValueParser::new(parse_boolean),
        ArgType::Number => ValueParser::new(|token: &str| parse_number(token, false)),
        ArgType::Integer => ValueParser::new(|token: &str| parse_number(token, true)),
        ArgType::Object => ValueParser::new(parse_object),
        ArgType::String | ArgType::Array => ValueParser::new(parse_string),
    }
}

/// Restrict tokens to the literal set, mapping each back to its literal.
fn enum_parser(values: &[Value]) -> ValueParser {
    let choices: Vec<(String, Value)> = values.iter().map(|v| (token_of(v), v.clone())).collect();
    let names: Vec<String> = choices.iter().map(|(token, _)| token.clone()).collect();

    PossibleValuesParser::new(names)
        .map(move |token: String| {
            choices
                .iter()
                .find(|(choice, _)| *choice == token)
                .map(|(_, value)| value.clone())
                .unwrap_or(Value::String(token))
        })
        .into()
}

/// Build the flag for one schema property.
pub fn flag_for(name: &str, schema: &JsonSchema, required: bool) -> Arg {
    let help = schema
        .description
        .clone()
        .unwrap_or_else(|| format!("{} ({})", name, schema.schema_type));

    let arg = Arg::new(name.to_string())
        .long(kebab_case(name))
        .help(help);

    let arg = match (schema.schema_type, &schema.enum_values) {
        (ArgType::Array, _) => {
            let item_type = schema
                .items
                .as_ref()
                .map(|items| items.schema_type)
                .unwrap_or(ArgType::String);
            leading_hyphen(arg, item_type)
                .value_name("VALUE")
                .action(ArgAction::Append)
                .value_parser(scalar_parser(item_type))
        }
        (_, Some(values)) if !values.is_empty() => arg
            .value_name("VALUE")
            .action(ArgAction::Set)
            .value_parser(enum_parser(values)),
        (arg_type, _) => leading_hyphen(arg, arg_type)
            .value_name("VALUE")
            .action(ArgAction::Set)
            .value_parser(scalar_parser(arg_type)),
    };

    // Array defaults are applied when collecting input
    match &schema.default {
        Some(default) if schema.schema_type != ArgType::Array => {
            arg.default_value(token_of(default))
        }
        Some(_) => arg,
        None => arg.required(required),
    }
}

/// Let values such as `-5` or `-x` follow the flag instead of parsing as flags.
fn leading_hyphen(arg: Arg, value_type: ArgType) -> Arg {
    match value_type {
        ArgType::Number | ArgType::Integer => arg.allow_negative_numbers(true),
        ArgType::String => arg.allow_hyphen_values(true),
        _ => arg,
    }
}

/// Whether the open-schema tokens ask for the command's help.
///
/// The catch-all captures every token after the first open flag, `--help`
/// included.
pub fn requests_help(matches: &ArgMatches, schema: &JsonSchema) -> bool {
    schema.is_open()
        && matches
            .get_many::<String>(OPEN_ARGS_ID)
            .is_some_and(|mut tokens| tokens.any(|t| t == "--help"))
}

/// Catch-all argument for commands whose schema accepts any properties.
pub fn open_args() -> Arg {
    Arg::new(OPEN_ARGS_ID)
        .value_name("--KEY VALUE")
        .help("Arguments passed as --key value or --key=value")
        .num_args(1..)
        .allow_hyphen_values(true)
        .trailing_var_arg(true)
        .value_parser(clap::value_parser!(String))
}

/// Parse `--key value`, `--key=value` and bare `--key` (meaning `true`).
pub fn parse_open_args(tokens: &[String]) -> Result<Map<String, Value>, String> {
    let mut input = Map::new();
    let mut iter = tokens.iter().peekable();

    while let Some(token) = iter.next() {
        let flag = token
            .strip_prefix("--")
            .ok_or_else(|| format!("Unexpected argument: {}", token))?;

        let (key, value) = match flag.split_once('=') {
            Some((key, value)) => (key, Value::String(value.to_string())),
            None => match iter.next_if(|next| !next.starts_with("--")) {
                Some(value) => (flag, Value::String(value.clone())),
                None => (flag, Value::Bool(true)),
            },
        };

        if key.is_empty() || key == "help" {
            return Err(format!("Invalid flag: {}", token));
        }
        input.insert(key.to_string(), value);
    }

    Ok(input)
}

/// Build the function's input object from parsed flags.
pub fn collect_input(matches: &ArgMatches, schema: &JsonSchema) -> Result<Map<String, Value>, String> {
    let mut input = Map::new();

    if schema.is_open() {
        if let Some(tokens) = matches.get_many::<String>(OPEN_ARGS_ID) {
            let tokens: Vec<String> = tokens.cloned().collect();
            input.extend(parse_open_args(&tokens)?);
        }
    }

    for (name, property) in schema.property_iter() {
        if property.schema_type == ArgType::Array {
            match matches.get_many::<Value>(name) {
                Some(values) => {
                    input.insert(name.clone(), Value::Array(values.cloned().collect()));
                }
                None => {
                    if let Some(default) = &property.default {
                        input.insert(name.clone(), default.clone());
                    }
                }
            }
        } else if let Some(value) = matches.get_one::<Value>(name) {
            input.insert(name.clone(), value.clone());
        }
    }

    Ok(input)
}
