//! Function and argument definitions.

use crate::error::SchemaError;
use crate::schema::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The semantic kind of a remotely callable function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionType {
    /// Read-only function
    Query,
    /// Transactional write
    Mutation,
    /// Side-effecting function that may call third parties
    Action,
}

impl FunctionType {
    /// Get the factory identifier that declares this kind of function.
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionType::Query => "query",
            FunctionType::Mutation => "mutation",
            FunctionType::Action => "action",
        }
    }

    /// Classify a factory identifier, returning `None` for anything else.
    pub fn from_factory(name: &str) -> Option<Self> {
        match name {
            "query" => Some(FunctionType::Query),
            "mutation" => Some(FunctionType::Mutation),
            "action" => Some(FunctionType::Action),
            _ => None,
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FunctionType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_factory(s).ok_or_else(|| SchemaError::UnknownFunctionType(s.to_string()))
    }
}

/// Primitive type tag of an argument or schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ArgType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArgType::String => "string",
            ArgType::Number => "number",
            ArgType::Integer => "integer",
            ArgType::Boolean => "boolean",
            ArgType::Array => "array",
            ArgType::Object => "object",
        }
    }

    /// The type tag describing a JSON literal.
    pub fn of_literal(value: &Value) -> Self {
        match value {
            Value::Bool(_) => ArgType::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ArgType::Integer,
            Value::Number(_) => ArgType::Number,
            Value::Array(_) => ArgType::Array,
            Value::Object(_) => ArgType::Object,
            Value::String(_) | Value::Null => ArgType::String,
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArgType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ArgType::String),
            "number" => Ok(ArgType::Number),
            "integer" => Ok(ArgType::Integer),
            "boolean" => Ok(ArgType::Boolean),
            "array" => Ok(ArgType::Array),
            "object" => Ok(ArgType::Object),
            _ => Err(SchemaError::UnknownArgType(s.to_string())),
        }
    }
}

/// A single declared argument of a function.
///
/// Discovery fills in `type` and `required`, plus `items` for arrays and
/// `enum` for literal validators. `default` and `description` only come from
/// manually registered definitions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArgDefinition {
    #[serde(rename = "type")]
    pub arg_type: ArgType,

    pub required: bool,

    /// Item type when `arg_type` is [`ArgType::Array`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ArgType>,

    /// Accepted literal values.
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ArgDefinition {
    /// A required argument of the given type.
    pub fn required(arg_type: ArgType) -> Self {
        Self {
            arg_type,
            required: true,
            ..Default::default()
        }
    }

    /// An optional argument of the given type.
    pub fn optional(arg_type: ArgType) -> Self {
        Self {
            arg_type,
            required: false,
            ..Default::default()
        }
    }

    /// Set the array item type (builder pattern).
    pub fn with_items(mut self, items: ArgType) -> Self {
        self.items = Some(items);
        self
    }

    /// Restrict the argument to a set of literals (builder pattern).
    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    /// Set the default value (builder pattern).
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// An exported callable declaration, as found in a source module or
/// registered by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,

    #[serde(rename = "type")]
    pub function_type: FunctionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// `None` means untyped; an empty map means the function takes no arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<BTreeMap<String, ArgDefinition>>,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, function_type: FunctionType) -> Self {
        Self {
            name: name.into(),
            function_type,
            module: None,
            args: None,
        }
    }

    /// Set the logical module name (builder pattern).
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Add a declared argument (builder pattern).
    pub fn arg(mut self, name: impl Into<String>, def: ArgDefinition) -> Self {
        self.args
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), def);
        self
    }

    /// Mark the function as taking no arguments (builder pattern).
    pub fn without_args(mut self) -> Self {
        self.args = Some(BTreeMap::new());
        self
    }

    /// The dot-joined `module.name` path, or just `name` at the root.
    pub fn path(&self) -> String {
        match &self.module {
            Some(module) if !module.is_empty() => format!("{}.{}", module, self.name),
            _ => self.name.clone(),
        }
    }
}

/// A function ready for command building and dispatch.
///
/// `path` is the stable identity used for lookup, logging and remote calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFunction {
    pub path: String,

    #[serde(rename = "type")]
    pub function_type: FunctionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<BTreeMap<String, ArgDefinition>>,

    pub json_schema: JsonSchema,

    /// Canonical transport name (e.g. `lib/utils:format`) when discovery knows
    /// the source file behind the module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl ParsedFunction {
    /// Convert a definition, generating its argument schema.
    pub fn from_definition(def: &FunctionDefinition) -> Self {
        Self {
            path: def.path(),
            function_type: def.function_type,
            args: def.args.clone(),
            json_schema: JsonSchema::from_args(def.args.as_ref()),
            reference: None,
        }
    }

    /// Attach a canonical transport name (builder pattern).
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// The first dot-segment, or `None` for root-level functions.
    pub fn module(&self) -> Option<&str> {
        match self.path.split_once('.') {
            Some((module, _)) => Some(module),
            None => None,
        }
    }

    /// The final dot-segment of the path.
    pub fn function_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(&self.path)
    }
}
