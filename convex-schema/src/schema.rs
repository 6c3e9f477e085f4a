//! Normalized argument schemas.
//!
//! [`JsonSchema::from_args`] turns the raw argument metadata of a function into
//! the JSON-Schema-like shape consumed by the command builder and stored in the
//! discovery cache.

use crate::function::{ArgDefinition, ArgType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A normalized schema node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSchema {
    #[serde(rename = "type")]
    pub schema_type: ArgType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, JsonSchema>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<JsonSchema>>,

    /// Omitted entirely when nothing is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,

    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JsonSchema {
    /// A bare schema of the given type.
    pub fn of_type(schema_type: ArgType) -> Self {
        Self {
            schema_type,
            properties: None,
            items: None,
            required: None,
            enum_values: None,
            default: None,
            additional_properties: None,
            description: None,
        }
    }

    /// The permissive schema of an untyped function.
    pub fn open_object() -> Self {
        Self {
            properties: Some(BTreeMap::new()),
            additional_properties: Some(true),
            ..Self::of_type(ArgType::Object)
        }
    }

    /// Generate the schema for a function's declared arguments.
    ///
    /// `None` yields [`JsonSchema::open_object`]. Otherwise every argument
    /// becomes a property and required arguments are listed in `required`.
    pub fn from_args(args: Option<&BTreeMap<String, ArgDefinition>>) -> Self {
        let Some(args) = args else {
            return Self::open_object();
        };

        let mut properties = BTreeMap::new();
        let mut required = Vec::new();

        for (name, def) in args {
            properties.insert(name.clone(), Self::property(name, def));
            if def.required {
                required.push(name.clone());
            }
        }

        Self {
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
            ..Self::of_type(ArgType::Object)
        }
    }

    fn property(name: &str, def: &ArgDefinition) -> Self {
        Self {
            items: def.items.map(|item| Box::new(Self::of_type(item))),
            enum_values: def.enum_values.clone(),
            default: def.default.clone(),
            description: Some(
                def.description
                    .clone()
                    .unwrap_or_else(|| format!("{} ({})", name, def.arg_type)),
            ),
            ..Self::of_type(def.arg_type)
        }
    }

    /// Whether `name` is listed as required.
    pub fn is_required(&self, name: &str) -> bool {
        self.required
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }

    /// Whether the schema accepts properties it does not declare.
    pub fn is_open(&self) -> bool {
        self.additional_properties == Some(true)
    }

    /// Declared properties, empty when none are declared.
    pub fn property_iter(&self) -> impl Iterator<Item = (&String, &JsonSchema)> {
        self.properties.iter().flat_map(|props| props.iter())
    }
}
