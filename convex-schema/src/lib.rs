//! # convex-schema
//!
//! Function definitions and argument schemas for the Convex CLI.
//!
//! This crate holds the data model shared by discovery, command building and
//! dispatch:
//!
//! - **FunctionDefinition**: an exported `query`/`mutation`/`action` with its declared arguments
//! - **ParsedFunction**: a definition plus its generated schema, keyed by dotted path
//! - **JsonSchema**: the normalized argument schema
//!
//! ## Example
//!
//! ```rust
//! use convex_schema::{ArgDefinition, ArgType, FunctionDefinition, FunctionType, ParsedFunction};
//!
//! let def = FunctionDefinition::new("create", FunctionType::Mutation)
//!     .in_module("todos")
//!     .arg("text", ArgDefinition::required(ArgType::String));
//!
//! let parsed = ParsedFunction::from_definition(&def);
//! assert_eq!(parsed.path, "todos.create");
//! assert!(parsed.json_schema.is_required("text"));
//! ```

pub mod error;
pub mod function;
pub mod schema;

pub use error::SchemaError;
pub use function::{ArgDefinition, ArgType, FunctionDefinition, FunctionType, ParsedFunction};
pub use schema::JsonSchema;
