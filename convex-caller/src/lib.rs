//! Remote function invocation for the Convex CLI.
//!
//! This crate turns a dotted function path plus JSON arguments into a call
//! against a Convex deployment.
//!
//! # Architecture
//!
//! - [`Transport`] executes `query`/`mutation`/`action` calls; [`Connector`]
//!   creates one for a URL. Tests substitute both.
//! - [`ApiNode`] is the typed API handle used to resolve a path to its
//!   canonical reference.
//! - [`RemoteCaller`] connects lazily, resolves the path (or derives a
//!   fallback key) and wraps failures with the path and function type.
//!
//! # Example
//!
//! ```rust,ignore
//! use convex_caller::{ApiNode, HttpConnector, RemoteCaller};
//! use convex_schema::FunctionType;
//!
//! let caller = RemoteCaller::new("http://localhost:3210", ApiNode::default(), HttpConnector::new());
//! let todos = caller.invoke("todos.getAll", FunctionType::Query, serde_json::json!({})).await?;
//! ```

pub mod api;
pub mod caller;
pub mod http;
pub mod transport;

pub use api::{ApiNode, ManifestError};
pub use caller::{CallError, RemoteCaller, fallback_name};
pub use http::{HttpConnector, HttpTransport};
pub use transport::{
    Connector, FunctionReference, FunctionTarget, Transport, TransportError, TransportResult,
};
