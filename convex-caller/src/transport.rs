//! Transport trait and error types.
//!
//! A [`Transport`] executes one function call against a deployment. A
//! [`Connector`] produces a transport for a deployment URL; the caller
//! connects lazily, on the first invocation.

use async_trait::async_trait;
use convex_schema::FunctionType;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while talking to a deployment.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The client could not be constructed.
    #[error("Failed to initialize client for {url}: {message}")]
    InitFailed { url: String, message: String },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Request(String),

    /// The deployment answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The function itself raised an error.
    #[error("{0}")]
    Function(String),

    /// The response body could not be understood.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No response within the configured timeout.
    #[error("Timed out after {0} seconds")]
    Timeout(u64),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// A function handle resolved from the typed API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionReference {
    /// Canonical transport name, e.g. `lib/utils:format`.
    pub name: String,
}

impl FunctionReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// What a call is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionTarget {
    /// A reference resolved through the API handle.
    Reference(FunctionReference),

    /// A string key derived from the dotted path.
    Name(String),
}

impl FunctionTarget {
    /// Transport-level function name.
    pub fn name(&self) -> &str {
        match self {
            FunctionTarget::Reference(reference) => &reference.name,
            FunctionTarget::Name(name) => name,
        }
    }
}

impl fmt::Display for FunctionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A connected client able to run functions.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn query(&self, target: &FunctionTarget, args: Value) -> TransportResult<Value>;

    async fn mutation(&self, target: &FunctionTarget, args: Value) -> TransportResult<Value>;

    async fn action(&self, target: &FunctionTarget, args: Value) -> TransportResult<Value>;

    /// Dispatch on the semantic function type.
    async fn call(
        &self,
        function_type: FunctionType,
        target: &FunctionTarget,
        args: Value,
    ) -> TransportResult<Value> {
        match function_type {
            FunctionType::Query => self.query(target, args).await,
            FunctionType::Mutation => self.mutation(target, args).await,
            FunctionType::Action => self.action(target, args).await,
        }
    }
}

/// Builds a [`Transport`] for a deployment URL.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> TransportResult<Box<dyn Transport>>;
}
