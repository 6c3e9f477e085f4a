//! Remote invocation of discovered functions.

use crate::api::ApiNode;
use crate::transport::{Connector, FunctionTarget, Transport, TransportError};
use convex_schema::FunctionType;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::OnceCell;

/// A failed invocation, tagged with what was being called.
#[derive(Debug, Error)]
#[error("Failed to call {function_type} \"{path}\": {source}")]
pub struct CallError {
    pub path: String,
    pub function_type: FunctionType,
    #[source]
    pub source: TransportError,
}

/// Invokes functions on one deployment.
///
/// The transport is connected on the first call and reused afterwards;
/// concurrent first calls share a single connection attempt. A failed
/// attempt is not memoized, so a later call connects again.
pub struct RemoteCaller {
    url: String,
    api: ApiNode,
    connector: Box<dyn Connector>,
    transport: OnceCell<Box<dyn Transport>>,
}

impl RemoteCaller {
    pub fn new(url: impl Into<String>, api: ApiNode, connector: impl Connector + 'static) -> Self {
        Self {
            url: url.into(),
            api,
            connector: Box::new(connector),
            transport: OnceCell::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn api(&self) -> &ApiNode {
        &self.api
    }

    /// Call the function at dotted `path` with `args`.
    ///
    /// # Errors
    /// Connection and call failures are both returned as a [`CallError`]
    /// naming `path` and `function_type`.
    pub async fn invoke(
        &self,
        path: &str,
        function_type: FunctionType,
        args: Value,
    ) -> Result<Value, CallError> {
        let wrap = |source| CallError {
            path: path.to_string(),
            function_type,
            source,
        };

        let transport = self.transport().await.map_err(wrap)?;
        let target = self.target(path);
        tracing::debug!("Calling {} {} as {}", function_type, path, target);

        transport.call(function_type, &target, args).await.map_err(wrap)
    }

    /// Resolve `path` through the API handle, falling back to a derived key.
    pub fn target(&self, path: &str) -> FunctionTarget {
        match self.api.resolve(path) {
            Some(reference) => FunctionTarget::Reference(reference),
            None => FunctionTarget::Name(fallback_name(path)),
        }
    }

    async fn transport(&self) -> Result<&dyn Transport, TransportError> {
        let transport = self
            .transport
            .get_or_try_init(|| async {
                tracing::debug!("Connecting to {}", self.url);
                self.connector.connect(&self.url).await
            })
            .await?;
        Ok(transport.as_ref())
    }
}

/// Transport key for a dotted path: module segments joined with `/`, then
/// `:` and the function name. A path without dots is used as is.
pub fn fallback_name(path: &str) -> String {
    match path.rsplit_once('.') {
        Some((module, function)) if !module.is_empty() && !function.is_empty() => {
            format!("{}:{}", module.replace('.', "/"), function)
        }
        _ => path.to_string(),
    }
}
