//! HTTP transport for Convex deployments.
//!
//! Every call is a JSON `POST` to `{url}/api/{query|mutation|action}`:
//!
//! ```text
//! request:  { "path": "todos:create", "args": { "text": "x" }, "format": "json" }
//! response: { "status": "success", "value": ... }
//!           { "status": "error", "errorMessage": "..." }
//! ```

use crate::transport::{Connector, FunctionTarget, Transport, TransportError, TransportResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct CallRequest<'a> {
    path: &'a str,
    args: Value,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum CallResponse {
    Success {
        value: Value,
    },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

/// Connects [`HttpTransport`]s with a shared request timeout.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    timeout_secs: u64,
}

impl HttpConnector {
    pub fn new() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the request timeout in seconds (builder pattern).
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for HttpConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, url: &str) -> TransportResult<Box<dyn Transport>> {
        Ok(Box::new(HttpTransport::new(url, self.timeout_secs)?))
    }
}

/// A deployment client over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpTransport {
    /// Create a transport for the deployment at `url`.
    ///
    /// # Errors
    /// Returns [`TransportError::InitFailed`] if the URL is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(url: &str, timeout_secs: u64) -> TransportResult<Self> {
        let base_url = url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(TransportError::InitFailed {
                url: url.to_string(),
                message: "deployment URL must start with http:// or https://".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TransportError::InitFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout_secs,
        })
    }

    /// Endpoint for one kind of call.
    pub fn endpoint(&self, kind: &str) -> String {
        format!("{}/api/{}", self.base_url, kind)
    }

    async fn post(&self, kind: &str, target: &FunctionTarget, args: Value) -> TransportResult<Value> {
        let body = CallRequest {
            path: target.name(),
            args,
            format: "json",
        };

        tracing::debug!("POST {} ({})", self.endpoint(kind), target);
        let response = self
            .client
            .post(self.endpoint(kind))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.request_error(e))?;

        // Function errors arrive with a non-2xx status but a regular envelope
        match serde_json::from_str::<CallResponse>(&text) {
            Ok(envelope) => decode(envelope),
            Err(_) if !status.is_success() => Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            }),
            Err(e) => Err(TransportError::InvalidResponse(e.to_string())),
        }
    }

    fn request_error(&self, error: reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(self.timeout_secs)
        } else {
            TransportError::Request(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn query(&self, target: &FunctionTarget, args: Value) -> TransportResult<Value> {
        self.post("query", target, args).await
    }

    async fn mutation(&self, target: &FunctionTarget, args: Value) -> TransportResult<Value> {
        self.post("mutation", target, args).await
    }

    async fn action(&self, target: &FunctionTarget, args: Value) -> TransportResult<Value> {
        self.post("action", target, args).await
    }
}

fn decode(envelope: CallResponse) -> TransportResult<Value> {
    match envelope {
        CallResponse::Success { value } => Ok(value),
        CallResponse::Error { error_message } => Err(TransportError::Function(error_message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_endpoint() {
        let transport = HttpTransport::new("https://happy-otter-123.convex.cloud/", 30).unwrap();
        assert_eq!(
            transport.endpoint("mutation"),
            "https://happy-otter-123.convex.cloud/api/mutation"
        );
    }

    #[test]
    fn test_rejects_relative_url() {
        let err = HttpTransport::new("happy-otter-123", 30).unwrap_err();
        assert!(matches!(err, TransportError::InitFailed { .. }));
        assert!(err.to_string().contains("happy-otter-123"));
    }

    #[test]
    fn test_request_body() {
        let body = CallRequest {
            path: "todos:create",
            args: json!({"text": "buy milk"}),
            format: "json",
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"path": "todos:create", "args": {"text": "buy milk"}, "format": "json"})
        );
    }

    #[test]
    fn test_decode_envelopes() {
        let ok: CallResponse =
            serde_json::from_value(json!({"status": "success", "value": [1, 2], "logLines": []}))
                .unwrap();
        assert_eq!(decode(ok).unwrap(), json!([1, 2]));

        let err: CallResponse =
            serde_json::from_value(json!({"status": "error", "errorMessage": "boom"})).unwrap();
        assert!(matches!(decode(err), Err(TransportError::Function(m)) if m == "boom"));
    }

    #[tokio::test]
    async fn test_connector_builds_transport() {
        let connector = HttpConnector::new().with_timeout(5);
        assert!(connector.connect("http://localhost:3210").await.is_ok());
        assert!(connector.connect("localhost:3210").await.is_err());
    }
}
