//! JSON-RPC 2.0 over HTTP

use super::{RpcError, RpcTransport};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Default timeout for one RPC round trip in seconds
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 300;

/// Longest response body echoed back in an HTTP error
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RemoteError>,
}

#[derive(Debug, Deserialize)]
struct RemoteError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// JSON-RPC transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, RpcError> {
        Self::with_timeout(endpoint, Duration::from_secs(DEFAULT_RPC_TIMEOUT_SECS))
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("callsync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": chrono::Utc::now().timestamp(),
            "method": method,
            "params": params,
        });

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // A remote error object wins over the HTTP status
        let envelope = match serde_json::from_str::<Envelope>(&body) {
            Ok(Envelope {
                error: Some(remote),
                ..
            }) => {
                return Err(RpcError::Remote {
                    code: remote.code,
                    message: remote.message,
                    data: remote.data,
                })
            },
            other => other,
        };

        if !status.is_success() {
            return Err(RpcError::Http {
                status: status.as_u16(),
                body: truncate(&body, ERROR_BODY_LIMIT),
            });
        }

        match envelope {
            Ok(Envelope {
                result: Some(result),
                ..
            }) => Ok(result),
            Ok(_) => Err(RpcError::InvalidResponse(
                "response has neither result nor error".to_string(),
            )),
            Err(e) => Err(RpcError::InvalidResponse(e.to_string())),
        }
    }
}

fn truncate(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("привет", 2), "пр...");
    }
}
