//! Endpoint configuration for one Solana node.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::errors::ClientError;

/// The pair of endpoints the client binds to: an HTTP JSON-RPC URL and a
/// websocket subscription URL.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
    /// The HTTP RPC endpoint URL (`http` or `https`).
    pub http_url: String,
    /// The websocket subscription endpoint URL (`ws` or `wss`).
    pub ws_url: String,
}

impl EndpointConfig {
    pub fn new(http_url: impl Into<String>, ws_url: impl Into<String>) -> Self {
        Self {
            http_url: http_url.into(),
            ws_url: ws_url.into(),
        }
    }

    /// The standard endpoints of a local test validator.
    pub fn localnet() -> Self {
        Self::new("http://127.0.0.1:8899", "ws://127.0.0.1:8900")
    }

    /// Checks that both URLs parse and carry the expected schemes.
    pub fn validate(&self) -> Result<(), ClientError> {
        let rpc = Url::parse(&self.http_url).map_err(|e| {
            ClientError::Configuration(format!("invalid RPC URL {}: {}", self.http_url, e))
        })?;
        if !matches!(rpc.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "RPC URL {} must use http or https",
                self.http_url
            )));
        }

        let ws = Url::parse(&self.ws_url).map_err(|e| {
            ClientError::Configuration(format!("invalid subscription URL {}: {}", self.ws_url, e))
        })?;
        if !matches!(ws.scheme(), "ws" | "wss") {
            return Err(ClientError::Configuration(format!(
                "subscription URL {} must use ws or wss",
                self.ws_url
            )));
        }

        Ok(())
    }
}
