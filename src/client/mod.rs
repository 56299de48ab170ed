//! HTTP probe client
//!
//! Probes talk to the backend through the [`Backend`] trait so the run logic
//! can be driven by the real reqwest client or by an in-memory script.

pub mod http;
pub mod types;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub use http::HttpProbeClient;

/// Network-level failure: no HTTP response was received at all
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("cannot connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Response body, parsed as JSON when possible
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    /// Body as a JSON value, raw text becomes a JSON string
    pub fn to_value(&self) -> Value {
        match self {
            ResponseBody::Json(value) => value.clone(),
            ResponseBody::Text(text) => Value::String(text.clone()),
        }
    }
}

impl std::fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{}", value),
            ResponseBody::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Normalized response: status code plus body
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl ProbeResponse {
    pub fn new(status: u16, body: ResponseBody) -> Self {
        Self { status, body }
    }

    pub fn json(status: u16, value: Value) -> Self {
        Self::new(status, ResponseBody::Json(value))
    }

    pub fn text(status: u16, text: &str) -> Self {
        Self::new(status, ResponseBody::Text(text.to_string()))
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Decode the body into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match &self.body {
            ResponseBody::Json(value) => T::deserialize(value),
            ResponseBody::Text(text) => serde_json::from_str(text),
        }
    }

    /// Number of elements when the body is a JSON array
    pub fn array_len(&self) -> Option<usize> {
        self.body
            .as_json()
            .and_then(|value| value.as_array())
            .map(|items| items.len())
    }
}

/// Session-holding connection to the backend under test
#[async_trait]
pub trait Backend: Send + Sync {
    /// Base URL requests are resolved against
    fn base_url(&self) -> &str;

    async fn get(
        &self,
        path: &str,
        timeout: Option<Duration>,
    ) -> Result<ProbeResponse, TransportError>;

    async fn post(
        &self,
        path: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<ProbeResponse, TransportError>;
}
