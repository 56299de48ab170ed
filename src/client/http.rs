use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::{Duration, Instant};

use super::{Backend, ProbeResponse, ResponseBody, TransportError};

/// reqwest-backed client with a cookie store shared by every request
pub struct HttpProbeClient {
    base_url: String,
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HttpProbeClient {
    /// Create a new client for `base_url` (scheme included, no trailing slash)
    pub fn new(base_url: &str, default_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(default_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            default_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        method: &str,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<ProbeResponse, TransportError> {
        let timeout = timeout.unwrap_or(self.default_timeout);
        let started = Instant::now();

        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, url, timeout))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| classify(e, url, timeout))?;

        log::debug!(
            "{} {} -> {} ({}ms, {} bytes)",
            method,
            url,
            status,
            started.elapsed().as_millis(),
            text.len()
        );

        Ok(ProbeResponse::new(status, ResponseBody::from_text(text)))
    }
}

#[async_trait]
impl Backend for HttpProbeClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get(
        &self,
        path: &str,
        timeout: Option<Duration>,
    ) -> Result<ProbeResponse, TransportError> {
        let url = self.url(path);
        let request = self.client.get(&url);
        self.send(request, "GET", &url, timeout).await
    }

    async fn post(
        &self,
        path: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<ProbeResponse, TransportError> {
        let url = self.url(path);
        let request = self.client.post(&url).json(body);
        self.send(request, "POST", &url, timeout).await
    }
}

/// Map a reqwest failure onto the transport taxonomy
fn classify(error: reqwest::Error, url: &str, timeout: Duration) -> TransportError {
    log::debug!("request to {} failed: {:?}", url, error);

    let url = url.to_string();
    if error.is_timeout() {
        TransportError::Timeout {
            url,
            timeout_ms: timeout.as_millis() as u64,
        }
    } else if error.is_connect() {
        TransportError::Connect {
            url,
            reason: root_cause(&error),
        }
    } else if error.is_builder() {
        TransportError::InvalidUrl {
            url,
            reason: error.to_string(),
        }
    } else {
        TransportError::Request {
            url,
            reason: root_cause(&error),
        }
    }
}

fn root_cause(error: &(dyn std::error::Error + 'static)) -> String {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current.to_string()
}
