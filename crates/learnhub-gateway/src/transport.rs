//! Network exchange with the backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::config::{ConfigError, GatewayConfig};
use crate::envelope::RequestEnvelope;
use crate::error::TransportError;

/// Performs a single request/response exchange.
///
/// Implementations return expected HTTP error statuses as
/// [`TransportError::Status`] rather than panicking or retrying.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, envelope: &RequestEnvelope) -> Result<Value, TransportError>;
}

/// [`Transport`] over `reqwest` against a fixed base origin.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    user_agent: Option<HeaderValue>,
}

impl HttpTransport {
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let http = builder.build().map_err(ConfigError::HttpClient)?;

        let user_agent = config
            .user_agent
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|e| ConfigError::Invalid(format!("user_agent: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, envelope: &RequestEnvelope) -> Result<Value, TransportError> {
        let url = self.url(&envelope.path);
        debug!(method = %envelope.method, %url, authenticated = envelope.is_authenticated(), "Sending request");

        let mut req = self
            .http
            .request(envelope.method.clone(), &url)
            .headers(envelope.headers.clone());
        if let Some(ua) = &self.user_agent {
            req = req.header(USER_AGENT, ua.clone());
        }
        if !envelope.query.is_empty() {
            req = req.query(&envelope.query);
        }
        if let Some(body) = &envelope.body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| TransportError::Network {
            url: url.clone(),
            message: e.to_string(),
            timed_out: e.is_timeout(),
        })?;

        let status = resp.status();
        let raw = resp.text().await.map_err(|e| TransportError::Network {
            url: url.clone(),
            message: e.to_string(),
            timed_out: e.is_timeout(),
        })?;
        debug!(%url, status = status.as_u16(), "Received response");

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: serde_json::from_str(&raw).ok(),
                raw,
            });
        }

        if raw.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&raw).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
