//! Gateway configuration.
//!
//! Values come from an optional TOML file followed by environment overrides
//! with the `LEARNHUB` prefix and `__` separator, e.g.
//! `LEARNHUB__BASE_URL=https://lms.example.com`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::session::CredentialScheme;

pub const DEFAULT_CONFIG_FILE: &str = "learnhub.toml";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend origin every resource path is resolved against.
    pub base_url: String,
    /// Whole-request timeout. No timeout when unset.
    pub request_timeout_ms: Option<u64>,
    /// Scheme used for credentials obtained by the login operations.
    pub auth_scheme: String,
    pub user_agent: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: None,
            auth_scheme: "Bearer".to_string(),
            user_agent: Some(concat!("learnhub-gateway/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_request_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = Some(ms);
        self
    }

    pub fn credential_scheme(&self) -> Result<CredentialScheme, ConfigError> {
        self.auth_scheme.parse().map_err(ConfigError::Invalid)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be greater than zero".into(),
            ));
        }
        self.credential_scheme()?;
        Ok(())
    }

    /// Loads configuration from `path` (or `learnhub.toml` in the working
    /// directory when `None`) and the environment, then validates it.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        builder = builder.add_source(
            Environment::with_prefix("LEARNHUB")
                .try_parsing(true)
                .separator("__"),
        );

        let cfg: GatewayConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }
}
