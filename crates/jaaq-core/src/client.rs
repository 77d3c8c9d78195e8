//! Client facade and SDK configuration

use crate::{
    http::{Headers, HttpClient, HttpClientConfig, Transport, DEFAULT_API_KEY_HEADER},
    resources::{Collections, Videos},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.jaaq.app/v1";

/// Environment variable overriding the default base URL
pub const BASE_URL_ENV: &str = "JAAQ_API_URL";

/// The base URL used when none is configured: `JAAQ_API_URL` if set,
/// otherwise [`DEFAULT_BASE_URL`].
pub fn default_base_url() -> String {
    std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// SDK configuration
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SdkConfig {
    /// API base URL (defaults to [`default_base_url`])
    pub base_url: Option<String>,
    /// API key issued per client
    pub api_key: String,
    /// Identifier of the consuming company
    pub client_id: String,
    /// Header carrying the API key (defaults to `x-api-key`)
    pub api_key_header_name: Option<String>,
    /// Static headers merged into every request
    pub headers: BTreeMap<String, String>,
    /// Per-request deadline in milliseconds
    pub timeout_ms: Option<u64>,
    #[serde(skip)]
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("client_id", &self.client_id)
            .field("api_key_header_name", &self.api_key_header_name)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("timeout_ms", &self.timeout_ms)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl SdkConfig {
    pub fn new(api_key: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client_id: client_id.into(),
            ..Default::default()
        }
    }

    /// Read configuration from `JAAQ_API_KEY`, `JAAQ_CLIENT_ID`,
    /// `JAAQ_API_URL`, `JAAQ_API_KEY_HEADER` and `JAAQ_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        let api_key = var("JAAQ_API_KEY")
            .ok_or_else(|| Error::InvalidConfig("JAAQ_API_KEY is not set".into()))?;
        let client_id = var("JAAQ_CLIENT_ID")
            .ok_or_else(|| Error::InvalidConfig("JAAQ_CLIENT_ID is not set".into()))?;

        let timeout_ms = match var("JAAQ_TIMEOUT_MS") {
            Some(raw) => Some(raw.parse().map_err(|_| {
                Error::InvalidConfig(format!("JAAQ_TIMEOUT_MS is not a number: {raw}"))
            })?),
            None => None,
        };

        Ok(Self {
            base_url: var(BASE_URL_ENV),
            api_key_header_name: var("JAAQ_API_KEY_HEADER"),
            timeout_ms,
            ..Self::new(api_key, client_id)
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key_header(mut self, name: impl Into<String>) -> Self {
        self.api_key_header_name = Some(name.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Inject the request-performing function for custom environments
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Check required credentials
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("apiKey is required".into()));
        }
        if self.client_id.trim().is_empty() {
            return Err(Error::InvalidConfig("clientId is required".into()));
        }
        if self.timeout_ms == Some(0) {
            return Err(Error::InvalidConfig("timeoutMs must be greater than zero".into()));
        }
        Ok(())
    }

    fn into_http_config(self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.base_url.unwrap_or_else(default_base_url),
            api_key: self.api_key,
            client_id: self.client_id,
            api_key_header_name: self
                .api_key_header_name
                .unwrap_or_else(|| DEFAULT_API_KEY_HEADER.to_string()),
            headers: self.headers.into_iter().collect::<Headers>(),
            timeout: self.timeout_ms.map(Duration::from_millis),
            transport: self.transport,
        }
    }
}

/// Entry point to the JAAQ API
#[derive(Debug, Clone)]
pub struct JaaqClient {
    pub videos: Videos,
    pub collections: Collections,
    http: Arc<HttpClient>,
}

impl JaaqClient {
    /// Static initializer; same result as [`create_client`]
    pub fn init(config: SdkConfig) -> Result<Self> {
        build_client(config)
    }

    /// Bind resource accessors to an existing HTTP client
    pub fn from_http(http: Arc<HttpClient>) -> Self {
        Self {
            videos: Videos::new(Arc::clone(&http)),
            collections: Collections::new(Arc::clone(&http)),
            http,
        }
    }

    /// The underlying HTTP client, for endpoints without a typed accessor
    pub fn http(&self) -> &Arc<HttpClient> {
        &self.http
    }
}

/// Factory function; same result as [`JaaqClient::init`]
pub fn create_client(config: SdkConfig) -> Result<JaaqClient> {
    build_client(config)
}

fn build_client(config: SdkConfig) -> Result<JaaqClient> {
    config.validate()?;
    let http = HttpClient::new(config.into_http_config())?;
    info!(base_url = http.base_url(), "JAAQ client initialized");
    Ok(JaaqClient::from_http(Arc::new(http)))
}
