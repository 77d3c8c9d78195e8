//! HTTP request core
//!
//! Builds authenticated requests against the JAAQ API:
//! - joins the base URL and request path
//! - injects the API key and client id headers
//! - serializes JSON bodies
//! - normalizes non-2xx responses into [`Error::Http`]
//! - enforces an optional request deadline
//!
//! The network call itself goes through the [`Transport`] trait so that
//! environments without the default reqwest transport can inject their own.

use crate::{Error, Result};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default header carrying the API key
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the consuming client's identifier
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Typed "no body" argument for [`HttpClient::request`] and friends
pub const NO_BODY: Option<&()> = None;

/// HTTP methods used by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list with case-insensitive keys
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing entry with the same name
    /// (compared case-insensitively).
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(entry) => *entry = (name, value),
            None => self.0.push((name, value)),
        }
    }

    /// Builder-style [`Headers::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Overlay `other` on top of these headers
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in other.iter() {
            self.insert(name, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// A fully resolved request handed to a [`Transport`]
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    /// Serialized JSON body; `None` means no body is sent at all
    pub body: Option<String>,
}

/// Raw response returned by a [`Transport`]
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: String::new(),
            body: body.into(),
        }
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request-performing primitive
///
/// Transport errors are returned as-is to the caller. Implementations should
/// read the body of non-2xx responses leniently (an unreadable body becomes
/// an empty string).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a plain async function or closure
pub struct FnTransport<F>(F);

/// Wrap an async function as a [`Transport`]
pub fn transport_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse>> + Send,
{
    FnTransport(f)
}

#[async_trait]
impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(HttpRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse>> + Send,
{
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        (self.0)(request).await
    }
}

/// Default transport using a shared `reqwest::Client`
#[cfg(feature = "reqwest-transport")]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

#[cfg(feature = "reqwest-transport")]
impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("jaaq-sdk-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[cfg(feature = "reqwest-transport")]
#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();

        let body = if status.is_success() {
            response.text().await?
        } else {
            response.text().await.unwrap_or_default()
        };

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

#[cfg(feature = "reqwest-transport")]
fn default_transport() -> Result<Arc<dyn Transport>> {
    Ok(Arc::new(ReqwestTransport::new()?))
}

#[cfg(not(feature = "reqwest-transport"))]
fn default_transport() -> Result<Arc<dyn Transport>> {
    Err(Error::NoTransport)
}

/// Settings for a single [`HttpClient`]
#[derive(Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub client_id: String,
    pub api_key_header_name: String,
    /// Static headers merged over the defaults, before per-call headers
    pub headers: Headers,
    pub timeout: Option<Duration>,
    /// Injected transport; the default reqwest transport is used when `None`
    pub transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("api_key_header_name", &self.api_key_header_name)
            .field("timeout", &self.timeout)
            .field("custom_transport", &self.transport.is_some())
            .finish_non_exhaustive()
    }
}

/// Authenticated JSON client bound to one base URL
pub struct HttpClient {
    base_url: String,
    default_headers: Headers,
    timeout: Option<Duration>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a client. Fails when the base URL is invalid or when no
    /// transport is available.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Url::parse(&config.base_url)?;

        let transport = match config.transport {
            Some(transport) => transport,
            None => default_transport()?,
        };

        let mut default_headers = Headers::new()
            .with("Content-Type", "application/json")
            .with(config.api_key_header_name, config.api_key)
            .with(CLIENT_ID_HEADER, config.client_id);
        default_headers.merge(&config.headers);

        Ok(Self {
            base_url: config.base_url,
            default_headers,
            timeout: config.timeout,
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Resolve a request path against the base URL
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Perform a request and decode the JSON response.
    ///
    /// A 204 response is decoded from JSON `null` without touching the body,
    /// so `()`, `Option<_>` and `serde_json::Value` callers get an empty
    /// result while concrete records fail with [`Error::Decode`].
    #[instrument(skip(self, body, headers))]
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: Option<&Headers>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut merged = self.default_headers.clone();
        if let Some(headers) = headers {
            merged.merge(headers);
        }

        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(Error::Encode)?;

        let request = HttpRequest {
            method,
            url: self.url(path),
            headers: merged,
            body,
        };

        debug!(url = %request.url, has_body = request.body.is_some(), "Sending request");

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.transport.send(request))
                .await
                .map_err(|_| Error::Timeout {
                    ms: limit.as_millis() as u64,
                })??,
            None => self.transport.send(request).await?,
        };

        parse_response(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::Get, path, NO_BODY, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::Post, path, body, None).await
    }

    pub async fn put<T, B>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::Put, path, body, None).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::Patch, path, body, None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::Delete, path, NO_BODY, None).await
    }
}

/// Normalize a raw response into a decoded value or an error
pub(crate) fn parse_response<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    if !response.is_success() {
        warn!(status = response.status, "Request failed");
        return Err(Error::http(
            response.status,
            &response.body,
            &response.status_text,
        ));
    }

    if response.status == 204 {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }

    if response.body.trim().is_empty() {
        return Err(Error::EmptyBody {
            status: response.status,
        });
    }

    Ok(serde_json::from_str(&response.body)?)
}

/// True when `path` starts with a URI scheme such as `https://`
pub fn has_scheme(path: &str) -> bool {
    let Some((scheme, _)) = path.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Join a base URL and a path with exactly one separating slash.
///
/// Paths that already carry a scheme are returned verbatim.
pub fn join_url(base: &str, path: &str) -> String {
    if has_scheme(path) {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
