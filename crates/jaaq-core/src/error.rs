//! Error types for JAAQ Core

use crate::types::ApiError;
use thiserror::Error;

/// Result type alias for SDK and player operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error produced by an injected transport
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// SDK error types
#[derive(Error, Debug)]
pub enum Error {
    // Transport errors
    #[cfg(feature = "reqwest-transport")]
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    #[error(transparent)]
    Transport(BoxError),

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    // Response errors
    #[error("HTTP {status}: {body}")]
    Http {
        status: u16,
        body: String,
        api_error: Option<ApiError>,
    },

    #[error("Empty response body (HTTP {status})")]
    EmptyBody { status: u16 },

    #[error("Failed to parse response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Failed to serialize request body: {0}")]
    Encode(serde_json::Error),

    // Configuration errors
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "No HTTP transport found. Provide one with SdkConfig::with_transport for custom environments."
    )]
    NoTransport,

    // Playback errors
    #[error("Failed to parse manifest: {0}")]
    ManifestParse(String),

    #[error("{0}")]
    UnsupportedFormat(String),

    #[error("HLS Error: {kind} - {details}")]
    Stream { kind: String, details: String },

    #[error("Media error: {0}")]
    Media(String),

    #[error("Invalid playback state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Player has been destroyed")]
    PlayerDestroyed,
}

impl Error {
    /// Wrap an error raised by a custom transport
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(err.into())
    }

    /// Build an HTTP status error from a raw response body.
    ///
    /// The message uses the body when it is non-empty and the status text
    /// otherwise.
    pub fn http(status: u16, body: &str, status_text: &str) -> Self {
        let api_error = serde_json::from_str::<ApiError>(body).ok();
        let body = if body.is_empty() { status_text } else { body };
        Error::Http {
            status,
            body: body.to_string(),
            api_error,
        }
    }

    /// HTTP status code, if this error came from a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } | Error::EmptyBody { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if retrying the same operation may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Timeout { .. } | Error::Stream { .. } => true,
            #[cfg(feature = "reqwest-transport")]
            Error::Network(_) => true,
            Error::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns the error code for logging and analytics
    pub fn error_code(&self) -> &'static str {
        match self {
            #[cfg(feature = "reqwest-transport")]
            Error::Network(_) => "NETWORK",
            Error::Transport(_) => "TRANSPORT",
            Error::Timeout { .. } => "TIMEOUT",
            Error::Http { .. } => "HTTP_STATUS",
            Error::EmptyBody { .. } => "EMPTY_BODY",
            Error::Decode(_) => "DECODE",
            Error::Encode(_) => "ENCODE",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::NoTransport => "NO_TRANSPORT",
            Error::ManifestParse(_) => "MANIFEST_PARSE",
            Error::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Error::Stream { .. } => "STREAM",
            Error::Media(_) => "MEDIA",
            Error::InvalidStateTransition { .. } => "INVALID_STATE",
            Error::PlayerDestroyed => "DESTROYED",
        }
    }
}
