//! Error types for the web client.
//!
//! # Design
//! Configuration and usage mistakes are detected before any network call and
//! get their own enums so callers can match on them. A completed exchange
//! with a non-2xx status becomes `Http` carrying a JSON diagnostic. Failures
//! where no response was received are passed through as `Transport`, which
//! is transparent over the backend's original error.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

/// Errors returned by `WebClient` operations.
#[derive(Debug, thiserror::Error)]
pub enum WebClientError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Usage(#[from] UsageError),

    /// The server answered with a non-success status.
    #[error("{0}")]
    Http(Box<HttpErrorDiagnostic>),

    /// No response was received. Displays and sources exactly as the
    /// backend's error.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A header name or value could not be put on the wire.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// The response payload could not be deserialized into the requested type.
    #[error("response body could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
}

impl WebClientError {
    /// The diagnostic for a structured HTTP failure, if this is one.
    pub fn http_diagnostic(&self) -> Option<&HttpErrorDiagnostic> {
        match self {
            WebClientError::Http(diagnostic) => Some(diagnostic),
            _ => None,
        }
    }
}

/// Mistakes in how the client was configured or what it was asked to send.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("expected base url to end in \"/\": {0}")]
    BaseUrlMissingTrailingSlash(String),

    #[error("expected an authentication header of the form \"<Scheme> <value>\"")]
    MalformedAuthenticationHeader,

    #[error("expected basic credentials of the form \"username:password\"")]
    MalformedBasicCredentials,

    #[error(
        "encountered custom http method {method:?}, but no custom method implementation was configured"
    )]
    MissingCustomMethodImplementation { method: String },

    #[error("custom method implementation not yet implemented: {0}")]
    UnimplementedCustomMethodImplementation(String),
}

/// Calls that are valid Rust but wrong for the current client state or body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("expected authorization header to use the Bearer scheme, found {scheme:?}")]
    NotBearerScheme { scheme: String },

    #[error("form data entries were given but the request body is not a form")]
    FormEntriesWithoutForm,

    #[error("expected at most one \"file\" field in the form, found {count}")]
    MultipleFileFields { count: usize },
}

/// A failure below HTTP: DNS, refused connection, timeout, broken body.
///
/// Wraps the backend's error without altering it.
pub struct TransportError(Box<dyn StdError + Send + Sync>);

impl TransportError {
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        TransportError(error.into())
    }

    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }

    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.0
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.0.source()
    }
}

/// What the per-request `on_http_error` callback receives.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpErrorDetails {
    pub status_code: u16,
    pub status_text: String,
    pub response_body: serde_json::Value,
}

/// Diagnostic raised in place of a structured HTTP failure.
///
/// Displays as a prefix line followed by the pretty-printed JSON object
/// `{path, method, statusCode, statusText, responseBody}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpErrorDiagnostic {
    /// Configured base URL followed by the path that was sent, including
    /// any `:verb` suffix.
    pub path: String,
    /// The verb actually dispatched, in uppercase as it appears on the wire:
    /// `"GET"`, or `"POST"` for a rewritten custom verb. Never the caller's
    /// spelling.
    pub method: String,
    pub status_code: u16,
    pub status_text: String,
    pub response_body: serde_json::Value,
}

impl HttpErrorDiagnostic {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

impl fmt::Display for HttpErrorDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WebClient: HTTP error:\n{}", self.to_json())
    }
}
