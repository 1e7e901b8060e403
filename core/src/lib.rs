//! Thin async HTTP client façade.
//!
//! # Overview
//! `WebClient` wraps an existing HTTP client (any `Transport`, reqwest by
//! default) and adds verb helpers, a managed `Authorization` header with a
//! change observer, custom-verb rewriting, and blob-to-multipart upload
//! handling with the `"file"` field kept last.
//!
//! # Design
//! - `request` is the single dispatch path; `get`, `post` and the other verb
//!   helpers only fix the method.
//! - Successful calls return the decoded payload only. Non-2xx responses
//!   become `WebClientError::Http` with a JSON diagnostic; failures with no
//!   response are passed through untouched as `WebClientError::Transport`.
//! - Configuration mistakes fail before any network call.
//! - No retries, caching, timeouts or pooling are added here; those belong
//!   to the wrapped transport.

pub mod auth;
pub mod backends;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod types;

pub use auth::AuthenticationHeader;
#[cfg(feature = "reqwest-client")]
pub use backends::ReqwestTransport;
pub use client::WebClient;
pub use config::{CustomMethodImplementation, OnSetAuthenticationHeader, WebClientConfig};
pub use error::{
    ConfigurationError, HttpErrorDetails, HttpErrorDiagnostic, TransportError, UsageError,
    WebClientError,
};
pub use form::{Blob, FormData, FormValue};
pub use crate::http::{HttpMethod, Transport, TransportBody, TransportRequest, TransportResponse};
pub use types::{OnHttpError, RequestArgs, RequestBody};
