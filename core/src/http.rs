//! HTTP transport types and the seam to the wrapped client.
//!
//! # Design
//! `WebClient` never talks to the network itself. It assembles a
//! `TransportRequest` and hands it to a `Transport`, which performs the
//! round-trip and returns a `TransportResponse` for every completed exchange,
//! whatever its status. Only failures with no response come back as `Err`.
//! This keeps status interpretation in the client and lets tests substitute
//! an in-memory transport.

use std::future::Future;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

use crate::error::TransportError;
use crate::form::FormData;

/// Standard HTTP verbs. Anything else is a custom method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

impl HttpMethod {
    /// Case-insensitive lookup. Returns `None` for custom methods.
    pub fn parse_standard(method: &str) -> Option<Self> {
        let method = match method.to_ascii_lowercase().as_str() {
            "get" => HttpMethod::Get,
            "head" => HttpMethod::Head,
            "post" => HttpMethod::Post,
            "put" => HttpMethod::Put,
            "delete" => HttpMethod::Delete,
            "connect" => HttpMethod::Connect,
            "options" => HttpMethod::Options,
            "trace" => HttpMethod::Trace,
            "patch" => HttpMethod::Patch,
            _ => return None,
        };
        Some(method)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Connect => Method::CONNECT,
            HttpMethod::Options => Method::OPTIONS,
            HttpMethod::Trace => Method::TRACE,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

/// A fully assembled request, ready for the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<TransportBody>,
}

/// Request payload as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportBody {
    Bytes(Bytes),
    /// Fields in wire order. The transport encodes the form and owns the
    /// `Content-Type` header, since only it knows the boundary.
    Multipart(FormData),
}

impl TransportBody {
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            TransportBody::Bytes(bytes) => Some(bytes),
            TransportBody::Multipart(_) => None,
        }
    }

    pub fn as_form(&self) -> Option<&FormData> {
        match self {
            TransportBody::Multipart(form) => Some(form),
            TransportBody::Bytes(_) => None,
        }
    }
}

/// A completed exchange, successful or not.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    /// Reason phrase for the status, empty when the code has none.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }
}

/// The wrapped HTTP client.
pub trait Transport: Send + Sync {
    /// Send a request. Non-2xx statuses are `Ok`; `Err` means no response.
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// Join a base URL and a path the way the wrapped client does.
///
/// Absolute URLs in `path` win over the base. Otherwise the two are joined
/// with exactly one `/` between them. An empty base never reaches here: the
/// client treats it as absent.
pub(crate) fn resolve_url(base_url: Option<&str>, path: &str) -> String {
    match base_url {
        Some(base) if !is_absolute_url(path) => {
            if path.is_empty() {
                return base.to_string();
            }
            format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        }
        _ => path.to_string(),
    }
}

/// `scheme://` or protocol-relative `//`.
fn is_absolute_url(path: &str) -> bool {
    if path.starts_with("//") {
        return true;
    }
    let Some((scheme, rest)) = path.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let starts_alpha = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_alpha
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        && rest.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_methods_are_case_insensitive() {
        assert_eq!(HttpMethod::parse_standard("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse_standard("PoSt"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse_standard("PATCH"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse_standard("trace"), Some(HttpMethod::Trace));
    }

    #[test]
    fn unknown_methods_are_custom() {
        assert_eq!(HttpMethod::parse_standard("FOO"), None);
        assert_eq!(HttpMethod::parse_standard("batchGet"), None);
        assert_eq!(HttpMethod::parse_standard(""), None);
    }

    #[test]
    fn converts_to_http_method() {
        assert_eq!(Method::from(HttpMethod::Options), Method::OPTIONS);
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn joins_base_and_path_with_one_slash() {
        let base = Some("http://localhost:3000/api/");
        assert_eq!(resolve_url(base, "items"), "http://localhost:3000/api/items");
        assert_eq!(resolve_url(base, "/items"), "http://localhost:3000/api/items");
        assert_eq!(resolve_url(base, ""), "http://localhost:3000/api/");
    }

    #[test]
    fn absolute_paths_ignore_base() {
        let base = Some("http://localhost:3000/");
        assert_eq!(
            resolve_url(base, "https://uploads.example.com/bucket"),
            "https://uploads.example.com/bucket"
        );
        assert_eq!(resolve_url(base, "//cdn.example.com/x"), "//cdn.example.com/x");
        assert_eq!(resolve_url(base, "items:archive"), "http://localhost:3000/items:archive");
    }

    #[test]
    fn no_base_uses_path_verbatim() {
        assert_eq!(resolve_url(None, "http://h/x"), "http://h/x");
        assert_eq!(resolve_url(None, "relative"), "relative");
    }

    #[test]
    fn status_text_uses_canonical_reason() {
        let response = TransportResponse {
            status: StatusCode::NOT_FOUND,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        };
        assert_eq!(response.status_text(), "Not Found");
    }
}
