//! Verb helpers and authentication management over a pluggable transport.
//!
//! # Design
//! `WebClient` owns one transport, an immutable configuration and a single
//! lockable authentication slot. `request` turns a verb, path and body into
//! a `TransportRequest`: custom verbs are rewritten, headers are merged with
//! per-request overrides winning, POSTed blobs become multipart forms with
//! the `"file"` field last. Forms reach the transport unencoded. The response payload is returned on 2xx; other
//! statuses become a JSON diagnostic after the caller's `on_http_error` runs.
//!
//! Each request reads the authentication slot once, when its headers are
//! assembled. Concurrent header changes are seen by requests assembled after
//! them, never partially.

use std::sync::{PoisonError, RwLock};

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;

use crate::auth::AuthenticationHeader;
use crate::config::{CustomMethodImplementation, WebClientConfig, DEFAULT_ACCEPT};
use crate::error::{
    ConfigurationError, HttpErrorDetails, HttpErrorDiagnostic, UsageError, WebClientError,
};
use crate::form::{FormData, FILE_FIELD};
use crate::http::{resolve_url, HttpMethod, Transport, TransportBody, TransportRequest};
use crate::types::{RequestArgs, RequestBody};

#[cfg(feature = "reqwest-client")]
use crate::backends::ReqwestTransport;

/// HTTP client façade with verb helpers and a managed `Authorization` header.
pub struct WebClient<T> {
    transport: T,
    config: WebClientConfig,
    default_headers: HeaderMap,
    authentication: RwLock<Option<AuthenticationHeader>>,
}

#[cfg(feature = "reqwest-client")]
impl WebClient<ReqwestTransport> {
    /// Build a client on a fresh reqwest transport.
    pub fn new(config: WebClientConfig) -> Result<Self, WebClientError> {
        Self::with_transport(config, ReqwestTransport::default())
    }
}

impl<T: Transport> WebClient<T> {
    /// Validate `config` and wrap `transport`.
    ///
    /// Fails when the base URL does not end in `/`, when the initial
    /// authentication header is malformed, or when a default header cannot
    /// be put on the wire. Empty strings for either are treated as unset.
    pub fn with_transport(mut config: WebClientConfig, transport: T) -> Result<Self, WebClientError> {
        // An empty string means "not provided".
        config.base_url = config.base_url.take().filter(|url| !url.is_empty());
        config.initial_authentication_header = config
            .initial_authentication_header
            .take()
            .filter(|header| !header.is_empty());

        if let Some(base_url) = config.base_url.as_deref() {
            if !base_url.ends_with('/') {
                return Err(
                    ConfigurationError::BaseUrlMissingTrailingSlash(base_url.to_string()).into(),
                );
            }
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        for (name, value) in &config.default_headers {
            let (name, value) = parse_header(name, value)?;
            default_headers.insert(name, value);
        }

        let initial = config
            .initial_authentication_header
            .as_deref()
            .map(AuthenticationHeader::parse)
            .transpose()?;

        let client = Self {
            transport,
            config,
            default_headers,
            authentication: RwLock::new(None),
        };
        if let Some(header) = initial {
            client.install_authentication_header(header);
        }
        Ok(client)
    }

    pub fn config(&self) -> &WebClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `method` with `args` and return the decoded response payload.
    ///
    /// Empty bodies decode to `null`, JSON to its value, anything else to a
    /// JSON string.
    pub async fn request(
        &self,
        method: &str,
        args: impl Into<RequestArgs>,
    ) -> Result<serde_json::Value, WebClientError> {
        let RequestArgs {
            mut path_on_host,
            body,
            add_headers,
            add_form_data_entries,
            on_http_error,
        } = args.into();

        if path_on_host.ends_with('/') {
            path_on_host.pop();
        }

        let verb = match HttpMethod::parse_standard(method) {
            Some(verb) => verb,
            None => match self.config.custom_method_implementation {
                Some(CustomMethodImplementation::AppendWithColonThenPost) => {
                    path_on_host.push(':');
                    path_on_host.push_str(method);
                    HttpMethod::Post
                }
                None => {
                    return Err(ConfigurationError::MissingCustomMethodImplementation {
                        method: method.to_string(),
                    }
                    .into())
                }
            },
        };

        let mut headers = self.default_headers.clone();
        if let Some(header) = self.read_authentication().as_ref() {
            let value = HeaderValue::from_str(&header.to_string()).map_err(|e| {
                WebClientError::InvalidHeader {
                    name: AUTHORIZATION.to_string(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        for (name, value) in &add_headers {
            let (name, value) = parse_header(name, value)?;
            headers.insert(name, value);
        }

        let body = match body {
            Some(RequestBody::Blob(blob)) if verb == HttpMethod::Post => {
                let mut form = FormData::new();
                form.append(FILE_FIELD, blob);
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("multipart/form-data"));
                Some(RequestBody::Form(form))
            }
            body => body,
        };

        let payload = match body {
            Some(RequestBody::Form(mut form)) => {
                for (name, value) in add_form_data_entries {
                    form.append(name, value);
                }
                form.check_part_headers()?;
                form.move_file_field_last()?;
                set_default_content_type(&mut headers, "multipart/form-data");
                Some(TransportBody::Multipart(form))
            }
            _ if !add_form_data_entries.is_empty() => {
                return Err(UsageError::FormEntriesWithoutForm.into());
            }
            Some(RequestBody::Json(value)) => {
                set_default_content_type(&mut headers, "application/json");
                Some(TransportBody::Bytes(Bytes::from(value.to_string())))
            }
            Some(RequestBody::Text(text)) => {
                set_default_content_type(&mut headers, "text/plain; charset=utf-8");
                Some(TransportBody::Bytes(Bytes::from(text)))
            }
            Some(RequestBody::Blob(blob)) => {
                if let Some(value) = blob.content_type()? {
                    headers.entry(CONTENT_TYPE).or_insert(value);
                }
                Some(TransportBody::Bytes(blob.data))
            }
            None => None,
        };

        let url = resolve_url(self.config.base_url.as_deref(), &path_on_host);
        tracing::debug!(target: "web_client", method = verb.as_str(), url = %url, "sending request");

        let response = self
            .transport
            .send(TransportRequest {
                method: verb.into(),
                url,
                headers,
                body: payload,
            })
            .await?;

        tracing::debug!(target: "web_client", status = response.status.as_u16(), "response received");

        if response.status.is_success() {
            return Ok(decode_payload(&response.body));
        }

        let details = HttpErrorDetails {
            status_code: response.status.as_u16(),
            status_text: response.status_text().to_string(),
            response_body: decode_payload(&response.body),
        };
        let path = format!(
            "{}{}",
            self.config.base_url.as_deref().unwrap_or(""),
            path_on_host
        );
        tracing::warn!(
            target: "web_client",
            method = verb.as_str(),
            path = %path,
            status = details.status_code,
            "request failed"
        );
        if let Some(on_http_error) = on_http_error {
            on_http_error(&details);
        }
        Err(WebClientError::Http(Box::new(HttpErrorDiagnostic {
            path,
            method: verb.as_str().to_string(),
            status_code: details.status_code,
            status_text: details.status_text,
            response_body: details.response_body,
        })))
    }

    /// Like `request`, then deserialize the payload into `R`.
    pub async fn request_json<R: DeserializeOwned>(
        &self,
        method: &str,
        args: impl Into<RequestArgs>,
    ) -> Result<R, WebClientError> {
        let value = self.request(method, args).await?;
        serde_json::from_value(value).map_err(WebClientError::Decode)
    }

    pub async fn get(&self, args: impl Into<RequestArgs>) -> Result<serde_json::Value, WebClientError> {
        self.request("get", args).await
    }

    pub async fn post(&self, args: impl Into<RequestArgs>) -> Result<serde_json::Value, WebClientError> {
        self.request("post", args).await
    }

    pub async fn patch(&self, args: impl Into<RequestArgs>) -> Result<serde_json::Value, WebClientError> {
        self.request("patch", args).await
    }

    pub async fn put(&self, args: impl Into<RequestArgs>) -> Result<serde_json::Value, WebClientError> {
        self.request("put", args).await
    }

    pub async fn delete(&self, args: impl Into<RequestArgs>) -> Result<serde_json::Value, WebClientError> {
        self.request("delete", args).await
    }

    pub async fn head(&self, args: impl Into<RequestArgs>) -> Result<serde_json::Value, WebClientError> {
        self.request("head", args).await
    }

    pub async fn options(&self, args: impl Into<RequestArgs>) -> Result<serde_json::Value, WebClientError> {
        self.request("options", args).await
    }
}

impl<T> WebClient<T> {
    /// Install `Bearer <token>`.
    pub fn set_bearer_token(&self, token: &str) -> Result<(), ConfigurationError> {
        let header = AuthenticationHeader::bearer(token)?;
        self.install_authentication_header(header);
        Ok(())
    }

    /// The token of the current Bearer header.
    ///
    /// `Ok(None)` when no header is set; an error when the header uses
    /// another scheme.
    pub fn maybe_get_bearer_token(&self) -> Result<Option<String>, UsageError> {
        let slot = self.read_authentication();
        let Some(header) = slot.as_ref() else {
            return Ok(None);
        };
        match header.bearer_token() {
            Some(token) => Ok(Some(token.to_string())),
            None => Err(UsageError::NotBearerScheme {
                scheme: header.scheme().to_string(),
            }),
        }
    }

    /// Install a Basic header from `username:password`.
    pub fn set_basic_credentials_string(&self, credentials: &str) -> Result<(), ConfigurationError> {
        let header = AuthenticationHeader::from_basic_credentials(credentials)?;
        self.install_authentication_header(header);
        Ok(())
    }

    /// Install a raw `<Scheme> <value>` header and notify the observer.
    pub fn set_authentication_header(&self, header: &str) -> Result<(), ConfigurationError> {
        let header = AuthenticationHeader::parse(header)?;
        self.install_authentication_header(header);
        Ok(())
    }

    /// Remove the header and notify the observer with `None`.
    pub fn clear_authentication_credentials(&self) {
        *self
            .authentication
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        tracing::debug!(target: "web_client", "authentication header cleared");
        if let Some(callback) = &self.config.on_set_authentication_header {
            callback(None);
        }
    }

    pub fn has_authentication_credentials(&self) -> bool {
        self.read_authentication().is_some()
    }

    /// Current header in wire form.
    pub fn authentication_header(&self) -> Option<String> {
        self.read_authentication().as_ref().map(ToString::to_string)
    }

    fn install_authentication_header(&self, header: AuthenticationHeader) {
        let raw = header.to_string();
        tracing::debug!(target: "web_client", scheme = header.scheme(), "authentication header set");
        *self
            .authentication
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(header);
        if let Some(callback) = &self.config.on_set_authentication_header {
            callback(Some(&raw));
        }
    }

    fn read_authentication(&self) -> std::sync::RwLockReadGuard<'_, Option<AuthenticationHeader>> {
        self.authentication
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn parse_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), WebClientError> {
    let invalid = |reason: String| WebClientError::InvalidHeader {
        name: name.to_string(),
        reason,
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}

fn set_default_content_type(headers: &mut HeaderMap, content_type: &'static str) {
    headers
        .entry(CONTENT_TYPE)
        .or_insert(HeaderValue::from_static(content_type));
}

fn decode_payload(body: &[u8]) -> serde_json::Value {
    if body.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(body).into_owned()))
}
