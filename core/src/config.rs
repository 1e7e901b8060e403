//! Client configuration.
//!
//! Data fields deserialize with serde so a client can be described in a
//! config file; the header-change observer is code-only and is attached with
//! `with_on_set_authentication_header`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ConfigurationError;

/// Observer invoked after the authentication header is set (`Some`) or
/// cleared (`None`).
pub type OnSetAuthenticationHeader = Arc<dyn Fn(Option<&str>) + Send + Sync>;

/// Accept header sent unless `default_headers` overrides it.
pub const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";

/// How to send an HTTP method outside the standard set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
#[non_exhaustive]
pub enum CustomMethodImplementation {
    /// `verb path` becomes `POST path:verb`.
    AppendWithColonThenPost,
}

impl FromStr for CustomMethodImplementation {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AppendWithColonThenPost" => Ok(CustomMethodImplementation::AppendWithColonThenPost),
            other => Err(ConfigurationError::UnimplementedCustomMethodImplementation(
                other.to_string(),
            )),
        }
    }
}

impl TryFrom<String> for CustomMethodImplementation {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WebClientConfig {
    /// Must end in `/`.
    pub base_url: Option<String>,
    pub custom_method_implementation: Option<CustomMethodImplementation>,
    /// Raw `<Scheme> <value>` header installed at construction.
    pub initial_authentication_header: Option<String>,
    /// Sent on every request; later entries win.
    pub default_headers: Vec<(String, String)>,
    #[serde(skip)]
    pub on_set_authentication_header: Option<OnSetAuthenticationHeader>,
}

impl WebClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_custom_method_implementation(
        mut self,
        implementation: CustomMethodImplementation,
    ) -> Self {
        self.custom_method_implementation = Some(implementation);
        self
    }

    pub fn with_initial_authentication_header(mut self, header: impl Into<String>) -> Self {
        self.initial_authentication_header = Some(header.into());
        self
    }

    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn with_on_set_authentication_header<F>(mut self, callback: F) -> Self
    where
        F: Fn(Option<&str>) + Send + Sync + 'static,
    {
        self.on_set_authentication_header = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for WebClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebClientConfig")
            .field("base_url", &self.base_url)
            .field("custom_method_implementation", &self.custom_method_implementation)
            .field(
                "initial_authentication_header",
                &self.initial_authentication_header.as_ref().map(|_| "<redacted>"),
            )
            .field("default_headers", &self.default_headers)
            .field(
                "on_set_authentication_header",
                &self.on_set_authentication_header.is_some(),
            )
            .finish()
    }
}
