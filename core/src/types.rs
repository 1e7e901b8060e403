//! Per-request inputs.

use std::fmt;

use crate::error::HttpErrorDetails;
use crate::form::{Blob, FormData, FormValue};

/// Called with the failure details before a structured HTTP error is returned.
pub type OnHttpError = Box<dyn FnOnce(&HttpErrorDetails) + Send>;

/// What a request carries.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON.
    Json(serde_json::Value),
    Text(String),
    /// Raw bytes; becomes a `"file"` form field when POSTed.
    Blob(Blob),
    Form(FormData),
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(value: String) -> Self {
        RequestBody::Text(value)
    }
}

impl From<&str> for RequestBody {
    fn from(value: &str) -> Self {
        RequestBody::Text(value.to_string())
    }
}

impl From<Blob> for RequestBody {
    fn from(value: Blob) -> Self {
        RequestBody::Blob(value)
    }
}

impl From<FormData> for RequestBody {
    fn from(value: FormData) -> Self {
        RequestBody::Form(value)
    }
}

/// Everything about a request except its method.
#[derive(Default)]
pub struct RequestArgs {
    pub path_on_host: String,
    pub body: Option<RequestBody>,
    /// Merged over the client's default headers; these win.
    pub add_headers: Vec<(String, String)>,
    /// Appended to a form body.
    pub add_form_data_entries: Vec<(String, FormValue)>,
    pub on_http_error: Option<OnHttpError>,
}

impl RequestArgs {
    pub fn new(path_on_host: impl Into<String>) -> Self {
        Self {
            path_on_host: path_on_host.into(),
            ..Self::default()
        }
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` to a JSON body.
    pub fn json<T: serde::Serialize>(self, value: &T) -> Result<Self, serde_json::Error> {
        Ok(self.body(serde_json::to_value(value)?))
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_headers.push((name.into(), value.into()));
        self
    }

    pub fn form_entry(mut self, name: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.add_form_data_entries.push((name.into(), value.into()));
        self
    }

    pub fn on_http_error<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&HttpErrorDetails) + Send + 'static,
    {
        self.on_http_error = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for RequestArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestArgs")
            .field("path_on_host", &self.path_on_host)
            .field("body", &self.body)
            .field("add_headers", &self.add_headers)
            .field("add_form_data_entries", &self.add_form_data_entries)
            .field("on_http_error", &self.on_http_error.is_some())
            .finish()
    }
}

impl From<&str> for RequestArgs {
    fn from(path_on_host: &str) -> Self {
        RequestArgs::new(path_on_host)
    }
}

impl From<String> for RequestArgs {
    fn from(path_on_host: String) -> Self {
        RequestArgs::new(path_on_host)
    }
}
