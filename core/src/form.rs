//! Multipart form bodies.
//!
//! # Design
//! `FormData` is an ordered list of named entries that can be inspected,
//! deleted and re-appended before dispatch, because uploads to signed
//! targets need the `"file"` field last. It is never encoded here: the
//! transport lowers it into its own multipart form, which picks the
//! boundary and sets the matching `Content-Type`.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};

use crate::error::{UsageError, WebClientError};

/// Field name that is moved to the end of every outgoing form.
pub const FILE_FIELD: &str = "file";

/// File name sent for blobs that have none.
pub const DEFAULT_FILE_NAME: &str = "blob";
/// Part type sent for blobs that have none.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Binary payload, optionally named and typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub data: Bytes,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
}

impl Blob {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            mime_type: None,
            file_name: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// File name to put on the wire.
    pub fn file_name_or_default(&self) -> &str {
        self.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME)
    }

    /// Mime type to put on the wire.
    pub fn mime_type_or_default(&self) -> &str {
        self.mime_type.as_deref().unwrap_or(DEFAULT_MIME_TYPE)
    }

    /// The blob's mime type as a header value, if it has one.
    ///
    /// Control characters are refused so a mime type can never smuggle an
    /// extra header line onto the wire.
    pub fn content_type(&self) -> Result<Option<HeaderValue>, WebClientError> {
        self.mime_type
            .as_deref()
            .map(|mime_type| {
                HeaderValue::from_str(mime_type).map_err(|e| WebClientError::InvalidHeader {
                    name: CONTENT_TYPE.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Blob(Blob),
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        FormValue::Text(value)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        FormValue::Text(value.to_string())
    }
}

impl From<Blob> for FormValue {
    fn from(value: Blob) -> Self {
        FormValue::Blob(value)
    }
}

/// An ordered `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<FormValue>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_all(&self, name: &str) -> Vec<&FormValue> {
        self.entries
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v)
            .collect()
    }

    /// Remove every entry named `name`.
    pub fn delete(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn entries(&self) -> &[(String, FormValue)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move the single `"file"` entry to the end of the form.
    ///
    /// No file entry is a no-op. More than one is refused rather than
    /// guessing which should go last.
    pub fn move_file_field_last(&mut self) -> Result<(), UsageError> {
        let count = self.entries.iter().filter(|(n, _)| n == FILE_FIELD).count();
        match count {
            0 => Ok(()),
            1 => {
                if let Some(index) = self.entries.iter().position(|(n, _)| n == FILE_FIELD) {
                    let entry = self.entries.remove(index);
                    self.entries.push(entry);
                }
                Ok(())
            }
            count => Err(UsageError::MultipleFileFields { count }),
        }
    }

    /// Refuse blob parts whose mime type cannot go in a part header.
    pub fn check_part_headers(&self) -> Result<(), WebClientError> {
        for (_, value) in &self.entries {
            if let FormValue::Blob(blob) = value {
                blob.content_type()?;
            }
        }
        Ok(())
    }
}
