//! The value carried in the `Authorization` header.
//!
//! Stored typed so a malformed header cannot be installed, and rendered back
//! to the raw `<Scheme> <value>` string at the wire boundary.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::ConfigurationError;

const BEARER: &str = "Bearer";
const BASIC: &str = "Basic";

/// A validated `<Scheme> <value>` authentication header.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthenticationHeader {
    Bearer(String),
    /// Value is already base64-encoded.
    Basic(String),
    Other { scheme: String, value: String },
}

impl AuthenticationHeader {
    /// Parse a raw header such as `"Bearer abc"` or `"Basic dXNlcjpwYXNz"`.
    pub fn parse(header: &str) -> Result<Self, ConfigurationError> {
        let (scheme, value) = header
            .split_once(' ')
            .ok_or(ConfigurationError::MalformedAuthenticationHeader)?;
        if scheme.is_empty()
            || value.is_empty()
            || scheme.chars().any(char::is_whitespace)
            || header.chars().any(char::is_control)
        {
            return Err(ConfigurationError::MalformedAuthenticationHeader);
        }
        Ok(match scheme {
            BEARER => AuthenticationHeader::Bearer(value.to_string()),
            BASIC => AuthenticationHeader::Basic(value.to_string()),
            _ => AuthenticationHeader::Other {
                scheme: scheme.to_string(),
                value: value.to_string(),
            },
        })
    }

    /// `"Bearer " + token`.
    pub fn bearer(token: &str) -> Result<Self, ConfigurationError> {
        Self::parse(&format!("{BEARER} {token}"))
    }

    /// Encode `username:password` into a Basic header.
    pub fn from_basic_credentials(credentials: &str) -> Result<Self, ConfigurationError> {
        let (username, _password) = credentials
            .split_once(':')
            .ok_or(ConfigurationError::MalformedBasicCredentials)?;
        if username.is_empty() || credentials.chars().any(char::is_control) {
            return Err(ConfigurationError::MalformedBasicCredentials);
        }
        Ok(AuthenticationHeader::Basic(STANDARD.encode(credentials)))
    }

    pub fn scheme(&self) -> &str {
        match self {
            AuthenticationHeader::Bearer(_) => BEARER,
            AuthenticationHeader::Basic(_) => BASIC,
            AuthenticationHeader::Other { scheme, .. } => scheme,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            AuthenticationHeader::Bearer(value) | AuthenticationHeader::Basic(value) => value,
            AuthenticationHeader::Other { value, .. } => value,
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        match self {
            AuthenticationHeader::Bearer(token) => Some(token.as_str()),
            _ => None,
        }
    }
}

impl FromStr for AuthenticationHeader {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AuthenticationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.scheme(), self.value())
    }
}

// Keeps credentials out of logs.
impl fmt::Debug for AuthenticationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthenticationHeader({} <redacted>)", self.scheme())
    }
}
