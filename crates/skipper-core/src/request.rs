#![forbid(unsafe_code)]

//! Transport vocabulary: methods, responses, progress, and outcomes.
//!
//! The concrete HTTP client lives behind the runtime's `Transport` trait;
//! these are the types that cross that seam. A transport call ends in
//! exactly one of three ways: a response (any status), a cooperative
//! cancellation, or a network-level failure with no response, captured by
//! [`TransportOutcome`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// HTTP method of a visit.
///
/// Methods parse case-insensitively and display lowercase, which is the
/// normalization the engine applies to caller-supplied methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Lowercase wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    /// Whether visit data rides in the request body rather than the query
    /// string. Read-only methods merge data into the query string instead.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized method names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized HTTP method {0:?}")]
pub struct MethodParseError(pub String);

impl FromStr for Method {
    type Err = MethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            _ => Err(MethodParseError(s.to_string())),
        }
    }
}

/// Upload progress for an in-flight request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Bytes transferred so far.
    pub loaded: u64,
    /// Total bytes, when the transport knows it.
    pub total: Option<u64>,
    /// `round(loaded / total * 100)`, when the total is known and non-zero.
    pub percentage: Option<u8>,
}

impl TransferProgress {
    /// Build a progress update, deriving the percentage from the totals.
    #[must_use]
    pub fn new(loaded: u64, total: Option<u64>) -> Self {
        let percentage = total
            .filter(|total| *total > 0)
            .map(|total| ((loaded as f64 / total as f64) * 100.0).round() as u8);
        Self {
            loaded,
            total,
            percentage,
        }
    }
}

/// A server response as seen by the engine.
///
/// Header names are stored lowercase; lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    headers: BTreeMap<String, String>,
    /// Raw response body.
    pub body: String,
}

impl HttpResponse {
    /// Create a response with the given status and no headers or body.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: String::new(),
        }
    }

    /// Add a header. Names are normalized to lowercase.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// A network-level failure that produced no response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport failure: {message}")]
pub struct TransportError {
    /// Human-readable description from the transport.
    pub message: String,
}

impl TransportError {
    /// Create a transport error from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Terminal result of one transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    /// The server answered, with any status.
    Response(HttpResponse),
    /// The call was cancelled through its cancel token.
    Cancelled,
    /// The call failed below the HTTP layer; there is no response.
    Failed(TransportError),
}
