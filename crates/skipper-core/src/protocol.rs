#![forbid(unsafe_code)]

//! Wire-protocol markers.
//!
//! One place for the header names and values that make an exchange a
//! navigation exchange, plus the predicates the engine classifies responses
//! with. A response carrying [`HEADER_PAGE`] is a page-state response whose
//! body is a JSON [`Page`]; HTTP 409 plus [`HEADER_LOCATION`] demands a hard
//! browser redirect instead.

use thiserror::Error;

use crate::page::Page;
use crate::request::HttpResponse;

/// Marker header: present on navigation requests (value `true`) and on
/// page-state responses.
pub const HEADER_PAGE: &str = "x-inertia";
/// Current page version, echoed on every request once known.
pub const HEADER_VERSION: &str = "x-inertia-version";
/// Partial reload: the component the subset of props is requested for.
pub const HEADER_PARTIAL_COMPONENT: &str = "x-inertia-partial-component";
/// Partial reload: comma-joined prop keys to return.
pub const HEADER_PARTIAL_ONLY: &str = "x-inertia-partial-data";
/// Hard-redirect target, paired with HTTP status 409.
pub const HEADER_LOCATION: &str = "x-inertia-location";
/// Second half of the request marker pair.
pub const HEADER_REQUESTED_WITH: &str = "x-requested-with";
/// Value for [`HEADER_REQUESTED_WITH`].
pub const REQUESTED_WITH: &str = "XMLHttpRequest";
/// Accept value sent with every navigation request.
pub const ACCEPT: &str = "text/html, application/xhtml+xml";

/// Status signalling a hard external redirect when paired with
/// [`HEADER_LOCATION`].
pub const STATUS_LOCATION_REDIRECT: u16 = 409;

/// A response that claimed (or should have claimed) to be a page-state
/// response but cannot be used as one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// The response lacks the navigation marker header.
    #[error("response with status {status} lacks the x-inertia marker header")]
    MissingMarker {
        /// Status of the offending response.
        status: u16,
    },
    /// The body of a marked response is not a valid page payload.
    #[error("page payload could not be parsed: {detail}")]
    InvalidPayload {
        /// Parser diagnostic.
        detail: String,
    },
}

/// Whether the response is a page-state response.
#[must_use]
pub fn is_page_response(response: &HttpResponse) -> bool {
    response.header(HEADER_PAGE).is_some()
}

/// The hard-redirect target, when this response demands one.
#[must_use]
pub fn location_redirect(response: &HttpResponse) -> Option<&str> {
    if response.status == STATUS_LOCATION_REDIRECT {
        response.header(HEADER_LOCATION)
    } else {
        None
    }
}

/// Parse the page payload of a marked response.
pub fn parse_page(response: &HttpResponse) -> Result<Page, ProtocolViolation> {
    serde_json::from_str(&response.body).map_err(|err| ProtocolViolation::InvalidPayload {
        detail: err.to_string(),
    })
}
