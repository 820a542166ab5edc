#![forbid(unsafe_code)]

//! Collaborator traits: the seams between the engine and its host.
//!
//! The engine never talks to a concrete HTTP client, component framework,
//! or browser API. Everything outside the visit lifecycle lives behind one
//! of these object-safe traits, bundled into a [`Host`]. The async seams
//! (transport, component resolution, render swap) return `LocalBoxFuture`:
//! the engine is single-threaded and its futures are not `Send`.

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde_json::{Map, Value};
use url::Url;

use skipper_core::{HttpResponse, Method, Page, ScrollPosition, TransportOutcome};

use crate::cancel::CancelToken;

/// Raw progress callback handed to the transport: `(loaded, total)`.
pub type ProgressSink = Rc<dyn Fn(u64, Option<u64>)>;

/// The request descriptor handed to the transport.
///
/// The URL never carries a fragment (it is stripped before dispatch), the
/// body is empty for read-only methods, and the cancel token must be
/// honored: a cancelled call resolves to [`TransportOutcome::Cancelled`].
pub struct TransportRequest {
    /// Target URL, fragment stripped.
    pub url: Url,
    /// Request method.
    pub method: Method,
    /// Body payload; empty for read-only methods.
    pub body: Map<String, Value>,
    /// Full header set, marker headers included.
    pub headers: BTreeMap<String, String>,
    /// Cooperative cancellation for this call.
    pub cancel: CancelToken,
    /// Upload progress reporting.
    pub progress: ProgressSink,
}

/// The HTTP client seam.
pub trait Transport {
    /// Dispatch one request. Must resolve to exactly one outcome; a call
    /// whose cancel token fires resolves to `Cancelled`, not an error.
    fn send(&self, request: TransportRequest) -> LocalBoxFuture<'static, TransportOutcome>;
}

/// An opaque renderable unit, produced by component resolution and consumed
/// by the swap.
pub type Renderable = Box<dyn Any>;

/// Arguments for a render swap.
pub struct SwapRequest {
    /// The resolved unit for the incoming page's component.
    pub renderable: Renderable,
    /// The page being committed.
    pub page: Page,
    /// Whether component-local state should survive the swap.
    pub preserve_state: bool,
}

/// The rendering seam: resolve a component identifier to a renderable unit,
/// and swap it into the document.
pub trait ComponentAdapter {
    /// Resolve a component identifier. May suspend (e.g. code splitting).
    fn resolve(&self, component: &str) -> LocalBoxFuture<'static, Renderable>;

    /// Perform the swap. The engine awaits completion before resetting
    /// scroll and firing `navigate`.
    fn swap(&self, request: SwapRequest) -> LocalBoxFuture<'static, ()>;
}

/// How the current document load came about, per the host's navigation
/// timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadKind {
    /// An ordinary navigation.
    #[default]
    Navigate,
    /// A reload of the same document.
    Reload,
    /// A back/forward traversal.
    BackForward,
}

/// The session-history seam: the engine mirrors the current page into the
/// top history entry and reads it back on back/forward traversal.
pub trait HistoryAdapter {
    /// Create a new history entry for the page, keyed by its URL.
    fn push(&self, page: &Page);

    /// Overwrite the top history entry with the page, keyed by its URL.
    fn replace(&self, page: &Page);

    /// The state stored in the current history entry, if any.
    fn state(&self) -> Option<Page>;

    /// The live document location.
    fn location(&self) -> Url;

    /// How the current document load came about.
    fn load_kind(&self) -> LoadKind {
        LoadKind::Navigate
    }

    /// Hard-navigate the browser to a URL (full document load).
    fn assign(&self, url: &Url);

    /// Force a reload of the current document.
    fn reload(&self);
}

/// Session-scoped string storage (one tab's lifetime).
pub trait SessionStore {
    /// Read a key.
    fn get(&self, key: &str) -> Option<String>;
    /// Write a key.
    fn set(&self, key: &str, value: &str);
    /// Delete a key.
    fn remove(&self, key: &str);
}

/// The scroll-container seam. Regions are the DOM nodes carrying the
/// designated marker attribute, enumerated in document order; offsets are
/// index-aligned with that enumeration.
pub trait ScrollDom {
    /// Current offsets of every region, in document order.
    fn region_offsets(&self) -> Vec<ScrollPosition>;

    /// Re-apply offsets by index position. Extra offsets are ignored;
    /// regions past the end of the slice are left untouched.
    fn apply_region_offsets(&self, offsets: &[ScrollPosition]);

    /// Zero the document-level offsets.
    fn reset_document(&self);

    /// Zero every region's offsets.
    fn zero_regions(&self);

    /// Best-effort scroll to the element with the given fragment id; a
    /// missing element is silently ignored.
    fn scroll_into_view(&self, fragment: &str);
}

/// Sink for raw failure payloads that are not page-state responses.
pub trait ErrorDisplay {
    /// Surface the response to the developer/user.
    fn show(&self, response: &HttpResponse);
}

/// Default [`ErrorDisplay`]: logs the failure through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggedErrorDisplay;

impl ErrorDisplay for LoggedErrorDisplay {
    fn show(&self, response: &HttpResponse) {
        tracing::error!(
            status = response.status,
            body_bytes = response.body.len(),
            "navigation failure response"
        );
    }
}

/// The bundle of collaborators a [`Navigator`](crate::Navigator) drives.
#[derive(Clone)]
pub struct Host {
    /// HTTP client.
    pub transport: Rc<dyn Transport>,
    /// Component resolver/swapper.
    pub components: Rc<dyn ComponentAdapter>,
    /// Session-history store.
    pub history: Rc<dyn HistoryAdapter>,
    /// Session-scoped storage.
    pub session: Rc<dyn SessionStore>,
    /// Scroll containers.
    pub scroll: Rc<dyn ScrollDom>,
    /// Failure payload sink.
    pub display: Rc<dyn ErrorDisplay>,
}
