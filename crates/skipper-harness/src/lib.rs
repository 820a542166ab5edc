#![forbid(unsafe_code)]

//! Test harness for the Skipper navigation engine.
//!
//! In-memory implementations of every collaborator trait the engine
//! drives, deterministic enough to script entire visit lifecycles without
//! a browser or a network: a [`MockTransport`] with immediate or gated
//! replies, a [`MemoryHistory`] entry stack, a [`MockScrollDom`], and an
//! [`EventRecorder`] that turns the lifecycle event stream into an ordered
//! list of labels for assertions.
//!
//! # Typical shape of a test
//!
//! ```ignore
//! let fixture = TestHost::new("https://example.test/");
//! let navigator = Navigator::new(fixture.host());
//! let events = EventRecorder::attach(&navigator);
//!
//! fixture.transport.enqueue_response(page_response(&page));
//! let outcome = drive(navigator.visit("/posts", VisitOptions::default()));
//! assert_eq!(events.names(), [...]);
//! ```

pub mod components;
pub mod history;
pub mod recorder;
pub mod session;
pub mod transport;

use std::future::Future;
use std::rc::Rc;

use serde_json::{Map, Value};

use skipper_core::protocol::HEADER_PAGE;
use skipper_core::{HttpResponse, Page};
use skipper_runtime::Host;

pub use components::{MockComponents, SwapRecord};
pub use history::MemoryHistory;
pub use recorder::EventRecorder;
pub use session::{MemorySession, MockScrollDom, RecordingDisplay};
pub use transport::{MockTransport, RecordedRequest, ReplyGate};

/// A full set of mock collaborators plus the [`Host`] bundle over them.
///
/// The concrete mocks stay accessible for scripting and assertions while
/// the engine only sees the trait objects.
pub struct TestHost {
    pub transport: Rc<MockTransport>,
    pub components: Rc<MockComponents>,
    pub history: Rc<MemoryHistory>,
    pub session: Rc<MemorySession>,
    pub scroll: Rc<MockScrollDom>,
    pub display: Rc<RecordingDisplay>,
}

impl TestHost {
    /// Collaborators for a document currently at `location`, with two
    /// scroll regions.
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self::with_scroll_regions(location, 2)
    }

    /// Collaborators with an explicit scroll-region count.
    #[must_use]
    pub fn with_scroll_regions(location: &str, regions: usize) -> Self {
        Self {
            transport: Rc::new(MockTransport::new()),
            components: Rc::new(MockComponents::new()),
            history: Rc::new(MemoryHistory::new(location)),
            session: Rc::new(MemorySession::new()),
            scroll: Rc::new(MockScrollDom::with_regions(regions)),
            display: Rc::new(RecordingDisplay::new()),
        }
    }

    /// The trait-object bundle the engine consumes.
    #[must_use]
    pub fn host(&self) -> Host {
        Host {
            transport: self.transport.clone(),
            components: self.components.clone(),
            history: self.history.clone(),
            session: self.session.clone(),
            scroll: self.scroll.clone(),
            display: self.display.clone(),
        }
    }
}

/// A 200 page-state response carrying the page as its JSON body.
#[must_use]
pub fn page_response(page: &Page) -> HttpResponse {
    let body = serde_json::to_string(page).expect("page serializes");
    HttpResponse::new(200)
        .with_header(HEADER_PAGE, "true")
        .with_body(body)
}

/// Shorthand for building a props/data map from a JSON object literal.
///
/// # Panics
///
/// Panics when the value is not a JSON object.
#[must_use]
pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().expect("expected a JSON object").clone()
}

/// Run a future to completion on the current thread.
pub fn drive<F: Future>(future: F) -> F::Output {
    futures::executor::block_on(future)
}
