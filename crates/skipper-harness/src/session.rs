#![forbid(unsafe_code)]

//! Small host mocks: session storage, scroll containers, failure display.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use skipper_core::{HttpResponse, ScrollPosition};
use skipper_runtime::host::{ErrorDisplay, ScrollDom, SessionStore};

/// In-memory [`SessionStore`] implementation.
#[derive(Default)]
pub struct MemorySession {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemorySession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

/// Fake scroll containers: a fixed number of regions plus the document
/// offsets, all directly inspectable and settable from tests.
pub struct MockScrollDom {
    regions: RefCell<Vec<ScrollPosition>>,
    document: Cell<ScrollPosition>,
    into_view: RefCell<Vec<String>>,
}

impl MockScrollDom {
    /// A DOM with `count` scroll regions, all at the origin.
    #[must_use]
    pub fn with_regions(count: usize) -> Self {
        Self {
            regions: RefCell::new(vec![ScrollPosition::zero(); count]),
            document: Cell::new(ScrollPosition::zero()),
            into_view: RefCell::new(Vec::new()),
        }
    }

    /// Simulate the user scrolling one region.
    pub fn scroll_region(&self, index: usize, position: ScrollPosition) {
        if let Some(region) = self.regions.borrow_mut().get_mut(index) {
            *region = position;
        }
    }

    /// Simulate the user scrolling the document.
    pub fn scroll_document(&self, position: ScrollPosition) {
        self.document.set(position);
    }

    /// Current offsets of one region.
    #[must_use]
    pub fn region(&self, index: usize) -> ScrollPosition {
        self.regions
            .borrow()
            .get(index)
            .copied()
            .unwrap_or_default()
    }

    /// Current document offsets.
    #[must_use]
    pub fn document(&self) -> ScrollPosition {
        self.document.get()
    }

    /// Fragment ids scrolled into view so far.
    #[must_use]
    pub fn scrolled_into_view(&self) -> Vec<String> {
        self.into_view.borrow().clone()
    }
}

impl ScrollDom for MockScrollDom {
    fn region_offsets(&self) -> Vec<ScrollPosition> {
        self.regions.borrow().clone()
    }

    fn apply_region_offsets(&self, offsets: &[ScrollPosition]) {
        let mut regions = self.regions.borrow_mut();
        for (region, offset) in regions.iter_mut().zip(offsets) {
            *region = *offset;
        }
    }

    fn reset_document(&self) {
        self.document.set(ScrollPosition::zero());
    }

    fn zero_regions(&self) {
        for region in self.regions.borrow_mut().iter_mut() {
            *region = ScrollPosition::zero();
        }
    }

    fn scroll_into_view(&self, fragment: &str) {
        self.into_view.borrow_mut().push(fragment.to_string());
    }
}

/// Recording [`ErrorDisplay`] implementation.
#[derive(Default)]
pub struct RecordingDisplay {
    shown: RefCell<Vec<HttpResponse>>,
}

impl RecordingDisplay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Responses surfaced so far.
    #[must_use]
    pub fn shown(&self) -> Vec<HttpResponse> {
        self.shown.borrow().clone()
    }
}

impl ErrorDisplay for RecordingDisplay {
    fn show(&self, response: &HttpResponse) {
        self.shown.borrow_mut().push(response.clone());
    }
}
