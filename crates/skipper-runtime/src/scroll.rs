#![forbid(unsafe_code)]

//! Scroll state tracking.
//!
//! Scroll regions are DOM nodes carrying the designated marker attribute,
//! enumerated in document order by the host's [`ScrollDom`] adapter. The
//! tracker caches their offsets inside the current page (persisted via a
//! history replace) and re-applies them by index position on restore:
//! index alignment, not id matching, so the ordering must be stable across
//! capture and restore.
//!
//! # Capture serialization
//!
//! Both capture paths, the debounced per-scroll-event path and the eager
//! pre-visit/pre-reset path, funnel through [`ScrollTracker::capture`],
//! which also advances the debounce window. A coalesced burst can therefore
//! never clobber a more recent eager capture: whichever capture ran last
//! wrote last.
//!
//! The window is leading-edge: the first event of a burst captures
//! immediately and the remainder of the burst is absorbed. Any tail the
//! window absorbs is bounded by the eager capture that precedes every
//! navigation commit and scroll reset.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use web_time::Instant;

use crate::host::ScrollDom;
use crate::store::PageStore;

/// Leading-edge capture window.
struct CaptureWindow {
    window: Duration,
    last: Option<Instant>,
}

impl CaptureWindow {
    /// Whether a capture at `now` is admitted, advancing the window if so.
    fn admit(&mut self, now: Instant) -> bool {
        match self.last {
            Some(previous) if now.duration_since(previous) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Advance the window unconditionally (eager capture ran).
    fn touch(&mut self, now: Instant) {
        self.last = Some(now);
    }
}

pub(crate) struct ScrollTracker {
    dom: Rc<dyn ScrollDom>,
    window: RefCell<CaptureWindow>,
}

impl ScrollTracker {
    pub(crate) fn new(dom: Rc<dyn ScrollDom>, debounce: Duration) -> Self {
        Self {
            dom,
            window: RefCell::new(CaptureWindow {
                window: debounce,
                last: None,
            }),
        }
    }

    /// Serialized capture: read every region's offsets and cache them into
    /// the current page.
    pub(crate) fn capture(&self, store: &PageStore) {
        self.window.borrow_mut().touch(Instant::now());
        store.save_scroll_positions(self.dom.region_offsets());
    }

    /// Capture coalescing bursts of scroll events through the window.
    pub(crate) fn debounced_capture(&self, store: &PageStore) {
        if self.window.borrow_mut().admit(Instant::now()) {
            store.save_scroll_positions(self.dom.region_offsets());
        }
    }

    /// Zero the document and every region, persist the zeros, then scroll
    /// the current fragment's element into view (best effort).
    pub(crate) fn reset(&self, store: &PageStore) {
        self.dom.reset_document();
        self.dom.zero_regions();
        self.capture(store);
        if let Some(fragment) = store.current_fragment() {
            self.dom.scroll_into_view(&fragment);
        }
    }

    /// Re-apply the current page's cached offsets by index position.
    pub(crate) fn restore(&self, store: &PageStore) {
        if let Some(page) = store.current() {
            if !page.scroll_regions.is_empty() {
                self.dom.apply_region_offsets(&page.scroll_regions);
            }
        }
    }
}
