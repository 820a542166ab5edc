#![forbid(unsafe_code)]

//! Engine configuration.

use std::time::Duration;

/// Tunables for a [`Navigator`](crate::Navigator) instance.
#[derive(Debug, Clone)]
pub struct NavigatorConfig {
    /// Window for coalescing bursts of scroll-region events into a single
    /// capture. The eager pre-visit capture ignores the window.
    pub scroll_debounce: Duration,
    /// Session-storage key for the pending hard-redirect marker.
    pub location_marker_key: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            scroll_debounce: Duration::from_millis(100),
            location_marker_key: "inertiaLocationVisit".to_string(),
        }
    }
}

impl NavigatorConfig {
    /// Set the scroll capture debounce window.
    #[must_use]
    pub fn with_scroll_debounce(mut self, window: Duration) -> Self {
        self.scroll_debounce = window;
        self
    }

    /// Set the session-storage key for the hard-redirect marker.
    #[must_use]
    pub fn with_location_marker_key(mut self, key: impl Into<String>) -> Self {
        self.location_marker_key = key.into();
        self
    }
}
