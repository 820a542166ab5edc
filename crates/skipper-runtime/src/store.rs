#![forbid(unsafe_code)]

//! History-backed page store.
//!
//! Owns the single current [`Page`] and mirrors every mutation of it into
//! the host's session-history stack: a push creates a new entry, a replace
//! overwrites the top entry, both keyed by the page's own URL. The commit
//! pipeline ([`PageStore::set_page`]) writes history *before* triggering
//! the render swap, so a render failure cannot leave history and displayed
//! state inconsistent.
//!
//! # Staleness
//!
//! Component resolution suspends. After it completes, the commit re-checks
//! its [`VisitToken`](crate::visit::VisitToken) against the newest minted
//! token and silently drops the commit when a newer visit (or a history
//! traversal) has started in the meantime. This is what makes "cancel the
//! incumbent, start a new visit" race-safe without requiring transport
//! cancellation to be instantaneous.

use std::cell::RefCell;
use std::rc::Rc;

use url::Url;

use skipper_core::events::NavEvent;
use skipper_core::location::href_to_url;
use skipper_core::{Events, Page, Preserve, ScrollPosition};

use crate::host::{ComponentAdapter, HistoryAdapter, SwapRequest};
use crate::scroll::ScrollTracker;
use crate::visit::{VisitSequence, VisitToken};

/// Flags for one commit.
pub(crate) struct CommitOptions {
    /// Staleness token of the originating visit; `None` mints a fresh one
    /// (the commit is its own newest operation).
    pub(crate) token: Option<VisitToken>,
    /// Force a history replace.
    pub(crate) replace: bool,
    /// Keep scroll offsets instead of resetting after the swap.
    pub(crate) preserve_scroll: Preserve,
    /// Keep component-local state across the swap.
    pub(crate) preserve_state: Preserve,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            token: None,
            replace: false,
            preserve_scroll: Preserve::Never,
            preserve_state: Preserve::Never,
        }
    }
}

pub(crate) struct PageStore {
    history: Rc<dyn HistoryAdapter>,
    components: Rc<dyn ComponentAdapter>,
    events: Events,
    tokens: VisitSequence,
    scroll: ScrollTracker,
    current: RefCell<Option<Page>>,
}

impl PageStore {
    pub(crate) fn new(
        history: Rc<dyn HistoryAdapter>,
        components: Rc<dyn ComponentAdapter>,
        events: Events,
        tokens: VisitSequence,
        scroll: ScrollTracker,
    ) -> Self {
        Self {
            history,
            components,
            events,
            tokens,
            scroll,
            current: RefCell::new(None),
        }
    }

    /// A clone of the current page, if one has been established.
    pub(crate) fn current(&self) -> Option<Page> {
        self.current.borrow().clone()
    }

    /// The live document location.
    pub(crate) fn location(&self) -> Url {
        self.history.location()
    }

    /// Resolve a page's (possibly relative) URL against the live location.
    pub(crate) fn resolve_page_url(&self, href: &str) -> Option<Url> {
        href_to_url(href, &self.history.location()).ok()
    }

    /// Fragment of the current page's URL, if any.
    pub(crate) fn current_fragment(&self) -> Option<String> {
        let current = self.current.borrow();
        let page = current.as_ref()?;
        let url = href_to_url(&page.url, &self.history.location()).ok()?;
        url.fragment()
            .filter(|fragment| !fragment.is_empty())
            .map(ToOwned::to_owned)
    }

    /// Set the in-memory page and create a new history entry.
    pub(crate) fn push_state(&self, page: Page) {
        tracing::debug!(url = %page.url, "history push");
        self.history.push(&page);
        *self.current.borrow_mut() = Some(page);
    }

    /// Set the in-memory page and overwrite the top history entry.
    pub(crate) fn replace_state(&self, page: Page) {
        tracing::debug!(url = %page.url, "history replace");
        self.history.replace(&page);
        *self.current.borrow_mut() = Some(page);
    }

    /// Set the in-memory page only (history already moved, e.g. popstate).
    fn set_current(&self, page: Page) {
        *self.current.borrow_mut() = Some(page);
    }

    /// Cache region offsets into the current page and persist via replace,
    /// so a refresh does not lose scroll state. A no-op before `init`.
    pub(crate) fn save_scroll_positions(&self, offsets: Vec<ScrollPosition>) {
        let Some(mut page) = self.current() else {
            return;
        };
        page.scroll_regions = offsets;
        self.replace_state(page);
    }

    /// Eager, serialized scroll capture (pre-visit, pre-reset).
    pub(crate) fn save_scroll(&self) {
        self.scroll.capture(self);
    }

    /// Debounced scroll capture for bursts of region scroll events.
    pub(crate) fn debounced_scroll_capture(&self) {
        self.scroll.debounced_capture(self);
    }

    pub(crate) fn reset_scroll(&self) {
        self.scroll.reset(self);
    }

    pub(crate) fn restore_scroll(&self) {
        self.scroll.restore(self);
    }

    /// Commit a page: resolve its component, re-check staleness, mirror to
    /// history, swap, then reset scroll and fire `navigate` as the flags
    /// dictate. Returns whether the commit actually happened.
    pub(crate) async fn set_page(&self, page: Page, options: CommitOptions) -> bool {
        let token = options.token.unwrap_or_else(|| self.tokens.mint());

        let renderable = self.components.resolve(&page.component).await;
        if !self.tokens.is_current(token) {
            tracing::trace!(url = %page.url, "stale commit dropped");
            return false;
        }

        let preserve_state = options.preserve_state.resolve(&page);
        let preserve_scroll = options.preserve_scroll.resolve(&page);

        // No duplicate history entries for a URL identical to the live
        // location (fragment included).
        let same_location = self
            .resolve_page_url(&page.url)
            .is_some_and(|url| url == self.history.location());
        let replace = options.replace || same_location;

        if replace {
            self.replace_state(page.clone());
        } else {
            self.push_state(page.clone());
        }

        self.components
            .swap(SwapRequest {
                renderable,
                page: page.clone(),
                preserve_state,
            })
            .await;

        if !preserve_scroll {
            self.reset_scroll();
        }
        // A replace is an in-place correction (scroll bookkeeping, URL
        // fixups) and must not look like a user-visible navigation.
        if !replace {
            self.events.emit(NavEvent::Navigate(&page));
        }
        true
    }

    /// Handle a host history-navigation signal (back/forward traversal).
    ///
    /// A non-null state is a previously stored page: re-resolve its
    /// component under a fresh staleness token, adopt it as current
    /// (history has already moved), swap without preserving state, restore
    /// its scroll offsets, and fire `navigate`. A null state is a
    /// browser-internal traversal (hash-only change): re-derive the
    /// fragment from the live location, fix the current page's URL in
    /// place, and reset scroll.
    pub(crate) async fn handle_pop(&self, state: Option<Page>) {
        match state {
            Some(page) => {
                let token = self.tokens.mint();
                let renderable = self.components.resolve(&page.component).await;
                if !self.tokens.is_current(token) {
                    tracing::trace!(url = %page.url, "stale history restore dropped");
                    return;
                }
                self.set_current(page.clone());
                self.components
                    .swap(SwapRequest {
                        renderable,
                        page: page.clone(),
                        preserve_state: false,
                    })
                    .await;
                self.restore_scroll();
                self.events.emit(NavEvent::Navigate(&page));
            }
            None => {
                let Some(mut page) = self.current() else {
                    return;
                };
                let location = self.history.location();
                let mut url = match href_to_url(&page.url, &location) {
                    Ok(url) => url,
                    Err(_) => location.clone(),
                };
                url.set_fragment(location.fragment());
                page.url = url.to_string();
                self.replace_state(page);
                self.reset_scroll();
            }
        }
    }
}
