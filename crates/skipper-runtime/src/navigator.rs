#![forbid(unsafe_code)]

//! The visit controller.
//!
//! [`Navigator`] drives one navigation attempt end-to-end and enforces
//! single-flight semantics: at most one visit is active, starting a new one
//! interrupts the incumbent, and every terminal path funnels through one
//! `finish` event. The navigator is an explicit instance; independent
//! instances (one per test, one per document) share no state.
//!
//! The host is expected to wire its own input sources into the engine:
//! feed back/forward signals to [`Navigator::handle_history_pop`] and
//! scroll events from marked regions to [`Navigator::handle_region_scroll`].

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use skipper_core::events::{EventControl, EventKind, ListenerId, NavEvent};
use skipper_core::location::{href_to_url, merge_data_into_query, same_without_hash, url_without_hash};
use skipper_core::protocol::{self, ProtocolViolation};
use skipper_core::{
    Events, FinishFlags, Method, Page, Preserve, TransferProgress, TransportOutcome,
    VisitDescriptor,
};

use crate::config::NavigatorConfig;
use crate::host::{Host, LoadKind, ProgressSink, TransportRequest};
use crate::scroll::ScrollTracker;
use crate::store::{CommitOptions, PageStore};
use crate::visit::{
    ActiveVisit, VisitError, VisitOptions, VisitOutcome, VisitSequence, VisitShared, VisitToken,
};

/// Key under which [`Navigator::remember`] stores unscoped state.
pub const DEFAULT_REMEMBER_KEY: &str = "default";

/// The navigation engine. Cheap to clone; clones drive the same instance.
pub struct Navigator {
    inner: Rc<Inner>,
}

struct Inner {
    config: NavigatorConfig,
    host: Host,
    events: Events,
    tokens: VisitSequence,
    store: PageStore,
    active: RefCell<Option<ActiveVisit>>,
}

/// Visit-scoped cancellation handle, delivered through
/// [`VisitOptions::on_cancel_token`](crate::VisitOptions::on_cancel_token).
///
/// Invoking it aborts the in-flight request of the visit that exposed it; it
/// is a no-op once a newer visit has taken the active slot or the engine is
/// gone.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Weak<Inner>,
    token: VisitToken,
}

impl CancelHandle {
    /// Cancel the visit this handle belongs to, if it is still active.
    pub fn cancel(&self) {
        if let Some(inner) = self.inner.upgrade() {
            let navigator = Navigator { inner };
            navigator.cancel_if_active(self.token);
        }
    }
}

/// Consumed hard-redirect marker.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct LocationMarker {
    #[serde(rename = "preserveScroll", default)]
    preserve_scroll: bool,
}

impl Clone for Navigator {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl Navigator {
    /// Create an engine over the given host with default configuration.
    #[must_use]
    pub fn new(host: Host) -> Self {
        Self::with_config(host, NavigatorConfig::default())
    }

    /// Create an engine with explicit configuration.
    #[must_use]
    pub fn with_config(host: Host, config: NavigatorConfig) -> Self {
        let events = Events::new();
        let tokens = VisitSequence::default();
        let scroll = ScrollTracker::new(Rc::clone(&host.scroll), config.scroll_debounce);
        let store = PageStore::new(
            Rc::clone(&host.history),
            Rc::clone(&host.components),
            events.clone(),
            tokens.clone(),
            scroll,
        );
        Self {
            inner: Rc::new(Inner {
                config,
                host,
                events,
                tokens,
                store,
                active: RefCell::new(None),
            }),
        }
    }

    /// The current page, once `init` has established one.
    #[must_use]
    pub fn page(&self) -> Option<Page> {
        self.inner.store.current()
    }

    /// Subscribe a lifecycle listener. Returns the unsubscribe handle.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(NavEvent<'_>) -> EventControl + 'static,
    {
        self.inner.events.on(kind, listener)
    }

    /// Unsubscribe a listener.
    pub fn off(&self, id: ListenerId) -> bool {
        self.inner.events.off(id)
    }

    // ------------------------------------------------------------------
    // Initial load
    // ------------------------------------------------------------------

    /// Establish the initially delivered page.
    ///
    /// Three mutually exclusive cases, checked in order: a back/forward
    /// restore (the history state wins, adopting the delivered page's
    /// version so a deploy is picked up), a pending hard-redirect marker
    /// (consumed exactly once), or a fresh load. In every case exactly one
    /// `navigate` event fires once the page is established.
    pub async fn init(&self, page: Page) {
        let mut page = page;
        let store = &self.inner.store;
        let history_state = self.inner.host.history.state();
        let back_forward =
            self.inner.host.history.load_kind() == LoadKind::BackForward && history_state.is_some();

        if back_forward {
            if let Some(mut restored) = history_state {
                restored.version = page.version.clone();
                store
                    .set_page(
                        restored,
                        CommitOptions {
                            preserve_scroll: Preserve::Always,
                            ..CommitOptions::default()
                        },
                    )
                    .await;
                store.restore_scroll();
            }
        } else if let Some(marker) = self.take_location_marker() {
            attach_live_fragment(&mut page, &self.inner.host.history.location());
            if let Some(state) = history_state {
                page.remembered_state = state.remembered_state;
                page.scroll_regions = state.scroll_regions;
            }
            store
                .set_page(
                    page,
                    CommitOptions {
                        preserve_scroll: Preserve::from(marker.preserve_scroll),
                        ..CommitOptions::default()
                    },
                )
                .await;
            if marker.preserve_scroll {
                store.restore_scroll();
            }
        } else {
            attach_live_fragment(&mut page, &self.inner.host.history.location());
            store.set_page(page, CommitOptions::default()).await;
        }

        if let Some(current) = store.current() {
            self.inner.events.emit(NavEvent::Navigate(&current));
        }
    }

    // ------------------------------------------------------------------
    // Visits
    // ------------------------------------------------------------------

    /// Drive one navigation attempt to its terminal outcome.
    ///
    /// The returned future must be polled on the host's single-threaded
    /// executor; suspension points are the transport call, component
    /// resolution, and the render swap.
    pub async fn visit(
        &self,
        target: &str,
        options: VisitOptions,
    ) -> Result<VisitOutcome, VisitError> {
        let VisitOptions {
            method,
            data,
            replace,
            preserve_scroll,
            preserve_state,
            only,
            headers,
            mut callbacks,
        } = options;

        let base = self.inner.host.history.location();
        let url = href_to_url(target, &base)?;
        let (url, data) = merge_data_into_query(method, url, data);
        let descriptor = VisitDescriptor {
            url,
            method,
            data,
            only,
            headers,
        };

        if let Some(on_before) = callbacks.on_before.as_mut() {
            if !on_before(&descriptor) {
                tracing::debug!(url = %descriptor.url, "visit vetoed by on_before");
                return Ok(VisitOutcome::Aborted);
            }
        }
        if self.inner.events.emit(NavEvent::Before(&descriptor)).vetoed() {
            tracing::debug!(url = %descriptor.url, "visit vetoed by before listener");
            return Ok(VisitOutcome::Aborted);
        }

        self.cancel_active(false, true);
        self.inner.store.save_scroll();

        let token = self.inner.tokens.mint();
        let shared = VisitShared::new(descriptor, callbacks);
        *self.inner.active.borrow_mut() = Some(ActiveVisit {
            token,
            shared: Rc::clone(&shared),
        });

        let on_cancel_token = shared.callbacks.borrow_mut().on_cancel_token.take();
        if let Some(mut callback) = on_cancel_token {
            callback(CancelHandle {
                inner: Rc::downgrade(&self.inner),
                token,
            });
            shared.callbacks.borrow_mut().on_cancel_token = Some(callback);
        }

        tracing::debug!(
            url = %shared.descriptor.url,
            method = %shared.descriptor.method,
            "visit started"
        );
        self.inner.events.emit(NavEvent::Start(&shared.descriptor));
        let on_start = shared.callbacks.borrow_mut().on_start.take();
        if let Some(mut callback) = on_start {
            callback(&shared.descriptor);
            shared.callbacks.borrow_mut().on_start = Some(callback);
        }

        let request = self.build_request(&shared);
        let outcome = self.inner.host.transport.send(request).await;
        self.conclude(token, &shared, outcome, replace, preserve_scroll, preserve_state)
            .await
    }

    /// GET visit; data merges into the query string.
    pub async fn get(
        &self,
        target: &str,
        data: Map<String, Value>,
        options: VisitOptions,
    ) -> Result<VisitOutcome, VisitError> {
        self.visit(target, options.method(Method::Get).data(data)).await
    }

    /// POST visit; preserves component state unless the options say
    /// otherwise.
    pub async fn post(
        &self,
        target: &str,
        data: Map<String, Value>,
        options: VisitOptions,
    ) -> Result<VisitOutcome, VisitError> {
        self.visit(target, state_preserving(options.method(Method::Post).data(data)))
            .await
    }

    /// PUT visit; preserves component state unless the options say
    /// otherwise.
    pub async fn put(
        &self,
        target: &str,
        data: Map<String, Value>,
        options: VisitOptions,
    ) -> Result<VisitOutcome, VisitError> {
        self.visit(target, state_preserving(options.method(Method::Put).data(data)))
            .await
    }

    /// PATCH visit; preserves component state unless the options say
    /// otherwise.
    pub async fn patch(
        &self,
        target: &str,
        data: Map<String, Value>,
        options: VisitOptions,
    ) -> Result<VisitOutcome, VisitError> {
        self.visit(target, state_preserving(options.method(Method::Patch).data(data)))
            .await
    }

    /// DELETE visit; preserves component state unless the options say
    /// otherwise.
    pub async fn delete(
        &self,
        target: &str,
        options: VisitOptions,
    ) -> Result<VisitOutcome, VisitError> {
        self.visit(target, state_preserving(options.method(Method::Delete)))
            .await
    }

    /// Re-visit the current location, keeping scroll and component state.
    pub async fn reload(&self, options: VisitOptions) -> Result<VisitOutcome, VisitError> {
        let target = self.inner.host.history.location().to_string();
        self.visit(
            &target,
            options
                .preserve_scroll(Preserve::Always)
                .preserve_state(Preserve::Always),
        )
        .await
    }

    // ------------------------------------------------------------------
    // Host signals
    // ------------------------------------------------------------------

    /// Feed a host history-navigation (back/forward) signal.
    pub async fn handle_history_pop(&self, state: Option<Page>) {
        self.inner.store.handle_pop(state).await;
    }

    /// Feed a scroll event from a marked region; capture is debounced.
    pub fn handle_region_scroll(&self) {
        self.inner.store.debounced_scroll_capture();
    }

    // ------------------------------------------------------------------
    // Remembered state
    // ------------------------------------------------------------------

    /// Merge `data` under `key` into the current page's remembered state
    /// and persist via a history replace. No new entry, no `navigate`.
    pub fn remember(&self, key: &str, data: Value) {
        let Some(mut page) = self.inner.store.current() else {
            return;
        };
        page.remembered_state.insert(key.to_string(), data);
        self.inner.store.replace_state(page);
    }

    /// Read remembered state back out of the host history entry.
    #[must_use]
    pub fn restore(&self, key: &str) -> Option<Value> {
        self.inner
            .host
            .history
            .state()
            .and_then(|page| page.remembered_state.get(key).cloned())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn cancel_if_active(&self, token: VisitToken) {
        let is_active = self
            .inner
            .active
            .borrow()
            .as_ref()
            .is_some_and(|active| active.token == token);
        if is_active {
            self.cancel_active(true, false);
        }
    }

    /// Cancel the incumbent visit, tagging it cancelled or interrupted.
    /// Fires its `cancel` event, its terminal `finish`, and `on_cancel`.
    fn cancel_active(&self, cancelled: bool, interrupted: bool) {
        let shared = self
            .inner
            .active
            .borrow()
            .as_ref()
            .map(|active| Rc::clone(&active.shared));
        let Some(shared) = shared else {
            return;
        };
        if shared.finished.get() {
            return;
        }

        shared.cancelled.set(cancelled);
        shared.interrupted.set(interrupted);
        shared.cancel.cancel();
        tracing::debug!(
            url = %shared.descriptor.url,
            cancelled,
            interrupted,
            "active visit aborted"
        );

        self.inner.events.emit(NavEvent::Cancel(&shared.descriptor));
        self.finish_visit(&shared, FinishFlags::aborted(cancelled, interrupted));
        let on_cancel = shared.callbacks.borrow_mut().on_cancel.take();
        if let Some(mut callback) = on_cancel {
            callback();
            shared.callbacks.borrow_mut().on_cancel = Some(callback);
        }
    }

    /// The one guaranteed cleanup funnel; idempotent per visit.
    fn finish_visit(&self, shared: &VisitShared, flags: FinishFlags) {
        if shared.finished.replace(true) {
            return;
        }
        self.inner.events.emit(NavEvent::Finish {
            visit: &shared.descriptor,
            flags,
        });
        let on_finish = shared.callbacks.borrow_mut().on_finish.take();
        if let Some(mut callback) = on_finish {
            callback(&flags);
            shared.callbacks.borrow_mut().on_finish = Some(callback);
        }
    }

    fn release_slot(&self, token: VisitToken) {
        let mut active = self.inner.active.borrow_mut();
        if active.as_ref().is_some_and(|entry| entry.token == token) {
            *active = None;
        }
    }

    fn build_request(&self, shared: &Rc<VisitShared>) -> TransportRequest {
        let descriptor = &shared.descriptor;
        let current = self.inner.store.current();

        let mut headers = descriptor.headers.clone();
        headers.insert("accept".into(), protocol::ACCEPT.into());
        headers.insert(
            protocol::HEADER_REQUESTED_WITH.into(),
            protocol::REQUESTED_WITH.into(),
        );
        headers.insert(protocol::HEADER_PAGE.into(), "true".into());
        if !descriptor.only.is_empty() {
            if let Some(page) = &current {
                headers.insert(
                    protocol::HEADER_PARTIAL_COMPONENT.into(),
                    page.component.clone(),
                );
                headers.insert(
                    protocol::HEADER_PARTIAL_ONLY.into(),
                    descriptor.only.join(","),
                );
            }
        }
        if let Some(version) = current.as_ref().and_then(|page| page.version.clone()) {
            headers.insert(protocol::HEADER_VERSION.into(), version);
        }

        let body = if descriptor.method.carries_body() {
            descriptor.data.clone()
        } else {
            Map::new()
        };

        let events = self.inner.events.clone();
        let progress_shared = Rc::clone(shared);
        let progress: ProgressSink = Rc::new(move |loaded, total| {
            let update = TransferProgress::new(loaded, total);
            events.emit(NavEvent::Progress(&update));
            let on_progress = progress_shared.callbacks.borrow_mut().on_progress.take();
            if let Some(mut callback) = on_progress {
                callback(&update);
                progress_shared.callbacks.borrow_mut().on_progress = Some(callback);
            }
        });

        TransportRequest {
            url: url_without_hash(&descriptor.url),
            method: descriptor.method,
            body,
            headers,
            cancel: shared.cancel.token(),
            progress,
        }
    }

    async fn conclude(
        &self,
        token: VisitToken,
        shared: &Rc<VisitShared>,
        outcome: TransportOutcome,
        replace: bool,
        preserve_scroll: Preserve,
        preserve_state: Preserve,
    ) -> Result<VisitOutcome, VisitError> {
        match outcome {
            TransportOutcome::Cancelled => {
                // Cancellation normally originates from cancel_active,
                // which already fired cancel/finish. Fold a transport that
                // cancelled on its own into the same path.
                if !shared.finished.get() {
                    shared.cancelled.set(true);
                    self.inner.events.emit(NavEvent::Cancel(&shared.descriptor));
                    self.finish_visit(shared, FinishFlags::aborted(true, false));
                    let on_cancel = shared.callbacks.borrow_mut().on_cancel.take();
                    if let Some(mut callback) = on_cancel {
                        callback();
                        shared.callbacks.borrow_mut().on_cancel = Some(callback);
                    }
                }
                self.release_slot(token);
                if shared.interrupted.get() {
                    Ok(VisitOutcome::Interrupted)
                } else {
                    Ok(VisitOutcome::Cancelled)
                }
            }
            TransportOutcome::Failed(error) => {
                tracing::debug!(url = %shared.descriptor.url, %error, "transport failure");
                let suppressed = self.inner.events.emit(NavEvent::Error(&error)).vetoed();
                self.finish_visit(shared, FinishFlags::completed());
                self.release_slot(token);
                if suppressed {
                    Ok(VisitOutcome::Errored)
                } else {
                    Err(VisitError::Transport(error))
                }
            }
            TransportOutcome::Response(response) => {
                self.conclude_response(token, shared, response, replace, preserve_scroll, preserve_state)
                    .await
            }
        }
    }

    async fn conclude_response(
        &self,
        token: VisitToken,
        shared: &Rc<VisitShared>,
        response: skipper_core::HttpResponse,
        replace: bool,
        preserve_scroll: Preserve,
        preserve_state: Preserve,
    ) -> Result<VisitOutcome, VisitError> {
        if response.is_success() {
            if !protocol::is_page_response(&response) {
                self.finish_visit(shared, FinishFlags::completed());
                self.release_slot(token);
                return Err(VisitError::Protocol(ProtocolViolation::MissingMarker {
                    status: response.status,
                }));
            }
            let page = match protocol::parse_page(&response) {
                Ok(page) => page,
                Err(violation) => {
                    self.finish_visit(shared, FinishFlags::completed());
                    self.release_slot(token);
                    return Err(VisitError::Protocol(violation));
                }
            };
            let page = self.merge_partial_props(shared, page);
            let page = self.with_carried_fragment(shared, page);

            let committed = self
                .inner
                .store
                .set_page(
                    page,
                    CommitOptions {
                        token: Some(token),
                        replace,
                        preserve_scroll,
                        preserve_state,
                    },
                )
                .await;
            if committed {
                if let Some(current) = self.inner.store.current() {
                    self.inner.events.emit(NavEvent::Success(&current));
                    let on_success = shared.callbacks.borrow_mut().on_success.take();
                    if let Some(mut callback) = on_success {
                        callback(&current);
                        shared.callbacks.borrow_mut().on_success = Some(callback);
                    }
                }
            }
            self.finish_visit(shared, FinishFlags::completed());
            self.release_slot(token);
            return Ok(VisitOutcome::Completed);
        }

        if protocol::is_page_response(&response) {
            // The server is signalling "here is the page you should show
            // instead" (e.g. a version mismatch). Commit without the
            // success path.
            match protocol::parse_page(&response) {
                Ok(page) => {
                    self.inner
                        .store
                        .set_page(
                            page,
                            CommitOptions {
                                token: Some(token),
                                ..CommitOptions::default()
                            },
                        )
                        .await;
                    self.finish_visit(shared, FinishFlags::completed());
                    self.release_slot(token);
                    Ok(VisitOutcome::ErrorPage)
                }
                Err(violation) => {
                    self.finish_visit(shared, FinishFlags::completed());
                    self.release_slot(token);
                    Err(VisitError::Protocol(violation))
                }
            }
        } else if let Some(target) = protocol::location_redirect(&response) {
            let target = target.to_string();
            let location = self.inner.host.history.location();
            let redirect = match href_to_url(&target, &location) {
                Ok(url) => url,
                Err(error) => {
                    self.finish_visit(shared, FinishFlags::completed());
                    self.release_slot(token);
                    return Err(VisitError::Target(error));
                }
            };
            let redirect =
                carried_fragment(&shared.descriptor.url, &redirect).unwrap_or(redirect);
            let preserve = preserve_scroll.literal().unwrap_or(false);
            self.location_visit(&redirect, preserve);
            self.finish_visit(shared, FinishFlags::completed());
            self.release_slot(token);
            Ok(VisitOutcome::LocationRedirect)
        } else {
            let suppressed = self.inner.events.emit(NavEvent::Invalid(&response)).vetoed();
            if !suppressed {
                self.inner.host.display.show(&response);
            }
            self.finish_visit(shared, FinishFlags::completed());
            self.release_slot(token);
            Ok(VisitOutcome::Invalid)
        }
    }

    /// Partial reload: server-returned keys win, the rest of the currently
    /// held props are retained, but only when the response is for the
    /// currently displayed component. A mismatched component takes the
    /// response props wholesale.
    fn merge_partial_props(&self, shared: &VisitShared, mut page: Page) -> Page {
        if shared.descriptor.only.is_empty() {
            return page;
        }
        let Some(current) = self.inner.store.current() else {
            return page;
        };
        if current.component != page.component {
            return page;
        }
        let mut props = current.props;
        for (key, value) in std::mem::take(&mut page.props) {
            props.insert(key, value);
        }
        page.props = props;
        page
    }

    /// Re-attach the visit URL's fragment to a response URL that lost it.
    fn with_carried_fragment(&self, shared: &VisitShared, mut page: Page) -> Page {
        if shared.descriptor.url.fragment().is_none() {
            return page;
        }
        let base = self.inner.host.history.location();
        if let Ok(response_url) = href_to_url(&page.url, &base) {
            if let Some(reattached) = carried_fragment(&shared.descriptor.url, &response_url) {
                page.url = reattached.to_string();
            }
        }
        page
    }

    /// Persist the pending-redirect marker, then hard-navigate. A target
    /// identical to the current location (ignoring fragment) forces a
    /// reload, since the browser will not navigate to an identical URL on
    /// its own.
    fn location_visit(&self, target: &Url, preserve_scroll: bool) {
        tracing::debug!(url = %target, preserve_scroll, "hard location redirect");
        let marker = serde_json::json!({ "preserveScroll": preserve_scroll }).to_string();
        self.inner
            .host
            .session
            .set(&self.inner.config.location_marker_key, &marker);
        let current = self.inner.host.history.location();
        self.inner.host.history.assign(target);
        if same_without_hash(&current, target) {
            self.inner.host.history.reload();
        }
    }

    fn take_location_marker(&self) -> Option<LocationMarker> {
        let key = &self.inner.config.location_marker_key;
        let raw = self.inner.host.session.get(key)?;
        self.inner.host.session.remove(key);
        Some(serde_json::from_str(&raw).unwrap_or_default())
    }
}

/// Default the component-state flag to preserving, the way write-method
/// conveniences do; an explicit flag in the options wins.
fn state_preserving(mut options: VisitOptions) -> VisitOptions {
    if matches!(options.preserve_state, Preserve::Never) {
        options.preserve_state = Preserve::Always;
    }
    options
}

/// Append the live location's fragment to a freshly delivered page URL.
fn attach_live_fragment(page: &mut Page, location: &Url) {
    if let Some(fragment) = location.fragment() {
        if !fragment.is_empty() {
            page.url.push('#');
            page.url.push_str(fragment);
        }
    }
}

/// The visit URL's fragment, carried over to a candidate URL that lacks one
/// and matches the visit URL up to the fragment.
fn carried_fragment(visit_url: &Url, candidate: &Url) -> Option<Url> {
    let fragment = visit_url.fragment()?;
    if candidate.fragment().is_some() || !same_without_hash(visit_url, candidate) {
        return None;
    }
    let mut with_fragment = candidate.clone();
    with_fragment.set_fragment(Some(fragment));
    Some(with_fragment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_fragment_is_appended() {
        let mut page = Page::new("Posts", "/posts");
        let location = Url::parse("https://example.test/posts#comments").unwrap();
        attach_live_fragment(&mut page, &location);
        assert_eq!(page.url, "/posts#comments");
    }

    #[test]
    fn empty_fragment_is_ignored() {
        let mut page = Page::new("Posts", "/posts");
        let location = Url::parse("https://example.test/posts").unwrap();
        attach_live_fragment(&mut page, &location);
        assert_eq!(page.url, "/posts");
    }

    #[test]
    fn fragment_carries_to_matching_bare_url() {
        let visit = Url::parse("https://example.test/posts#comments").unwrap();
        let candidate = Url::parse("https://example.test/posts").unwrap();
        let carried = carried_fragment(&visit, &candidate).unwrap();
        assert_eq!(carried.as_str(), "https://example.test/posts#comments");
    }

    #[test]
    fn fragment_does_not_carry_to_a_different_url() {
        let visit = Url::parse("https://example.test/posts#comments").unwrap();
        let candidate = Url::parse("https://example.test/other").unwrap();
        assert!(carried_fragment(&visit, &candidate).is_none());
    }

    #[test]
    fn existing_fragment_is_not_overwritten() {
        let visit = Url::parse("https://example.test/posts#comments").unwrap();
        let candidate = Url::parse("https://example.test/posts#other").unwrap();
        assert!(carried_fragment(&visit, &candidate).is_none());
    }

    #[test]
    fn state_preserving_respects_an_explicit_flag() {
        let forced = state_preserving(VisitOptions::default());
        assert!(matches!(forced.preserve_state, Preserve::Always));

        let explicit = state_preserving(
            VisitOptions::default().preserve_state(Preserve::When(Rc::new(|_: &Page| false))),
        );
        assert!(matches!(explicit.preserve_state, Preserve::When(_)));
    }
}
