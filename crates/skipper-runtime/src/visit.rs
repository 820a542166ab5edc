#![forbid(unsafe_code)]

//! Per-visit options, callbacks, and terminal outcomes.
//!
//! A visit is one navigation attempt: created by
//! [`Navigator::visit`](crate::Navigator::visit), installed as *the* active
//! visit (interrupting any incumbent), driven to exactly one terminal
//! outcome, then discarded. There is no retry and no pooling.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use thiserror::Error;

use skipper_core::location::LocationError;
use skipper_core::protocol::ProtocolViolation;
use skipper_core::{
    FinishFlags, Method, Page, Preserve, TransferProgress, TransportError, VisitDescriptor,
};

use crate::cancel::CancelSource;
use crate::navigator::CancelHandle;

/// Monotonic staleness token. A completion whose token is no longer the
/// newest minted one must not mutate shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VisitToken(u64);

/// Mints and tracks the newest [`VisitToken`]. Cheap to clone; clones share
/// one counter.
#[derive(Clone, Default)]
pub(crate) struct VisitSequence {
    newest: Rc<Cell<u64>>,
}

impl VisitSequence {
    pub(crate) fn mint(&self) -> VisitToken {
        let next = self.newest.get() + 1;
        self.newest.set(next);
        VisitToken(next)
    }

    pub(crate) fn is_current(&self, token: VisitToken) -> bool {
        self.newest.get() == token.0
    }
}

/// The lifecycle callbacks of one visit.
///
/// All callbacks are optional. `on_before` may veto the visit by returning
/// `false`; the rest are notifications.
#[derive(Default)]
pub struct VisitCallbacks {
    pub(crate) on_cancel_token: Option<Box<dyn FnMut(CancelHandle)>>,
    pub(crate) on_before: Option<Box<dyn FnMut(&VisitDescriptor) -> bool>>,
    pub(crate) on_start: Option<Box<dyn FnMut(&VisitDescriptor)>>,
    pub(crate) on_progress: Option<Box<dyn FnMut(&TransferProgress)>>,
    pub(crate) on_finish: Option<Box<dyn FnMut(&FinishFlags)>>,
    pub(crate) on_cancel: Option<Box<dyn FnMut()>>,
    pub(crate) on_success: Option<Box<dyn FnMut(&Page)>>,
}

impl fmt::Debug for VisitCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisitCallbacks")
            .field("on_cancel_token", &self.on_cancel_token.is_some())
            .field("on_before", &self.on_before.is_some())
            .field("on_start", &self.on_start.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .field("on_finish", &self.on_finish.is_some())
            .field("on_cancel", &self.on_cancel.is_some())
            .field("on_success", &self.on_success.is_some())
            .finish()
    }
}

/// Options for one visit.
#[derive(Debug, Default)]
pub struct VisitOptions {
    /// Request method; normalized to its lowercase wire form.
    pub method: Method,
    /// Structured payload, split between query string and body by method
    /// semantics.
    pub data: Map<String, Value>,
    /// Force a history replace instead of a push.
    pub replace: bool,
    /// Keep scroll offsets across the commit.
    pub preserve_scroll: Preserve,
    /// Keep component-local state across the swap.
    pub preserve_state: Preserve,
    /// Prop keys for a partial reload; empty requests the full page.
    pub only: Vec<String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
    /// Lifecycle callbacks.
    pub callbacks: VisitCallbacks,
}

impl VisitOptions {
    /// Set the method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the structured payload.
    #[must_use]
    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Force a history replace.
    #[must_use]
    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Set the scroll preservation flag.
    #[must_use]
    pub fn preserve_scroll(mut self, preserve: impl Into<Preserve>) -> Self {
        self.preserve_scroll = preserve.into();
        self
    }

    /// Set the component-state preservation flag.
    #[must_use]
    pub fn preserve_state(mut self, preserve: impl Into<Preserve>) -> Self {
        self.preserve_state = preserve.into();
        self
    }

    /// Request a partial reload of the given prop keys.
    #[must_use]
    pub fn only(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.only = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Add one request header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Receive the visit-scoped cancel handle before `start` fires.
    #[must_use]
    pub fn on_cancel_token(mut self, callback: impl FnMut(CancelHandle) + 'static) -> Self {
        self.callbacks.on_cancel_token = Some(Box::new(callback));
        self
    }

    /// Inspect (and possibly veto, by returning `false`) the visit before
    /// any side effect.
    #[must_use]
    pub fn on_before(mut self, callback: impl FnMut(&VisitDescriptor) -> bool + 'static) -> Self {
        self.callbacks.on_before = Some(Box::new(callback));
        self
    }

    /// Called once the visit is installed as active.
    #[must_use]
    pub fn on_start(mut self, callback: impl FnMut(&VisitDescriptor) + 'static) -> Self {
        self.callbacks.on_start = Some(Box::new(callback));
        self
    }

    /// Upload progress updates.
    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(&TransferProgress) + 'static) -> Self {
        self.callbacks.on_progress = Some(Box::new(callback));
        self
    }

    /// Guaranteed cleanup hook; runs exactly once on every terminal path.
    #[must_use]
    pub fn on_finish(mut self, callback: impl FnMut(&FinishFlags) + 'static) -> Self {
        self.callbacks.on_finish = Some(Box::new(callback));
        self
    }

    /// Called when the visit is cancelled or interrupted.
    #[must_use]
    pub fn on_cancel(mut self, callback: impl FnMut() + 'static) -> Self {
        self.callbacks.on_cancel = Some(Box::new(callback));
        self
    }

    /// Called with the committed page after a successful exchange.
    #[must_use]
    pub fn on_success(mut self, callback: impl FnMut(&Page) + 'static) -> Self {
        self.callbacks.on_success = Some(Box::new(callback));
        self
    }
}

/// Non-error terminal classifications of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// Vetoed by `on_before` or a `before` listener; no side effects.
    Aborted,
    /// A page-state response was committed and `success` fired.
    Completed,
    /// A failure response carrying page state was committed (e.g. a
    /// version mismatch); no `success`.
    ErrorPage,
    /// A non-navigation failure response was surfaced through the
    /// `invalid` event / diagnostic display.
    Invalid,
    /// A 409 + location response triggered a hard browser redirect.
    LocationRedirect,
    /// Cancelled through the visit's cancel handle.
    Cancelled,
    /// Superseded by a newer visit.
    Interrupted,
    /// The transport failed but an `error` listener suppressed propagation.
    Errored,
}

/// Errors surfaced to the caller of [`Navigator::visit`](crate::Navigator::visit).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitError {
    /// The target href could not be resolved.
    #[error(transparent)]
    Target(#[from] LocationError),
    /// The response was not a usable page-state response.
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
    /// The transport failed with no response and no listener suppressed it.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Shared record of the active visit, owned jointly by the controller's
/// active slot and the visit's own future.
pub(crate) struct VisitShared {
    pub(crate) descriptor: VisitDescriptor,
    pub(crate) cancel: CancelSource,
    pub(crate) callbacks: RefCell<VisitCallbacks>,
    pub(crate) finished: Cell<bool>,
    pub(crate) cancelled: Cell<bool>,
    pub(crate) interrupted: Cell<bool>,
}

impl VisitShared {
    pub(crate) fn new(descriptor: VisitDescriptor, callbacks: VisitCallbacks) -> Rc<Self> {
        Rc::new(Self {
            descriptor,
            cancel: CancelSource::new(),
            callbacks: RefCell::new(callbacks),
            finished: Cell::new(false),
            cancelled: Cell::new(false),
            interrupted: Cell::new(false),
        })
    }
}

/// The controller's single active-visit slot entry.
pub(crate) struct ActiveVisit {
    pub(crate) token: VisitToken,
    pub(crate) shared: Rc<VisitShared>,
}
