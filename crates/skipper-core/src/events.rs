#![forbid(unsafe_code)]

//! Typed lifecycle event registry.
//!
//! Listeners subscribe to one [`EventKind`] and receive the matching
//! [`NavEvent`] payload. A listener's return value is its cancellation
//! vote: [`EventControl::Veto`] prevents the default action for cancellable
//! kinds (`before` vetoes the visit, `invalid` vetoes the diagnostic
//! display, `error` vetoes propagation to the caller). `navigate` is not
//! cancellable; a veto there is ignored.
//!
//! # Dispatch
//!
//! Listeners run in subscription order. The registry snapshots the listener
//! list before dispatching, so a listener may subscribe, unsubscribe, or
//! start a visit reentrantly without corrupting the walk. A listener that
//! re-enters itself (by emitting the kind it is handling) is skipped for
//! the nested emission.

use std::cell::RefCell;
use std::rc::Rc;

use crate::page::Page;
use crate::request::{HttpResponse, TransferProgress, TransportError};
use crate::visit::{FinishFlags, VisitDescriptor};

/// The closed set of lifecycle event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A visit is about to start; veto abandons it.
    Before,
    /// A visit was installed as the active visit.
    Start,
    /// Upload progress for the active visit.
    Progress,
    /// A page was committed from a successful response.
    Success,
    /// A non-navigation failure response arrived; veto suppresses the
    /// diagnostic display.
    Invalid,
    /// The transport failed with no response; veto suppresses propagation
    /// to the caller.
    Error,
    /// A visit was cancelled or interrupted.
    Cancel,
    /// A visit reached its terminal outcome. Always the last visit-scoped
    /// event.
    Finish,
    /// A new page became current (not fired for in-place replacements).
    Navigate,
}

impl EventKind {
    /// Stable lowercase name, useful for logs and test assertions.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::Start => "start",
            Self::Progress => "progress",
            Self::Success => "success",
            Self::Invalid => "invalid",
            Self::Error => "error",
            Self::Cancel => "cancel",
            Self::Finish => "finish",
            Self::Navigate => "navigate",
        }
    }

    /// Whether a listener veto has any effect for this kind.
    #[must_use]
    pub const fn cancellable(self) -> bool {
        !matches!(self, Self::Navigate)
    }

    /// Every kind, in lifecycle order.
    pub const ALL: [Self; 9] = [
        Self::Before,
        Self::Start,
        Self::Progress,
        Self::Success,
        Self::Invalid,
        Self::Error,
        Self::Cancel,
        Self::Finish,
        Self::Navigate,
    ];
}

/// A lifecycle event with its payload.
#[derive(Debug, Clone, Copy)]
pub enum NavEvent<'e> {
    /// See [`EventKind::Before`].
    Before(&'e VisitDescriptor),
    /// See [`EventKind::Start`].
    Start(&'e VisitDescriptor),
    /// See [`EventKind::Progress`].
    Progress(&'e TransferProgress),
    /// See [`EventKind::Success`].
    Success(&'e Page),
    /// See [`EventKind::Invalid`].
    Invalid(&'e HttpResponse),
    /// See [`EventKind::Error`].
    Error(&'e TransportError),
    /// See [`EventKind::Cancel`].
    Cancel(&'e VisitDescriptor),
    /// See [`EventKind::Finish`].
    Finish {
        /// The visit that finished.
        visit: &'e VisitDescriptor,
        /// Terminal tags.
        flags: FinishFlags,
    },
    /// See [`EventKind::Navigate`].
    Navigate(&'e Page),
}

impl NavEvent<'_> {
    /// The kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Before(_) => EventKind::Before,
            Self::Start(_) => EventKind::Start,
            Self::Progress(_) => EventKind::Progress,
            Self::Success(_) => EventKind::Success,
            Self::Invalid(_) => EventKind::Invalid,
            Self::Error(_) => EventKind::Error,
            Self::Cancel(_) => EventKind::Cancel,
            Self::Finish { .. } => EventKind::Finish,
            Self::Navigate(_) => EventKind::Navigate,
        }
    }
}

/// A listener's vote on the event's default action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventControl {
    /// Let the default action happen.
    Proceed,
    /// Prevent the default action (only honored for cancellable kinds).
    Veto,
}

/// Handle for unsubscribing a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Result of one emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOutcome {
    vetoed: bool,
}

impl EmitOutcome {
    /// Whether a listener vetoed the default action.
    #[must_use]
    pub const fn vetoed(self) -> bool {
        self.vetoed
    }
}

type Listener = Rc<RefCell<dyn FnMut(NavEvent<'_>) -> EventControl>>;

struct Entry {
    id: ListenerId,
    kind: EventKind,
    listener: Listener,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

/// The process-local publish/subscribe registry. Cheap to clone; clones
/// share one listener table.
#[derive(Clone, Default)]
pub struct Events {
    registry: Rc<RefCell<Registry>>,
}

impl Events {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a listener to one event kind. Returns the unsubscribe
    /// handle.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: FnMut(NavEvent<'_>) -> EventControl + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = ListenerId(registry.next_id);
        registry.entries.push(Entry {
            id,
            kind,
            listener: Rc::new(RefCell::new(listener)),
        });
        id
    }

    /// Remove a listener. Returns whether it was still subscribed.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.entries.len();
        registry.entries.retain(|entry| entry.id != id);
        registry.entries.len() != before
    }

    /// Dispatch an event to its kind's listeners, in subscription order.
    pub fn emit(&self, event: NavEvent<'_>) -> EmitOutcome {
        let kind = event.kind();
        let targets: Vec<Listener> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| Rc::clone(&entry.listener))
            .collect();

        let mut vetoed = false;
        for target in targets {
            // A listener emitting its own kind would find itself borrowed;
            // skip it for the nested emission instead of panicking.
            if let Ok(mut listener) = target.try_borrow_mut() {
                if (*listener)(event) == EventControl::Veto {
                    vetoed = true;
                }
            }
        }

        let vetoed = vetoed && kind.cancellable();
        tracing::trace!(event = kind.name(), vetoed, "event dispatched");
        EmitOutcome { vetoed }
    }
}
