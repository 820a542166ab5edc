#![forbid(unsafe_code)]

//! Ordered lifecycle event log.

use std::cell::RefCell;
use std::rc::Rc;

use skipper_core::events::{EventControl, EventKind, NavEvent};
use skipper_runtime::Navigator;

/// Subscribes to every event kind on a navigator and records labels in
/// dispatch order. `finish` labels carry their flags so tests can assert
/// the exact terminal tagging.
pub struct EventRecorder {
    log: Rc<RefCell<Vec<String>>>,
}

impl EventRecorder {
    /// Attach a recorder to every event kind.
    #[must_use]
    pub fn attach(navigator: &Navigator) -> Self {
        let log = Rc::new(RefCell::new(Vec::new()));
        for kind in EventKind::ALL {
            let log = Rc::clone(&log);
            navigator.on(kind, move |event| {
                log.borrow_mut().push(label(event));
                EventControl::Proceed
            });
        }
        Self { log }
    }

    /// Labels recorded so far, in order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }
}

fn label(event: NavEvent<'_>) -> String {
    match event {
        NavEvent::Finish { flags, .. } => format!(
            "finish(completed={},cancelled={},interrupted={})",
            flags.completed, flags.cancelled, flags.interrupted
        ),
        other => other.kind().name().to_string(),
    }
}
