#![forbid(unsafe_code)]

//! Cooperative cancellation for in-flight transport calls.
//!
//! [`CancelSource`] is the control side, owned by the engine's active-visit
//! slot; [`CancelToken`] is the observer side, handed to the transport
//! inside each request. Cancelling only signals the network layer; the
//! visit's continuation still runs and is voided by the staleness check
//! before it can touch shared state.
//!
//! The engine is single-threaded, so the pair is `Rc`-based rather than
//! atomic. Tokens are awaitable: a pending transport future can poll
//! [`CancelToken::cancelled`] alongside its own completion.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

struct CancelInner {
    cancelled: Cell<bool>,
    wakers: RefCell<Vec<Waker>>,
}

/// The control handle that triggers cancellation.
///
/// Dropping the source does **not** cancel the token; call
/// [`cancel`](Self::cancel) explicitly.
pub struct CancelSource {
    inner: Rc<CancelInner>,
}

/// A cloneable token observing one source's state.
#[derive(Clone)]
pub struct CancelToken {
    inner: Rc<CancelInner>,
}

impl CancelSource {
    /// Create a new source with an uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(CancelInner {
                cancelled: Cell::new(false),
                wakers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Obtain a token that observes this source.
    #[must_use]
    pub fn token(&self) -> CancelToken {
        CancelToken {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Signal cancellation and wake any pending waiters. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.set(true);
        for waker in self.inner.wakers.borrow_mut().drain(..) {
            waker.wake();
        }
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.get()
    }

    /// A future that resolves once cancellation is requested.
    #[must_use]
    pub fn cancelled(&self) -> Cancelled {
        Cancelled {
            token: self.clone(),
        }
    }
}

/// Future side of a [`CancelToken`]; resolves when the token is cancelled.
pub struct Cancelled {
    token: CancelToken,
}

impl Future for Cancelled {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.token.inner.cancelled.get() {
            return Poll::Ready(());
        }
        let mut wakers = self.token.inner.wakers.borrow_mut();
        if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
            wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
