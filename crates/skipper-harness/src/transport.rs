#![forbid(unsafe_code)]

//! Scripted transport.
//!
//! Replies are queued ahead of time, either as immediate outcomes or as
//! [`ReplyGate`]s the test resolves later (for interleaving visits). A call
//! with no scripted reply stays pending until its cancel token fires, which
//! is exactly what an interrupted visit needs. Every dispatched request is
//! recorded for assertions.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use futures::future::LocalBoxFuture;
use serde_json::{Map, Value};
use url::Url;

use skipper_core::{HttpResponse, Method, TransportOutcome};
use skipper_runtime::host::{ProgressSink, Transport, TransportRequest};

/// A dispatched request, minus the plumbing.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: Url,
    pub method: Method,
    pub body: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
}

impl RecordedRequest {
    /// Exact-name header lookup (the engine writes lowercase names).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

struct GateState {
    outcome: RefCell<Option<TransportOutcome>>,
    waker: RefCell<Option<Waker>>,
    progress: RefCell<Option<ProgressSink>>,
}

impl GateState {
    fn new() -> Rc<Self> {
        Rc::new(Self {
            outcome: RefCell::new(None),
            waker: RefCell::new(None),
            progress: RefCell::new(None),
        })
    }
}

/// Test-side handle for a gated reply.
pub struct ReplyGate {
    state: Rc<GateState>,
}

impl ReplyGate {
    /// Resolve the call with the given outcome, waking the visit.
    pub fn resolve(&self, outcome: TransportOutcome) {
        *self.state.outcome.borrow_mut() = Some(outcome);
        if let Some(waker) = self.state.waker.borrow_mut().take() {
            waker.wake();
        }
    }

    /// Shorthand for resolving with a response.
    pub fn respond(&self, response: HttpResponse) {
        self.resolve(TransportOutcome::Response(response));
    }

    /// Report upload progress through the in-flight request's sink.
    ///
    /// No-op until the call has actually been dispatched.
    pub fn report_progress(&self, loaded: u64, total: Option<u64>) {
        if let Some(sink) = self.state.progress.borrow().as_ref() {
            sink(loaded, total);
        }
    }
}

enum Reply {
    Now(TransportOutcome),
    Gated(Rc<GateState>),
}

/// Scripted [`Transport`] implementation.
#[derive(Default)]
pub struct MockTransport {
    script: RefCell<VecDeque<Reply>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an immediate outcome for the next call.
    pub fn enqueue(&self, outcome: TransportOutcome) {
        self.script.borrow_mut().push_back(Reply::Now(outcome));
    }

    /// Queue an immediate response for the next call.
    pub fn enqueue_response(&self, response: HttpResponse) {
        self.enqueue(TransportOutcome::Response(response));
    }

    /// Queue a gated reply; the call stays pending until the returned gate
    /// resolves it (or its cancel token fires).
    pub fn enqueue_pending(&self) -> ReplyGate {
        let state = GateState::new();
        self.script
            .borrow_mut()
            .push_back(Reply::Gated(Rc::clone(&state)));
        ReplyGate { state }
    }

    /// Every request dispatched so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.borrow().last().cloned()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: TransportRequest) -> LocalBoxFuture<'static, TransportOutcome> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: request.url.clone(),
            method: request.method,
            body: request.body.clone(),
            headers: request.headers.clone(),
        });

        let reply = self.script.borrow_mut().pop_front();
        match reply {
            Some(Reply::Now(outcome)) => Box::pin(async move { outcome }),
            Some(Reply::Gated(state)) => {
                *state.progress.borrow_mut() = Some(Rc::clone(&request.progress));
                Box::pin(GatedCall {
                    state,
                    cancelled: request.cancel.cancelled(),
                })
            }
            // Unscripted: hang until cancelled.
            None => Box::pin(GatedCall {
                state: GateState::new(),
                cancelled: request.cancel.cancelled(),
            }),
        }
    }
}

struct GatedCall {
    state: Rc<GateState>,
    cancelled: skipper_runtime::cancel::Cancelled,
}

impl Future for GatedCall {
    type Output = TransportOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(outcome) = this.state.outcome.borrow_mut().take() {
            return Poll::Ready(outcome);
        }
        if Pin::new(&mut this.cancelled).poll(cx).is_ready() {
            return Poll::Ready(TransportOutcome::Cancelled);
        }
        *this.state.waker.borrow_mut() = Some(cx.waker().clone());
        Poll::Pending
    }
}
