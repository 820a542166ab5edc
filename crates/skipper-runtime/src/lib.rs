#![forbid(unsafe_code)]

//! Skipper Runtime
//!
//! This crate is the orchestrator: it turns a navigation intent (URL +
//! method + payload) into exactly one in-flight exchange, classifies the
//! server's reply, and commits the result into a versioned, history-backed
//! page store while firing the typed lifecycle event sequence defined in
//! `skipper-core`.
//!
//! # Key components
//!
//! - [`Navigator`] - the visit controller; owns the single active-visit slot
//! - [`Host`] - the bundle of collaborator traits the engine drives
//!   ([`Transport`], [`ComponentAdapter`], [`HistoryAdapter`],
//!   [`SessionStore`], [`ScrollDom`], [`ErrorDisplay`])
//! - [`VisitOptions`] - per-visit flags and lifecycle callbacks
//! - [`CancelSource`]/[`CancelToken`] - cooperative cancellation handed to
//!   the transport per request
//!
//! # Concurrency model
//!
//! Single-threaded and cooperative: suspension happens at the transport
//! call, at component resolution, and at the render swap. Cancelling a
//! visit only stops the network layer; late continuations are voided by a
//! staleness token before they can touch the page store.

pub mod cancel;
pub mod config;
pub mod host;
pub mod navigator;
pub mod scroll;
pub mod store;
pub mod visit;

pub use cancel::{CancelSource, CancelToken};
pub use config::NavigatorConfig;
pub use host::{
    ComponentAdapter, ErrorDisplay, HistoryAdapter, Host, LoadKind, LoggedErrorDisplay,
    ProgressSink, Renderable, ScrollDom, SessionStore, SwapRequest, Transport, TransportRequest,
};
pub use navigator::{CancelHandle, DEFAULT_REMEMBER_KEY, Navigator};
pub use visit::{VisitCallbacks, VisitError, VisitOptions, VisitOutcome};
