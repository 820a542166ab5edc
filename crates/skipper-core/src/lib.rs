#![forbid(unsafe_code)]

//! Core vocabulary for the Skipper navigation engine.
//!
//! # Role in Skipper
//! `skipper-core` defines the data the engine moves around: the [`Page`]
//! that describes what is currently displayed, the transport vocabulary
//! (methods, responses, outcomes), the URL/query codec that splits visit
//! data between query string and request body, the wire-protocol markers
//! that distinguish a navigation exchange from ordinary traffic, and the
//! typed lifecycle event registry.
//!
//! # How it fits in the system
//! The runtime (`skipper-runtime`) consumes these types to drive visits and
//! commit pages. Host adapters and tests construct them directly. Nothing in
//! this crate performs I/O or owns mutable engine state apart from the event
//! registry's listener table.

pub mod events;
pub mod location;
pub mod page;
pub mod protocol;
pub mod request;
pub mod visit;

pub use events::{EmitOutcome, EventControl, EventKind, Events, ListenerId, NavEvent};
pub use page::{Page, ScrollPosition};
pub use request::{
    HttpResponse, Method, MethodParseError, TransferProgress, TransportError, TransportOutcome,
};
pub use visit::{FinishFlags, Preserve, VisitDescriptor};
