#![forbid(unsafe_code)]

//! The request shape of one visit and its commit-time flags.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value};
use url::Url;

use crate::page::Page;
use crate::request::Method;

/// The request shape of a single navigation attempt: what goes on the wire,
/// after the URL/query split. This is the payload carried by the `before`,
/// `start`, `cancel`, and `finish` events.
#[derive(Debug, Clone)]
pub struct VisitDescriptor {
    /// Fully resolved target, fragment included.
    pub url: Url,
    /// Normalized method.
    pub method: Method,
    /// Body data (empty for read-only methods; their data lives in the
    /// query string of `url`).
    pub data: Map<String, Value>,
    /// Prop keys for a partial reload; empty means a full page.
    pub only: Vec<String>,
    /// Caller-supplied extra headers.
    pub headers: BTreeMap<String, String>,
}

/// Tags on a visit's terminal `finish` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FinishFlags {
    /// The exchange ran to completion (any classification).
    pub completed: bool,
    /// The visit was cancelled through its cancel handle.
    pub cancelled: bool,
    /// The visit was superseded by a newer visit.
    pub interrupted: bool,
}

impl FinishFlags {
    /// Flags for a visit that ran to completion.
    #[must_use]
    pub const fn completed() -> Self {
        Self {
            completed: true,
            cancelled: false,
            interrupted: false,
        }
    }

    /// Flags for a visit that was cancelled or interrupted mid-flight.
    #[must_use]
    pub const fn aborted(cancelled: bool, interrupted: bool) -> Self {
        Self {
            completed: false,
            cancelled,
            interrupted,
        }
    }
}

/// A commit-time flag: preserve (scroll or component state) never, always,
/// or depending on the incoming page.
///
/// The resolver form is evaluated exactly once, synchronously, when the
/// page is committed.
#[derive(Clone, Default)]
pub enum Preserve {
    /// Do not preserve.
    #[default]
    Never,
    /// Always preserve.
    Always,
    /// Ask the resolver with the incoming page.
    When(Rc<dyn Fn(&Page) -> bool>),
}

impl Preserve {
    /// Resolve against the incoming page.
    #[must_use]
    pub fn resolve(&self, page: &Page) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::When(resolver) => resolver(page),
        }
    }

    /// The literal value, if this flag does not need a page to resolve.
    #[must_use]
    pub fn literal(&self) -> Option<bool> {
        match self {
            Self::Never => Some(false),
            Self::Always => Some(true),
            Self::When(_) => None,
        }
    }
}

impl From<bool> for Preserve {
    fn from(flag: bool) -> Self {
        if flag { Self::Always } else { Self::Never }
    }
}

impl fmt::Debug for Preserve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Never => f.write_str("Never"),
            Self::Always => f.write_str("Always"),
            Self::When(_) => f.write_str("When(..)"),
        }
    }
}
