#![forbid(unsafe_code)]

//! Recording component adapter.
//!
//! Resolution yields the component name itself as the renderable unit;
//! swaps are recorded in order with the page and flags they carried.

use std::cell::RefCell;

use futures::future::LocalBoxFuture;

use skipper_core::Page;
use skipper_runtime::host::{ComponentAdapter, Renderable, SwapRequest};

/// One recorded render swap.
#[derive(Debug, Clone)]
pub struct SwapRecord {
    /// The resolved component name.
    pub component: String,
    /// The page committed with the swap.
    pub page: Page,
    /// Whether component-local state was preserved.
    pub preserve_state: bool,
}

/// Recording [`ComponentAdapter`] implementation.
#[derive(Default)]
pub struct MockComponents {
    resolved: RefCell<Vec<String>>,
    swaps: RefCell<Vec<SwapRecord>>,
}

impl MockComponents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Component names resolved so far, in order.
    #[must_use]
    pub fn resolved(&self) -> Vec<String> {
        self.resolved.borrow().clone()
    }

    /// Render swaps performed so far, in order.
    #[must_use]
    pub fn swaps(&self) -> Vec<SwapRecord> {
        self.swaps.borrow().clone()
    }

    /// The most recent swap.
    #[must_use]
    pub fn last_swap(&self) -> Option<SwapRecord> {
        self.swaps.borrow().last().cloned()
    }
}

impl ComponentAdapter for MockComponents {
    fn resolve(&self, component: &str) -> LocalBoxFuture<'static, Renderable> {
        self.resolved.borrow_mut().push(component.to_string());
        let component = component.to_string();
        Box::pin(async move { Box::new(component) as Renderable })
    }

    fn swap(&self, request: SwapRequest) -> LocalBoxFuture<'static, ()> {
        let component = request
            .renderable
            .downcast::<String>()
            .map(|name| *name)
            .unwrap_or_default();
        self.swaps.borrow_mut().push(SwapRecord {
            component,
            page: request.page,
            preserve_state: request.preserve_state,
        });
        Box::pin(async {})
    }
}
