#![forbid(unsafe_code)]

//! In-memory session-history stack.
//!
//! Entries behave like a browser history: a push discards any forward
//! entries, a replace overwrites the entry at the current index, and the
//! test-side [`back`](MemoryHistory::back)/[`forward`](MemoryHistory::forward)
//! helpers move the index and hand back the state the host would deliver
//! with its popstate signal. Hard navigations (`assign`) and reloads are
//! recorded, not performed.

use std::cell::{Cell, RefCell};

use url::Url;

use skipper_core::Page;
use skipper_runtime::host::{HistoryAdapter, LoadKind};

/// In-memory [`HistoryAdapter`] implementation.
pub struct MemoryHistory {
    entries: RefCell<Vec<Page>>,
    index: Cell<usize>,
    location: RefCell<Url>,
    load_kind: Cell<LoadKind>,
    assigned: RefCell<Vec<Url>>,
    reloads: Cell<u32>,
}

impl MemoryHistory {
    /// A history whose document currently sits at `location`.
    ///
    /// # Panics
    ///
    /// Panics when `location` is not an absolute URL.
    #[must_use]
    pub fn new(location: &str) -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            index: Cell::new(0),
            location: RefCell::new(Url::parse(location).expect("absolute location URL")),
            load_kind: Cell::new(LoadKind::Navigate),
            assigned: RefCell::new(Vec::new()),
            reloads: Cell::new(0),
        }
    }

    /// Override what navigation timing reports for the current load.
    pub fn set_load_kind(&self, kind: LoadKind) {
        self.load_kind.set(kind);
    }

    /// Move the document location without touching entries.
    pub fn set_location(&self, location: &str) {
        *self.location.borrow_mut() = Url::parse(location).expect("absolute location URL");
    }

    /// Seed a pre-existing history entry (state present before `init`).
    pub fn seed_entry(&self, page: Page) {
        let mut entries = self.entries.borrow_mut();
        entries.push(page);
        self.index.set(entries.len() - 1);
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Page> {
        self.entries.borrow().clone()
    }

    /// Number of entries in the stack.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Traverse one entry back, returning the state the host would deliver.
    pub fn back(&self) -> Option<Page> {
        if self.index.get() == 0 {
            return None;
        }
        self.index.set(self.index.get() - 1);
        let page = self.entries.borrow().get(self.index.get()).cloned()?;
        self.move_location_to(&page.url);
        Some(page)
    }

    /// Traverse one entry forward, returning the state the host would
    /// deliver.
    pub fn forward(&self) -> Option<Page> {
        if self.index.get() + 1 >= self.entries.borrow().len() {
            return None;
        }
        self.index.set(self.index.get() + 1);
        let page = self.entries.borrow().get(self.index.get()).cloned()?;
        self.move_location_to(&page.url);
        Some(page)
    }

    /// Hard navigations requested so far.
    #[must_use]
    pub fn assigned(&self) -> Vec<Url> {
        self.assigned.borrow().clone()
    }

    /// Forced reloads requested so far.
    #[must_use]
    pub fn reload_count(&self) -> u32 {
        self.reloads.get()
    }

    fn move_location_to(&self, href: &str) {
        let resolved = self.location.borrow().join(href);
        if let Ok(url) = resolved {
            *self.location.borrow_mut() = url;
        }
    }
}

impl HistoryAdapter for MemoryHistory {
    fn push(&self, page: &Page) {
        {
            let mut entries = self.entries.borrow_mut();
            if !entries.is_empty() {
                entries.truncate(self.index.get() + 1);
            }
            entries.push(page.clone());
            self.index.set(entries.len() - 1);
        }
        self.move_location_to(&page.url);
    }

    fn replace(&self, page: &Page) {
        {
            let mut entries = self.entries.borrow_mut();
            if entries.is_empty() {
                entries.push(page.clone());
                self.index.set(0);
            } else {
                let index = self.index.get();
                entries[index] = page.clone();
            }
        }
        self.move_location_to(&page.url);
    }

    fn state(&self) -> Option<Page> {
        self.entries.borrow().get(self.index.get()).cloned()
    }

    fn location(&self) -> Url {
        self.location.borrow().clone()
    }

    fn load_kind(&self) -> LoadKind {
        self.load_kind.get()
    }

    fn assign(&self, url: &Url) {
        self.assigned.borrow_mut().push(url.clone());
    }

    fn reload(&self) {
        self.reloads.set(self.reloads.get() + 1);
    }
}
