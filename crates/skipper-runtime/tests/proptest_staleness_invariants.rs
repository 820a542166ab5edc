#![forbid(unsafe_code)]

//! Property tests for single-flight and history invariants.
//!
//! Invariants:
//! 1. For any chain of visits where each next visit starts before the
//!    previous resolves, only the newest visit's payload is ever committed
//!    and every superseded visit concludes as interrupted
//! 2. Committing the current location any number of times never grows the
//!    history stack

use std::cell::RefCell;
use std::rc::Rc;

use futures::executor::LocalPool;
use futures::task::LocalSpawnExt as _;
use proptest::prelude::*;

use skipper_core::Page;
use skipper_harness::{TestHost, drive, page_response};
use skipper_runtime::{Navigator, VisitError, VisitOptions, VisitOutcome};

type VisitResult = Rc<RefCell<Option<Result<VisitOutcome, VisitError>>>>;

fn spawn_visit(pool: &LocalPool, navigator: &Navigator, target: String) -> VisitResult {
    let result: VisitResult = Rc::new(RefCell::new(None));
    let navigator = navigator.clone();
    let slot = Rc::clone(&result);
    pool.spawner()
        .spawn_local(async move {
            *slot.borrow_mut() = Some(navigator.visit(&target, VisitOptions::default()).await);
        })
        .unwrap();
    result
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn only_the_newest_visit_commits(chain_len in 1usize..6) {
        let fixture = TestHost::new("https://example.test/");
        let navigator = Navigator::new(fixture.host());
        drive(navigator.init(Page::new("Home", "/")));

        // Every visit but the last hangs until interrupted; the last
        // answers with its own page.
        for index in 0..chain_len {
            if index + 1 == chain_len {
                let page = Page::new(format!("Page{index}"), format!("/page/{index}"));
                fixture.transport.enqueue_response(page_response(&page));
            } else {
                let _gate = fixture.transport.enqueue_pending();
            }
        }

        let mut pool = LocalPool::new();
        let mut results = Vec::new();
        for index in 0..chain_len {
            results.push(spawn_visit(&pool, &navigator, format!("/page/{index}")));
            pool.run_until_stalled();
        }

        for (index, result) in results.iter().enumerate() {
            let outcome = result.borrow().clone();
            if index + 1 == chain_len {
                prop_assert_eq!(outcome, Some(Ok(VisitOutcome::Completed)));
            } else {
                prop_assert_eq!(outcome, Some(Ok(VisitOutcome::Interrupted)));
            }
        }

        let expected = format!("Page{}", chain_len - 1);
        prop_assert_eq!(navigator.page().unwrap().component, expected);
        // One entry from init, one push from the single committed visit.
        prop_assert_eq!(fixture.history.entry_count(), 2);
    }

    #[test]
    fn same_location_commits_never_grow_history(repeats in 1usize..8) {
        let fixture = TestHost::new("https://example.test/");
        let navigator = Navigator::new(fixture.host());
        drive(navigator.init(Page::new("Home", "/")));

        for _ in 0..repeats {
            fixture
                .transport
                .enqueue_response(page_response(&Page::new("Home", "/")));
            drive(navigator.visit("/", VisitOptions::default())).unwrap();
            prop_assert_eq!(fixture.history.entry_count(), 1);
        }
    }
}
