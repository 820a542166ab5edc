#![forbid(unsafe_code)]

//! Scroll state: capture, reset, restore, and the debounce window.
//!
//! Run:
//!   cargo test -p skipper-runtime --test scroll_state

use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;

use skipper_core::{Page, ScrollPosition};
use skipper_harness::{TestHost, drive, page_response};
use skipper_runtime::{Navigator, NavigatorConfig, VisitOptions};

#[test]
fn scroll_round_trip_across_back_navigation() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = Navigator::new(fixture.host());
    drive(navigator.init(Page::new("Home", "/")));

    // The user scrolls region 0; region 1 stays put.
    fixture.scroll.scroll_region(0, ScrollPosition::new(10.0, 0.0));

    // Navigating away captures eagerly and then resets for the new page.
    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Posts", "/posts")));
    drive(navigator.visit("/posts", VisitOptions::default())).unwrap();
    assert_eq!(fixture.scroll.region(0), ScrollPosition::zero());

    // Going back restores the captured offsets by index.
    let state = fixture.history.back().unwrap();
    assert_eq!(
        state.scroll_regions,
        vec![ScrollPosition::new(10.0, 0.0), ScrollPosition::zero()]
    );
    drive(navigator.handle_history_pop(Some(state)));

    assert_eq!(fixture.scroll.region(0), ScrollPosition::new(10.0, 0.0));
    assert_eq!(fixture.scroll.region(1), ScrollPosition::zero());
}

#[test]
fn debounced_capture_admits_after_the_window() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = Navigator::with_config(
        fixture.host(),
        NavigatorConfig::default().with_scroll_debounce(Duration::from_millis(50)),
    );
    drive(navigator.init(Page::new("Home", "/")));

    // init's scroll reset just captured; wait out the window.
    thread::sleep(Duration::from_millis(60));

    fixture.scroll.scroll_region(0, ScrollPosition::new(42.0, 7.0));
    navigator.handle_region_scroll();

    assert_eq!(
        navigator.page().unwrap().scroll_regions[0],
        ScrollPosition::new(42.0, 7.0)
    );
}

#[test]
fn burst_of_scroll_events_is_coalesced() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = Navigator::with_config(
        fixture.host(),
        NavigatorConfig::default().with_scroll_debounce(Duration::from_secs(3600)),
    );
    drive(navigator.init(Page::new("Home", "/")));

    // The window is still closed from init's capture, so the burst is
    // absorbed.
    fixture.scroll.scroll_region(0, ScrollPosition::new(5.0, 0.0));
    navigator.handle_region_scroll();
    fixture.scroll.scroll_region(0, ScrollPosition::new(9.0, 0.0));
    navigator.handle_region_scroll();

    assert_eq!(
        navigator.page().unwrap().scroll_regions[0],
        ScrollPosition::zero()
    );

    // The eager pre-visit capture still picks up the latest offsets.
    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Posts", "/posts")));
    drive(navigator.visit("/posts", VisitOptions::default())).unwrap();

    let home = fixture.history.back().unwrap();
    assert_eq!(home.scroll_regions[0], ScrollPosition::new(9.0, 0.0));
}

#[test]
fn commit_resets_document_and_regions_unless_preserved() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = Navigator::new(fixture.host());
    drive(navigator.init(Page::new("Home", "/")));

    fixture.scroll.scroll_document(ScrollPosition::new(100.0, 0.0));
    fixture.scroll.scroll_region(1, ScrollPosition::new(33.0, 0.0));

    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Posts", "/posts")));
    drive(navigator.visit("/posts", VisitOptions::default())).unwrap();

    assert_eq!(fixture.scroll.document(), ScrollPosition::zero());
    assert_eq!(fixture.scroll.region(1), ScrollPosition::zero());
}

#[test]
fn preserve_scroll_keeps_offsets_across_the_commit() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = Navigator::new(fixture.host());
    drive(navigator.init(Page::new("Home", "/")));

    fixture.scroll.scroll_region(0, ScrollPosition::new(77.0, 0.0));

    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Posts", "/posts")));
    drive(navigator.visit("/posts", VisitOptions::default().preserve_scroll(true))).unwrap();

    assert_eq!(fixture.scroll.region(0), ScrollPosition::new(77.0, 0.0));
}

#[test]
fn reset_scrolls_the_fragment_target_into_view() {
    let fixture = TestHost::new("https://example.test/posts#comments");
    let navigator = Navigator::new(fixture.host());
    drive(navigator.init(Page::new("Posts", "/posts")));

    // init attaches the live fragment and the post-commit reset brings the
    // fragment's element into view.
    assert_eq!(navigator.page().unwrap().url, "/posts#comments");
    assert_eq!(fixture.scroll.scrolled_into_view(), vec!["comments"]);
}
