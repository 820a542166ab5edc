#![forbid(unsafe_code)]

//! History mirroring: push vs replace, popstate handling, remembered state.
//!
//! Run:
//!   cargo test -p skipper-runtime --test history_semantics

use pretty_assertions::assert_eq;
use serde_json::json;

use skipper_core::events::{EventControl, EventKind};
use skipper_core::Page;
use skipper_harness::{EventRecorder, TestHost, drive, page_response};
use skipper_runtime::host::HistoryAdapter as _;
use skipper_runtime::{Navigator, VisitOptions};

fn initialized(fixture: &TestHost) -> Navigator {
    let navigator = Navigator::new(fixture.host());
    drive(navigator.init(Page::new("Home", "/")));
    navigator
}

#[test]
fn committing_the_current_location_never_creates_an_entry() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    assert_eq!(fixture.history.entry_count(), 1);

    for _ in 0..3 {
        fixture
            .transport
            .enqueue_response(page_response(&Page::new("Home", "/")));
        drive(navigator.visit("/", VisitOptions::default())).unwrap();
        assert_eq!(fixture.history.entry_count(), 1);
    }
}

#[test]
fn replace_commits_do_not_fire_navigate() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    let recorder = EventRecorder::attach(&navigator);

    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Home", "/")));
    drive(navigator.visit("/", VisitOptions::default())).unwrap();

    let names = recorder.names();
    assert!(names.iter().any(|name| name == "success"));
    assert!(!names.iter().any(|name| name == "navigate"));
}

#[test]
fn explicit_replace_overwrites_the_top_entry() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);

    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Posts", "/posts")));
    drive(navigator.visit("/posts", VisitOptions::default())).unwrap();
    assert_eq!(fixture.history.entry_count(), 2);

    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Comments", "/comments")));
    drive(navigator.visit("/comments", VisitOptions::default().replace(true))).unwrap();

    assert_eq!(fixture.history.entry_count(), 2);
    assert_eq!(fixture.history.state().unwrap().component, "Comments");
}

#[test]
fn popstate_with_state_restores_without_writing_history() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);

    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Posts", "/posts")));
    drive(navigator.visit("/posts", VisitOptions::default())).unwrap();

    let recorder = EventRecorder::attach(&navigator);
    let state = fixture.history.back().unwrap();
    let entries_before = fixture.history.entries();
    drive(navigator.handle_history_pop(Some(state)));

    assert_eq!(navigator.page().unwrap().component, "Home");
    // History already moved; the engine must not write a new entry.
    assert_eq!(fixture.history.entries().len(), entries_before.len());
    assert_eq!(recorder.names(), vec!["navigate"]);
    // The restore swapped without preserving component state.
    assert!(!fixture.components.last_swap().unwrap().preserve_state);
}

#[test]
fn popstate_with_null_state_adopts_the_live_fragment() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    let recorder = EventRecorder::attach(&navigator);

    // Host hash-only change: the browser moved, the state is null.
    fixture.history.set_location("https://example.test/#section");
    drive(navigator.handle_history_pop(None));

    assert_eq!(
        navigator.page().unwrap().url,
        "https://example.test/#section"
    );
    // An in-place URL correction, not a navigation.
    assert!(!recorder.names().iter().any(|name| name == "navigate"));
    assert_eq!(fixture.history.entry_count(), 1);
}

#[test]
fn remember_persists_through_a_history_replace() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    let recorder = EventRecorder::attach(&navigator);

    navigator.remember("filter", json!("open"));

    assert_eq!(navigator.restore("filter"), Some(json!("open")));
    assert_eq!(navigator.restore("missing"), None);
    assert_eq!(fixture.history.entry_count(), 1);
    assert_eq!(
        fixture.history.state().unwrap().remembered_state["filter"],
        json!("open")
    );
    assert!(recorder.names().is_empty());
}

#[test]
fn restore_reads_the_host_state_not_the_in_memory_page() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);

    navigator.remember("draft", json!({ "body": "hello" }));

    // Wipe the host entry behind the engine's back; restore must reflect
    // the host state.
    fixture.history.replace(&Page::new("Home", "/"));
    assert_eq!(navigator.restore("draft"), None);
}

#[test]
fn listener_veto_on_before_blocks_history_writes() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);

    navigator.on(EventKind::Before, |_| EventControl::Veto);
    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));

    assert_eq!(outcome, Ok(skipper_runtime::VisitOutcome::Aborted));
    assert_eq!(fixture.history.entry_count(), 1);
    assert!(fixture.transport.requests().is_empty());
}
