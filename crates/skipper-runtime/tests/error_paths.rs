#![forbid(unsafe_code)]

//! Failure classification: protocol violations, error-page commits,
//! invalid responses, transport failures, and listener vetoes.
//!
//! Run:
//!   cargo test -p skipper-runtime --test error_paths

use pretty_assertions::assert_eq;

use skipper_core::events::{EventControl, EventKind};
use skipper_core::protocol::ProtocolViolation;
use skipper_core::{HttpResponse, Page, TransportError, TransportOutcome};
use skipper_harness::{EventRecorder, TestHost, drive, page_response};
use skipper_runtime::{Navigator, VisitError, VisitOptions, VisitOutcome};

fn initialized(fixture: &TestHost) -> Navigator {
    let navigator = Navigator::new(fixture.host());
    drive(navigator.init(Page::new("Home", "/")));
    navigator
}

#[test]
fn on_before_false_abandons_with_no_side_effects() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    let recorder = EventRecorder::attach(&navigator);

    let outcome = drive(navigator.visit(
        "/posts",
        VisitOptions::default().on_before(|_| false),
    ));

    assert_eq!(outcome, Ok(VisitOutcome::Aborted));
    assert!(fixture.transport.requests().is_empty());
    // Not even the before event fires when the callback said no.
    assert!(recorder.names().is_empty());
}

#[test]
fn before_listener_veto_abandons_after_the_event() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    navigator.on(EventKind::Before, |_| EventControl::Veto);
    let recorder = EventRecorder::attach(&navigator);

    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));

    assert_eq!(outcome, Ok(VisitOutcome::Aborted));
    assert_eq!(recorder.names(), vec!["before"]);
    assert!(fixture.transport.requests().is_empty());
}

#[test]
fn success_response_without_marker_is_a_protocol_violation() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    let recorder = EventRecorder::attach(&navigator);

    fixture
        .transport
        .enqueue_response(HttpResponse::new(200).with_body("<!doctype html>"));

    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));

    assert_eq!(
        outcome,
        Err(VisitError::Protocol(ProtocolViolation::MissingMarker {
            status: 200
        }))
    );
    // finish still fires; invalid/error do not, and nothing was shown.
    assert_eq!(
        recorder.names(),
        vec![
            "before",
            "start",
            "finish(completed=true,cancelled=false,interrupted=false)",
        ]
    );
    assert!(fixture.display.shown().is_empty());
    assert_eq!(navigator.page().unwrap().component, "Home");
}

#[test]
fn unparsable_page_payload_is_a_protocol_violation() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);

    fixture.transport.enqueue_response(
        HttpResponse::new(200)
            .with_header("x-inertia", "true")
            .with_body("not json"),
    );

    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));
    assert!(matches!(
        outcome,
        Err(VisitError::Protocol(ProtocolViolation::InvalidPayload { .. }))
    ));
}

#[test]
fn failure_response_with_marker_commits_as_an_error_page() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    let recorder = EventRecorder::attach(&navigator);

    let error_page = Page::new("ServerError", "/error");
    let body = serde_json::to_string(&error_page).unwrap();
    fixture.transport.enqueue_response(
        HttpResponse::new(500)
            .with_header("x-inertia", "true")
            .with_body(body),
    );

    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));

    assert_eq!(outcome, Ok(VisitOutcome::ErrorPage));
    assert_eq!(navigator.page().unwrap().component, "ServerError");
    // Committed without the success path.
    let names = recorder.names();
    assert!(!names.iter().any(|name| name == "success"));
    assert!(names.iter().any(|name| name == "navigate"));
    assert!(names.iter().any(|name| name.starts_with("finish(completed=true")));
}

#[test]
fn markerless_failure_is_surfaced_through_invalid_and_the_display() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    let recorder = EventRecorder::attach(&navigator);

    fixture
        .transport
        .enqueue_response(HttpResponse::new(500).with_body("<h1>boom</h1>"));

    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));

    assert_eq!(outcome, Ok(VisitOutcome::Invalid));
    assert_eq!(
        recorder.names(),
        vec![
            "before",
            "start",
            "invalid",
            "finish(completed=true,cancelled=false,interrupted=false)",
        ]
    );
    let shown = fixture.display.shown();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].body, "<h1>boom</h1>");
}

#[test]
fn invalid_veto_suppresses_the_display() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    navigator.on(EventKind::Invalid, |_| EventControl::Veto);

    fixture
        .transport
        .enqueue_response(HttpResponse::new(500).with_body("<h1>boom</h1>"));

    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));

    assert_eq!(outcome, Ok(VisitOutcome::Invalid));
    assert!(fixture.display.shown().is_empty());
}

#[test]
fn transport_failure_propagates_to_the_caller() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    let recorder = EventRecorder::attach(&navigator);

    fixture
        .transport
        .enqueue(TransportOutcome::Failed(TransportError::new("offline")));

    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));

    assert_eq!(
        outcome,
        Err(VisitError::Transport(TransportError::new("offline")))
    );
    assert_eq!(
        recorder.names(),
        vec![
            "before",
            "start",
            "error",
            "finish(completed=true,cancelled=false,interrupted=false)",
        ]
    );
}

#[test]
fn error_veto_suppresses_propagation() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);
    navigator.on(EventKind::Error, |_| EventControl::Veto);

    fixture
        .transport
        .enqueue(TransportOutcome::Failed(TransportError::new("offline")));

    let outcome = drive(navigator.visit("/posts", VisitOptions::default()));
    assert_eq!(outcome, Ok(VisitOutcome::Errored));
}

#[test]
fn on_finish_runs_on_every_terminal_path() {
    let fixture = TestHost::new("https://example.test/");
    let navigator = initialized(&fixture);

    let finishes = std::rc::Rc::new(std::cell::Cell::new(0));

    fixture
        .transport
        .enqueue_response(page_response(&Page::new("Posts", "/posts")));
    fixture
        .transport
        .enqueue_response(HttpResponse::new(500).with_body("boom"));
    fixture
        .transport
        .enqueue(TransportOutcome::Failed(TransportError::new("offline")));

    for _ in 0..3 {
        let counter = std::rc::Rc::clone(&finishes);
        let _ = drive(navigator.visit(
            "/posts",
            VisitOptions::default().on_finish(move |flags| {
                assert!(flags.completed);
                counter.set(counter.get() + 1);
            }),
        ));
    }

    assert_eq!(finishes.get(), 3);
}
