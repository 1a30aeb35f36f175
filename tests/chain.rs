//! End-to-end tests for the request trace chain, driven through the public
//! gateway API with a recording backend standing in for the tracer.

use std::sync::Arc;
use std::sync::Once;

use tracelink::testing::{FinishDisposition, RecordedKind, RecordingBackend};
use tracelink::{Carrier, Error, ErrorKind, SpanOutcome, TraceGateway, span_names};

fn init_diagnostics() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn gateway_over(backend: &RecordingBackend, use_trace: bool) -> TraceGateway {
    init_diagnostics();
    TraceGateway::new(use_trace, Arc::new(backend.clone()))
}

#[test]
fn chain_order_matches_creation_order() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);
    let root = gateway.trace_operation([("x-request-id", "req-1")], true);

    for name in ["downstream.a", "downstream.b", "downstream.c"] {
        root.create_child(&Carrier::new(), name, false);
    }

    let starts = backend.starts();
    let started: Vec<&str> = starts[1..]
        .iter()
        .map(|start| start.name.as_str())
        .collect();
    assert_eq!(started, ["downstream.a", "downstream.b", "downstream.c"]);
    assert_eq!(root.open_children(), 3);
}

#[test]
fn whole_chain_teardown_is_depth_first() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);
    let root = gateway.trace_operation([("x-request-id", "req-2")], true);

    for name in ["downstream.a", "downstream.b", "downstream.c"] {
        root.create_child(&Carrier::new(), name, false);
    }
    root.end_trace(&SpanOutcome::new().with_attribute("http.status_code", 200))
        .unwrap();

    assert_eq!(
        backend.finished_names(),
        [
            "downstream.c",
            "downstream.b",
            "downstream.a",
            span_names::UPSTREAM_SERVER,
        ]
    );
    // The root span is the server span; everything else is a client span.
    let finishes = backend.finishes();
    assert_eq!(finishes.last().map(|record| record.kind), Some(RecordedKind::Server));
    assert!(finishes.iter().all(|record| record.in_scope));
}

#[test]
fn oldest_child_splices_first() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);
    let root = gateway.trace_operation([("x-request-id", "req-3")], true);

    for name in ["downstream.a", "downstream.b", "downstream.c"] {
        root.create_child(&Carrier::new(), name, false);
    }

    root.end_latest_trace(&SpanOutcome::new()).unwrap();
    root.end_latest_trace(&SpanOutcome::new()).unwrap();
    root.end_latest_trace(&SpanOutcome::new()).unwrap();
    root.end_latest_trace(&SpanOutcome::new()).unwrap();

    assert_eq!(
        backend.finished_names(),
        ["downstream.a", "downstream.b", "downstream.c"]
    );
    assert_eq!(root.open_children(), 0);
    // The root itself stays open for its own end_trace.
    assert!(root.is_open());
}

#[test]
fn empty_chain_completions_are_idempotent() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);
    let root = gateway.trace_operation([("x-request-id", "req-4")], true);
    let cause = Error::new(ErrorKind::Unknown, "never sent");

    root.end_latest_trace(&SpanOutcome::new()).unwrap();
    root.exception_latest_trace(&cause, &[]).unwrap();

    assert_eq!(backend.finish_count(), 0);
    assert!(root.is_open());
}

#[test]
fn disabled_gateway_suppresses_every_finish() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, false);
    let root = gateway.trace_operation([("x-request-id", "req-5")], true);
    for name in ["downstream.a", "downstream.b"] {
        root.create_child(&Carrier::new(), name, true);
    }
    let cause = Error::new(ErrorKind::Unknown, "boom");

    root.end_trace(&SpanOutcome::new()).unwrap();
    root.exception_trace(&cause, &[]).unwrap();

    // Spans were created (creation is unconditional) but never finished.
    assert_eq!(backend.starts().len(), 3);
    assert_eq!(backend.finish_count(), 0);
}

#[test]
fn carrier_excludes_content_headers() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);

    gateway.trace_operation(
        [
            ("content-type", "application/json"),
            ("Accept-Encoding", "gzip"),
            ("content-length", "128"),
            ("x-tenant", "acme"),
            ("traceparent", "00-aa-bb-01"),
        ],
        true,
    );

    let carrier = &backend.starts()[0].carrier;
    assert_eq!(carrier.len(), 2);
    assert_eq!(carrier.get("x-tenant"), Some("acme"));
    assert_eq!(carrier.get("traceparent"), Some("00-aa-bb-01"));
}

/// Three downstream calls A, B, C; B's response arrives first. The "latest"
/// family is positional, so it finishes A regardless. Finishing B on its
/// arrival takes B's own handle.
#[test]
fn out_of_order_completion_scenario() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);
    let root = gateway.trace_operation([("x-request-id", "req-6")], true);

    let _a = root.create_child(&Carrier::new(), "downstream.a", true);
    let b = root.create_child(&Carrier::new(), "downstream.b", true);
    let _c = root.create_child(&Carrier::new(), "downstream.c", true);

    // B completed first, but the positional splice finishes A.
    root.end_latest_trace(&SpanOutcome::new()).unwrap();
    assert_eq!(backend.finished_names(), ["downstream.a"]);

    // To actually finish B, use B's handle.
    b.end_trace(&SpanOutcome::new()).unwrap();
    assert_eq!(backend.finished_names(), ["downstream.a", "downstream.b"]);
    assert_eq!(root.open_children(), 1);

    root.end_trace(&SpanOutcome::new()).unwrap();
    assert_eq!(
        backend.finished_names(),
        [
            "downstream.a",
            "downstream.b",
            "downstream.c",
            span_names::UPSTREAM_SERVER,
        ]
    );
}

#[test]
fn async_completion_from_another_thread() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);
    let root = gateway.trace_operation([("x-request-id", "req-7")], true);

    let call = root.create_child(&Carrier::new(), "downstream.async", true);
    let worker = std::thread::spawn(move || call.end_trace(&SpanOutcome::new()));
    worker.join().unwrap().unwrap();

    assert_eq!(backend.finished_names(), ["downstream.async"]);
    assert_eq!(root.open_children(), 0);

    root.end_trace(&SpanOutcome::new()).unwrap();
    assert_eq!(backend.finish_count(), 2);
}

#[test]
fn exception_teardown_records_the_error_everywhere() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);
    let root = gateway.trace_operation([("x-request-id", "req-8")], true);
    root.create_child(&Carrier::new(), "downstream.a", false);
    let cause = Error::new(ErrorKind::Unknown, "upstream 503");

    root.exception_trace(&cause, &[("peer".to_owned(), "origin".into())])
        .unwrap();

    let finishes = backend.finishes();
    assert_eq!(finishes.len(), 2);
    for record in &finishes {
        assert_eq!(
            record.disposition,
            FinishDisposition::Errored("upstream 503".to_owned())
        );
    }
}

#[test]
fn backend_failure_propagates_out_of_end_trace() {
    let backend = RecordingBackend::new();
    let gateway = gateway_over(&backend, true);
    let root = gateway.trace_operation([("x-request-id", "req-9")], true);
    root.create_child(&Carrier::new(), "downstream.a", false);

    backend.fail_finishes(true);
    let err = root.end_trace(&SpanOutcome::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Export);

    // Nothing was recorded as finished; the root span is still open.
    assert_eq!(backend.finish_count(), 0);
    assert!(root.is_open());

    // Once the backend recovers, the root can still be finished.
    backend.fail_finishes(false);
    root.end_trace(&SpanOutcome::new()).unwrap();
    assert!(!root.is_open());
}
