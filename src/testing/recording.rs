//! A span backend that records starts and finishes for assertions.

use std::error::Error as StdError;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::carrier::Carrier;
use crate::error::{Error, ErrorKind, Result};
use crate::span::{SpanBackend, SpanHandle, SpanOutcome, SpanScope, SpanValue};

/// Which side of a call a recorded span was started for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedKind {
    /// A server-kind span (inbound request).
    Server,
    /// A client-kind span (downstream call).
    Client,
}

/// How a recorded span was finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishDisposition {
    /// Finished with a normal outcome.
    Normal,
    /// Finished recording an error; carries the error's display string.
    Errored(String),
}

/// One span start observed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StartRecord {
    /// The span name.
    pub name: String,
    /// Server or client.
    pub kind: RecordedKind,
    /// The `async_finish` flag for client spans; `false` for server spans.
    pub async_finish: bool,
    /// The carrier the span was started over.
    pub carrier: Carrier,
}

/// One span finish observed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishRecord {
    /// The span name.
    pub name: String,
    /// Server or client.
    pub kind: RecordedKind,
    /// Monotonic finish sequence number, starting at 0.
    pub sequence: u64,
    /// Normal or errored, with the error message when errored.
    pub disposition: FinishDisposition,
    /// Whether the finish ran inside an active `make_current` scope.
    pub in_scope: bool,
    /// The outcome attributes (normal finish) or error attributes.
    pub attributes: Vec<(String, SpanValue)>,
}

#[derive(Default)]
struct RecorderState {
    starts: Mutex<Vec<StartRecord>>,
    finishes: Mutex<Vec<FinishRecord>>,
    sequence: AtomicU64,
    active_scopes: AtomicUsize,
    fail_finishes: AtomicBool,
}

/// A [`SpanBackend`] whose handles record every start and finish.
///
/// Clones share state, so keep one clone for assertions and hand another to
/// the gateway. Finish records carry monotonic sequence numbers, which makes
/// ordering assertions direct:
///
/// ```rust
/// use std::sync::Arc;
/// use tracelink::{Carrier, SpanOutcome, TraceGateway};
/// use tracelink::testing::RecordingBackend;
///
/// let backend = RecordingBackend::new();
/// let gateway = TraceGateway::new(true, Arc::new(backend.clone()));
/// let root = gateway.trace_operation([("x-a", "1")], true);
/// root.create_child(&Carrier::new(), "downstream.a", false);
/// root.end_trace(&SpanOutcome::new()).unwrap();
///
/// let names = backend.finished_names();
/// assert_eq!(names, ["downstream.a", "gateway.upstream.server"]);
/// ```
#[derive(Clone, Default)]
pub struct RecordingBackend {
    state: Arc<RecorderState>,
}

impl RecordingBackend {
    /// Creates a new recording backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent finish fail with an
    /// [`ErrorKind::Export`](crate::ErrorKind) error.
    pub fn fail_finishes(&self, fail: bool) {
        self.state.fail_finishes.store(fail, Ordering::SeqCst);
    }

    /// Returns all span starts observed so far, in order.
    pub fn starts(&self) -> Vec<StartRecord> {
        self.state.starts.lock().clone()
    }

    /// Returns all span finishes observed so far, in finish order.
    pub fn finishes(&self) -> Vec<FinishRecord> {
        self.state.finishes.lock().clone()
    }

    /// Returns the finished span names, in finish order.
    pub fn finished_names(&self) -> Vec<String> {
        self.state
            .finishes
            .lock()
            .iter()
            .map(|record| record.name.clone())
            .collect()
    }

    /// Returns how many spans have been finished.
    pub fn finish_count(&self) -> usize {
        self.state.finishes.lock().len()
    }

    /// Returns how many `make_current` scopes are active right now.
    pub fn active_scopes(&self) -> usize {
        self.state.active_scopes.load(Ordering::SeqCst)
    }

    fn start(&self, record: StartRecord) -> Box<dyn SpanHandle> {
        let handle = RecordingHandle {
            name: record.name.clone(),
            kind: record.kind,
            state: Arc::clone(&self.state),
        };
        self.state.starts.lock().push(record);
        Box::new(handle)
    }
}

impl SpanBackend for RecordingBackend {
    fn start_server_span(
        &self,
        carrier: &Carrier,
        name: &str,
        _remote_parent: bool,
    ) -> Box<dyn SpanHandle> {
        self.start(StartRecord {
            name: name.to_owned(),
            kind: RecordedKind::Server,
            async_finish: false,
            carrier: carrier.clone(),
        })
    }

    fn start_client_span(
        &self,
        carrier: &Carrier,
        name: &str,
        async_finish: bool,
    ) -> Box<dyn SpanHandle> {
        self.start(StartRecord {
            name: name.to_owned(),
            kind: RecordedKind::Client,
            async_finish,
            carrier: carrier.clone(),
        })
    }
}

struct RecordingHandle {
    name: String,
    kind: RecordedKind,
    state: Arc<RecorderState>,
}

impl RecordingHandle {
    fn record(
        &self,
        disposition: FinishDisposition,
        attributes: Vec<(String, SpanValue)>,
    ) -> Result<()> {
        if self.state.fail_finishes.load(Ordering::SeqCst) {
            return Err(Error::new(ErrorKind::Export, "recording backend set to fail"));
        }
        let sequence = self.state.sequence.fetch_add(1, Ordering::SeqCst);
        let in_scope = self.state.active_scopes.load(Ordering::SeqCst) > 0;
        self.state.finishes.lock().push(FinishRecord {
            name: self.name.clone(),
            kind: self.kind,
            sequence,
            disposition,
            in_scope,
            attributes,
        });
        Ok(())
    }
}

impl SpanHandle for RecordingHandle {
    fn make_current(&self) -> SpanScope {
        self.state.active_scopes.fetch_add(1, Ordering::SeqCst);
        let state = Arc::clone(&self.state);
        SpanScope::new(move || {
            state.active_scopes.fetch_sub(1, Ordering::SeqCst);
        })
    }

    fn finish(self: Box<Self>, outcome: &SpanOutcome) -> Result<()> {
        self.record(FinishDisposition::Normal, outcome.attributes().to_vec())
    }

    fn finish_with_error(
        self: Box<Self>,
        error: &(dyn StdError + 'static),
        attributes: &[(String, SpanValue)],
    ) -> Result<()> {
        self.record(
            FinishDisposition::Errored(error.to_string()),
            attributes.to_vec(),
        )
    }
}
