//! Entry point: building the root trace operation for an inbound request.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::carrier::Carrier;
use crate::operation::TraceOperation;
use crate::span::{SpanBackend, span_names};

/// Builds the root [`TraceOperation`] for each inbound request.
///
/// The gateway carries two things: the process-wide `use_trace` switch and
/// the span backend. The switch does **not** gate span creation — a root
/// operation and its server span are always built, because creation is
/// cheap; what `use_trace = false` suppresses is the finish/export step, at
/// completion time. That keeps the bookkeeping identical whether or not
/// traces actually leave the process.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use tracelink::{SpanOutcome, TraceGateway};
/// use tracelink::testing::RecordingBackend;
///
/// let gateway = TraceGateway::new(true, Arc::new(RecordingBackend::new()));
///
/// let root = gateway.trace_operation(
///     [("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")],
///     true,
/// );
/// // ... downstream calls via root.create_child(...) ...
/// root.end_trace(&SpanOutcome::new()).unwrap();
/// ```
pub struct TraceGateway {
    use_trace: bool,
    backend: Arc<dyn SpanBackend>,
}

impl TraceGateway {
    /// Creates a gateway over the given span backend.
    pub fn new(use_trace: bool, backend: Arc<dyn SpanBackend>) -> Self {
        Self { use_trace, backend }
    }

    /// Returns the process-wide export switch.
    pub fn use_trace(&self) -> bool {
        self.use_trace
    }

    /// Builds the root operation for one inbound request.
    ///
    /// The carrier is extracted from `headers` (exclusion set applied) and a
    /// server-kind span is started over it with a local parent. Span
    /// creation failure policy belongs to the backend; this method has no
    /// error path.
    ///
    /// `trace_enabled` is the per-request tracing decision; it is recorded
    /// on the root and inherited by every child.
    pub fn trace_operation<'a, I>(&self, headers: I, trace_enabled: bool) -> TraceOperation
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let carrier = Carrier::from_headers(headers);
        let span = self
            .backend
            .start_server_span(&carrier, span_names::UPSTREAM_SERVER, false);
        debug!(
            trace_enabled,
            carrier_entries = carrier.len(),
            "server span opened for inbound request"
        );
        TraceOperation::root(
            span,
            Arc::clone(&self.backend),
            self.use_trace,
            trace_enabled,
        )
    }
}

impl fmt::Debug for TraceGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceGateway")
            .field("use_trace", &self.use_trace)
            .finish()
    }
}
