//! # tracelink
//!
//! Per-request distributed-tracing bookkeeping for gateways.
//!
//! A gateway that serves one inbound request may fire off any number of
//! downstream calls, each wrapped in its own client span, and those calls
//! can complete asynchronously and out of creation order. This crate keeps
//! the books: one [`TraceOperation`] chain per request, rooted at the
//! request-level server span, where every child span is finished exactly
//! once and in the right place relative to its chain, no matter how
//! completions are interleaved.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tracelink::{Carrier, SpanOutcome, TraceGateway};
//! use tracelink::testing::RecordingBackend;
//!
//! // In production the backend wraps your real tracer; the recording
//! // backend stands in for it here.
//! let backend = Arc::new(RecordingBackend::new());
//! let gateway = TraceGateway::new(true, backend);
//!
//! // One root operation per inbound request.
//! let root = gateway.trace_operation(
//!     [("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")],
//!     true,
//! );
//!
//! // Each downstream call gets a child span; hold the handle if the call
//! // completes asynchronously.
//! let lookup = root.create_child(&Carrier::new(), "gateway.downstream.lookup", true);
//!
//! // The async completion finishes its own span, from wherever it runs.
//! lookup.end_trace(&SpanOutcome::new().with_attribute("hit", true))?;
//!
//! // Request done: finish whatever is still open, deepest first, root last.
//! root.end_trace(&SpanOutcome::new().with_attribute("http.status_code", 200))?;
//! # Ok::<(), tracelink::Error>(())
//! ```
//!
//! ## Key Concepts
//!
//! - **Chain, not tree**: downstream calls made under one request span are
//!   siblings in one ordered sequence, oldest nearest the root, because
//!   they usually run concurrently against the same parent.
//! - **Creation is unconditional, export is gated**: the gateway's
//!   `use_trace` switch suppresses finish/export, never span creation.
//! - **The backend is yours**: span creation and export go through the
//!   [`SpanBackend`]/[`SpanHandle`] traits; this crate never talks to a
//!   tracer directly.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

// Core modules
pub mod carrier;
pub mod error;
pub mod gateway;
pub mod operation;
pub mod span;

// Testing utilities
pub mod testing;

// Prelude for convenient imports
pub mod prelude;

// Re-export main types at crate root for convenience
pub use carrier::{Carrier, EXCLUDED_HEADERS};
pub use error::{Error, ErrorKind, Result};
pub use gateway::TraceGateway;
pub use operation::TraceOperation;
pub use span::{SpanBackend, SpanHandle, SpanOutcome, SpanScope, SpanValue, span_names};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_compiles() {
        // Basic smoke test
        let _ = ErrorKind::Export;
    }
}
