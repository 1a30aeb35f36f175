//! Testing utilities for tracelink.
//!
//! This module provides tools for testing applications that use the crate:
//!
//! - [`RecordingBackend`]: a [`SpanBackend`](crate::span::SpanBackend) that
//!   records every span start and finish with monotonic sequence numbers,
//!   for asserting finish order and counts.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tracelink::{SpanOutcome, TraceGateway};
//! use tracelink::testing::RecordingBackend;
//!
//! let backend = RecordingBackend::new();
//! let gateway = TraceGateway::new(true, Arc::new(backend.clone()));
//!
//! let root = gateway.trace_operation([("x-request-id", "req-1")], true);
//! root.end_trace(&SpanOutcome::new()).unwrap();
//!
//! assert_eq!(backend.finish_count(), 1);
//! ```

mod recording;

pub use recording::{FinishDisposition, FinishRecord, RecordedKind, RecordingBackend, StartRecord};
