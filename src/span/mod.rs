//! The span collaborator seam.
//!
//! The chain logic in this crate never talks to a tracing backend directly.
//! It acquires spans through [`SpanBackend`] and finishes them through
//! [`SpanHandle`]; what those calls do (OpenTelemetry export, Zipkin, an
//! in-memory recorder) is entirely the implementor's business. The contract
//! the chain relies on:
//!
//! - span creation is infallible at this seam — a backend that cannot build
//!   a real span returns an inert handle instead of erroring;
//! - finishing consumes the handle, so a span cannot be finished twice;
//! - finish failures are reported as [`Error`](crate::Error) values and are
//!   propagated by the chain, never retried or swallowed.

mod handle;
mod outcome;

pub use handle::{SpanBackend, SpanHandle, SpanScope};
pub use outcome::{SpanOutcome, SpanValue, span_names};
