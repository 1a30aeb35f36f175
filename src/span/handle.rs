//! Span handle and backend traits.

use std::error::Error as StdError;
use std::fmt;

use crate::carrier::Carrier;
use crate::error::Result;
use crate::span::outcome::{SpanOutcome, SpanValue};

/// An RAII guard representing a span's active-context window.
///
/// Returned by [`SpanHandle::make_current`]; dropping the guard releases the
/// context. The chain finishes every span while one of these is alive, so
/// the finish call always runs inside that span's context on all exit paths,
/// normal or erroring.
pub struct SpanScope {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SpanScope {
    /// Creates a scope that runs `release` when dropped.
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Creates a scope with no release action.
    ///
    /// For backends whose context management is implicit or absent.
    pub fn noop() -> Self {
        Self { release: None }
    }
}

impl Drop for SpanScope {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for SpanScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanScope")
            .field("armed", &self.release.is_some())
            .finish()
    }
}

/// An acquired span.
///
/// The handle is exclusively owned by one chain node until finished. Both
/// finish methods take `self: Box<Self>`, so the type system guarantees a
/// span is finished at most once.
pub trait SpanHandle: Send {
    /// Makes this span the current context.
    ///
    /// The context stays active until the returned [`SpanScope`] is dropped.
    fn make_current(&self) -> SpanScope;

    /// Finishes the span with a normal outcome.
    ///
    /// Backend failures propagate as [`ErrorKind::Export`](crate::ErrorKind)
    /// errors.
    fn finish(self: Box<Self>, outcome: &SpanOutcome) -> Result<()>;

    /// Finishes the span recording an error and its accompanying attributes.
    fn finish_with_error(
        self: Box<Self>,
        error: &(dyn StdError + 'static),
        attributes: &[(String, SpanValue)],
    ) -> Result<()>;
}

/// The span-creation collaborator.
///
/// A gateway holds one backend and every
/// [`TraceOperation`](crate::TraceOperation) created under it shares that
/// backend for child span creation. Creation never fails at this seam: a
/// backend that cannot
/// reach its tracer returns an inert handle and deals with the failure on
/// its own terms (the chain neither knows nor cares).
pub trait SpanBackend: Send + Sync {
    /// Starts a server-kind span for an inbound request.
    ///
    /// `remote_parent` indicates whether the carrier's trace context should
    /// be treated as a remote parent rather than a local one.
    fn start_server_span(
        &self,
        carrier: &Carrier,
        name: &str,
        remote_parent: bool,
    ) -> Box<dyn SpanHandle>;

    /// Starts a client-kind span for a downstream call.
    ///
    /// `async_finish` tells the backend that the span will be finished from
    /// a different thread or task than the one that created it.
    fn start_client_span(
        &self,
        carrier: &Carrier,
        name: &str,
        async_finish: bool,
    ) -> Box<dyn SpanHandle>;
}
