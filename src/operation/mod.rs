//! The per-request trace-operation chain.
//!
//! One [`TraceOperation`] root is created per inbound request. Every
//! downstream call made while servicing that request gets its own child
//! operation, appended to a single ordered sequence shared by the whole
//! chain: oldest child nearest the root, newest at the tail. Downstream
//! calls issued under one request span are modeled as siblings-in-sequence
//! rather than nested parents, because they commonly run concurrently
//! against the same parent rather than strictly nesting.
//!
//! ## Completion
//!
//! Three ways a span leaves the chain, all of them finish it exactly once:
//!
//! - [`end_trace`](TraceOperation::end_trace) /
//!   [`exception_trace`](TraceOperation::exception_trace) on the **root**:
//!   whole-chain teardown, newest child first, root last, so no span is
//!   reported finished before all of its chain descendants.
//! - [`end_latest_trace`](TraceOperation::end_latest_trace) /
//!   [`exception_latest_trace`](TraceOperation::exception_latest_trace):
//!   removes and finishes the **oldest** still-open child. The name is
//!   historical; see the method docs.
//! - [`end_trace`](TraceOperation::end_trace) on a **child** handle:
//!   finishes exactly that node and splices it out, leaving siblings alone.
//!   This is the path for downstream completions that arrive out of order.
//!
//! ## Synchronization
//!
//! Each individual operation is atomic (the shared sequence sits behind a
//! mutex), but protocols spanning several operations are not: one owner
//! should serialize chain mutation for a given request, and two threads
//! must not race the "latest" completion family against each other on the
//! same parent. A child handle given to an async completion may finish
//! itself from any thread without coordinating with siblings.
//!
//! A child that is never finished stays attached until the root teardown
//! collects it; pair every [`create_child`](TraceOperation::create_child)
//! with a completion call.

use std::error::Error as StdError;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::carrier::Carrier;
use crate::error::Result;
use crate::span::{SpanBackend, SpanHandle, SpanOutcome, SpanValue};

/// The ordered sequence of still-open children under one root, oldest first.
type Chain = Mutex<Vec<TraceOperation>>;

/// One open span in a per-request chain.
///
/// Handles are cheap to clone; clones refer to the same underlying node.
/// The root handle owns the chain, child handles hold a non-owning
/// back-reference to it, so dropping the root without finishing does not
/// keep the chain alive through its own children.
#[derive(Clone)]
pub struct TraceOperation {
    inner: Arc<Inner>,
}

struct Inner {
    /// Taken exactly once, by whichever completion path finishes this node.
    span: Mutex<Option<Box<dyn SpanHandle>>>,
    backend: Arc<dyn SpanBackend>,
    link: ChainLink,
    /// Gateway-wide export switch, copied into every node at construction.
    use_trace: bool,
    /// Per-request flag, inherited by every child.
    trace_enabled: bool,
}

enum ChainLink {
    Root(Arc<Chain>),
    Child(Weak<Chain>),
}

impl Inner {
    fn is_root(&self) -> bool {
        matches!(self.link, ChainLink::Root(_))
    }

    fn chain(&self) -> Option<Arc<Chain>> {
        match &self.link {
            ChainLink::Root(chain) => Some(Arc::clone(chain)),
            ChainLink::Child(chain) => chain.upgrade(),
        }
    }
}

impl TraceOperation {
    /// Builds the root operation for one request.
    pub(crate) fn root(
        span: Box<dyn SpanHandle>,
        backend: Arc<dyn SpanBackend>,
        use_trace: bool,
        trace_enabled: bool,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                span: Mutex::new(Some(span)),
                backend,
                link: ChainLink::Root(Arc::new(Mutex::new(Vec::new()))),
                use_trace,
                trace_enabled,
            }),
        }
    }

    /// Starts a client-kind span for a downstream call and appends it to the
    /// chain.
    ///
    /// The new node always lands at the tail of the chain, regardless of
    /// which node this is called on; children are ordered by creation time,
    /// oldest nearest the root. Both tracing flags are inherited from the
    /// node the call was made on.
    ///
    /// Returns the child's own handle. Hold on to it: a downstream
    /// completion that must finish *this* call specifically, rather than
    /// whichever child is oldest, does so by calling
    /// [`end_trace`](TraceOperation::end_trace) on this handle.
    pub fn create_child(&self, carrier: &Carrier, name: &str, async_finish: bool) -> TraceOperation {
        let span = self.inner.backend.start_client_span(carrier, name, async_finish);
        let link = match self.inner.chain() {
            Some(chain) => ChainLink::Child(Arc::downgrade(&chain)),
            // Root already gone; the child lives detached.
            None => ChainLink::Child(Weak::new()),
        };
        let child = TraceOperation {
            inner: Arc::new(Inner {
                span: Mutex::new(Some(span)),
                backend: Arc::clone(&self.inner.backend),
                link,
                use_trace: self.inner.use_trace,
                trace_enabled: self.inner.trace_enabled,
            }),
        };
        if let Some(chain) = self.inner.chain() {
            chain.lock().push(child.clone());
        }
        trace!(name, async_finish, "client span appended to trace chain");
        child
    }

    /// Finishes this operation with a normal outcome.
    ///
    /// No-op when the gateway's export switch is off. On the root, all
    /// still-open children finish first, newest to oldest, then the root
    /// span itself; the chain is empty afterwards. On a child handle, only
    /// that node finishes, and it is spliced out of the chain without
    /// touching its siblings.
    ///
    /// A backend failure aborts the teardown and propagates; spans not yet
    /// reached stay open.
    pub fn end_trace(&self, outcome: &SpanOutcome) -> Result<()> {
        if !self.inner.use_trace {
            debug!("trace export disabled, skipping span finish");
            return Ok(());
        }
        if self.inner.is_root() {
            for child in self.drain_children().into_iter().rev() {
                child.finish_span(outcome)?;
            }
            self.finish_span(outcome)
        } else {
            self.detach();
            self.finish_span(outcome)
        }
    }

    /// Finishes this operation recording an error.
    ///
    /// Teardown order is identical to [`end_trace`](TraceOperation::end_trace);
    /// each finish records `error` and `attributes` on that span instead of a
    /// normal outcome.
    pub fn exception_trace(
        &self,
        error: &(dyn StdError + 'static),
        attributes: &[(String, SpanValue)],
    ) -> Result<()> {
        if !self.inner.use_trace {
            debug!("trace export disabled, skipping span error finish");
            return Ok(());
        }
        if self.inner.is_root() {
            for child in self.drain_children().into_iter().rev() {
                child.finish_span_with_error(error, attributes)?;
            }
            self.finish_span_with_error(error, attributes)
        } else {
            self.detach();
            self.finish_span_with_error(error, attributes)
        }
    }

    /// Removes and finishes the **oldest** still-open child.
    ///
    /// Despite the name, this finishes the least-recently started child, the
    /// one nearest the root, not the tail. The name is kept for continuity
    /// with the bookkeeping scheme this crate descends from; the behavior is
    /// the documented one. The removal is positional: if downstream calls
    /// complete out of creation order, this still finishes the head of the
    /// chain. To finish a specific call, keep its handle from
    /// [`create_child`](TraceOperation::create_child) and call
    /// [`end_trace`](TraceOperation::end_trace) on it.
    ///
    /// With no open children this is an idempotent no-op. The splice happens
    /// even when export is disabled; only the finish call is suppressed.
    pub fn end_latest_trace(&self, outcome: &SpanOutcome) -> Result<()> {
        let Some(oldest) = self.pop_oldest() else {
            return Ok(());
        };
        if !oldest.inner.use_trace {
            return Ok(());
        }
        oldest.finish_span(outcome)
    }

    /// Removes the oldest still-open child and finishes it recording an
    /// error.
    ///
    /// Same splice as [`end_latest_trace`](TraceOperation::end_latest_trace),
    /// using the error finish.
    pub fn exception_latest_trace(
        &self,
        error: &(dyn StdError + 'static),
        attributes: &[(String, SpanValue)],
    ) -> Result<()> {
        let Some(oldest) = self.pop_oldest() else {
            return Ok(());
        };
        if !oldest.inner.use_trace {
            return Ok(());
        }
        oldest.finish_span_with_error(error, attributes)
    }

    /// Returns the per-request tracing flag recorded at creation.
    pub fn trace_enabled(&self) -> bool {
        self.inner.trace_enabled
    }

    /// Returns `true` if this node's span has not been finished yet.
    pub fn is_open(&self) -> bool {
        self.inner.span.lock().is_some()
    }

    /// Returns the number of still-open children in the chain.
    pub fn open_children(&self) -> usize {
        self.inner.chain().map_or(0, |chain| chain.lock().len())
    }

    fn drain_children(&self) -> Vec<TraceOperation> {
        match self.inner.chain() {
            Some(chain) => chain.lock().drain(..).collect(),
            None => Vec::new(),
        }
    }

    fn pop_oldest(&self) -> Option<TraceOperation> {
        let chain = self.inner.chain()?;
        let mut chain = chain.lock();
        if chain.is_empty() {
            None
        } else {
            trace!(remaining = chain.len() - 1, "oldest child spliced from trace chain");
            Some(chain.remove(0))
        }
    }

    /// Splices this node out of the chain, if it is still linked.
    fn detach(&self) {
        if let Some(chain) = self.inner.chain() {
            let mut chain = chain.lock();
            if let Some(position) = chain
                .iter()
                .position(|sibling| Arc::ptr_eq(&sibling.inner, &self.inner))
            {
                chain.remove(position);
            }
        }
    }

    /// Finishes this node's span, at most once, inside its context window.
    fn finish_span(&self, outcome: &SpanOutcome) -> Result<()> {
        let taken = self.inner.span.lock().take();
        if let Some(span) = taken {
            let _scope = span.make_current();
            span.finish(outcome)?;
        }
        Ok(())
    }

    fn finish_span_with_error(
        &self,
        error: &(dyn StdError + 'static),
        attributes: &[(String, SpanValue)],
    ) -> Result<()> {
        let taken = self.inner.span.lock().take();
        if let Some(span) = taken {
            let _scope = span.make_current();
            span.finish_with_error(error, attributes)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TraceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceOperation")
            .field("root", &self.inner.is_root())
            .field("open", &self.is_open())
            .field("use_trace", &self.inner.use_trace)
            .field("trace_enabled", &self.inner.trace_enabled)
            .field("open_children", &self.open_children())
            .finish()
    }
}
