//! Error types for tracelink.
//!
//! The crate distinguishes three situations that look superficially alike:
//!
//! - **Disabled tracing** is not an error. Finish operations on a chain whose
//!   gateway was built with `use_trace = false` are deliberate no-ops and
//!   return `Ok(())`.
//! - **Empty-chain completion** is not an error either. Calling the "latest"
//!   completion family on a node with no open children is an idempotent no-op.
//! - **Collaborator failure** is an error. When the span backend fails to
//!   finish or export a span, that failure is propagated as an [`Error`] with
//!   kind [`ErrorKind::Export`]; this crate never retries or swallows it.

mod core;
mod kind;

pub use self::core::Error;
pub use self::kind::ErrorKind;

/// A specialized `Result` type for tracelink operations.
pub type Result<T> = std::result::Result<T, Error>;
