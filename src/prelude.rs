//! Convenient imports for common usage.
//!
//! ```rust
//! use tracelink::prelude::*;
//! ```

pub use crate::carrier::Carrier;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::gateway::TraceGateway;
pub use crate::operation::TraceOperation;
pub use crate::span::{SpanBackend, SpanHandle, SpanOutcome, SpanScope, SpanValue};
