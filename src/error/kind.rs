//! Error kind enumeration for categorizing tracing errors.

/// Categorization of tracing errors.
///
/// This enum provides a stable interface for matching on error types. The
/// taxonomy is small on purpose: most conditions around span completion
/// (disabled tracing, empty chains) are defined as no-ops, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The span backend failed while finishing or exporting a span.
    ///
    /// Raised by [`SpanHandle`](crate::span::SpanHandle) implementations and
    /// propagated unchanged through the completion operations. The chain
    /// never retries a failed finish.
    #[error("span export failed")]
    Export,

    /// A caller violated an API precondition.
    ///
    /// Backends surface malformed input (for example an empty span name or a
    /// carrier they cannot propagate) with this kind rather than failing
    /// deeper inside the export path.
    #[error("invalid argument")]
    InvalidArgument,

    /// An error that does not fit any other category.
    #[error("unknown error")]
    Unknown,
}

impl ErrorKind {
    /// Returns `true` if this kind indicates a backend-side failure rather
    /// than a caller mistake.
    pub fn is_backend(&self) -> bool {
        matches!(self, ErrorKind::Export)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Export.to_string(), "span export failed");
        assert_eq!(ErrorKind::InvalidArgument.to_string(), "invalid argument");
    }

    #[test]
    fn test_is_backend() {
        assert!(ErrorKind::Export.is_backend());
        assert!(!ErrorKind::InvalidArgument.is_backend());
        assert!(!ErrorKind::Unknown.is_backend());
    }
}
