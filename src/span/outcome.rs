//! Span outcome and attribute value types.

use serde::{Deserialize, Serialize};

/// The normal-completion record passed to a span finish.
///
/// An outcome is opaque to the chain itself; it is carried through to the
/// backend's finish call unchanged. It bundles whatever the caller wants
/// recorded on the span at completion time, as key-value attributes.
///
/// ## Example
///
/// ```rust
/// use tracelink::SpanOutcome;
///
/// let outcome = SpanOutcome::new()
///     .with_attribute("http.status_code", 200)
///     .with_attribute("response.cached", false);
///
/// assert_eq!(outcome.attributes().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanOutcome {
    attributes: Vec<(String, SpanValue)>,
}

impl SpanOutcome {
    /// Creates an empty outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute to record on the span at finish time.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<SpanValue>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Returns the attributes in insertion order.
    pub fn attributes(&self) -> &[(String, SpanValue)] {
        &self.attributes
    }
}

/// A value that can be attached to a span as an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpanValue {
    /// A string value.
    String(String),
    /// An integer value.
    Int(i64),
    /// A float value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
}

impl SpanValue {
    /// Returns the value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpanValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            SpanValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, if it is one.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            SpanValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SpanValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpanValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpanValue::String(s) => write!(f, "{}", s),
            SpanValue::Int(i) => write!(f, "{}", i),
            SpanValue::Float(fl) => write!(f, "{}", fl),
            SpanValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for SpanValue {
    fn from(s: &str) -> Self {
        SpanValue::String(s.to_owned())
    }
}

impl From<String> for SpanValue {
    fn from(s: String) -> Self {
        SpanValue::String(s)
    }
}

impl From<i64> for SpanValue {
    fn from(i: i64) -> Self {
        SpanValue::Int(i)
    }
}

impl From<i32> for SpanValue {
    fn from(i: i32) -> Self {
        SpanValue::Int(i64::from(i))
    }
}

impl From<u64> for SpanValue {
    fn from(i: u64) -> Self {
        SpanValue::Int(i as i64)
    }
}

impl From<f64> for SpanValue {
    fn from(f: f64) -> Self {
        SpanValue::Float(f)
    }
}

impl From<bool> for SpanValue {
    fn from(b: bool) -> Self {
        SpanValue::Bool(b)
    }
}

/// Well-known span names used by the gateway.
pub mod span_names {
    /// The request-level server span opened for every inbound request.
    pub const UPSTREAM_SERVER: &str = "gateway.upstream.server";

    /// Prefix for downstream client spans; callers append the call target.
    pub const DOWNSTREAM_CLIENT_PREFIX: &str = "gateway.downstream.";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_attributes_in_order() {
        let outcome = SpanOutcome::new()
            .with_attribute("first", 1)
            .with_attribute("second", "two");

        let keys: Vec<&str> = outcome
            .attributes()
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(keys, ["first", "second"]);
    }

    #[test]
    fn test_span_value_conversions() {
        assert_eq!(SpanValue::from("test").as_str(), Some("test"));
        assert_eq!(SpanValue::from(42i64).as_int(), Some(42));
        assert_eq!(SpanValue::from(2.5f64).as_float(), Some(2.5));
        assert_eq!(SpanValue::from(true).as_bool(), Some(true));
        assert_eq!(SpanValue::from(7i32).as_int(), Some(7));
    }

    #[test]
    fn test_span_value_display() {
        assert_eq!(SpanValue::from("x").to_string(), "x");
        assert_eq!(SpanValue::from(3i64).to_string(), "3");
        assert_eq!(SpanValue::from(false).to_string(), "false");
    }

    #[test]
    fn test_outcome_serde_roundtrip() {
        let outcome = SpanOutcome::new().with_attribute("code", 204);
        let json = serde_json::to_string(&outcome).unwrap();
        let back: SpanOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);
    }
}
