//! Context-carrier extraction from inbound request headers.
//!
//! A [`Carrier`] is the flat key-value representation of trace context that
//! gets handed to the span backend when a span is started, and that a gateway
//! forwards to downstream calls. It is built from the inbound header
//! collection with a fixed exclusion set: content negotiation and length
//! headers must never travel as trace baggage.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Header names that are never copied into a carrier, matched
/// case-insensitively against the inbound header collection.
pub const EXCLUDED_HEADERS: [&str; 3] = ["content-type", "accept-encoding", "content-length"];

/// A string-keyed context-propagation map.
///
/// Keys are normalized to ASCII lowercase, so headers that differ only in
/// case collapse to a single entry, last write wins. This matches the usual
/// HTTP discipline where header names are case-insensitive.
///
/// ## Example
///
/// ```rust
/// use tracelink::Carrier;
///
/// let carrier = Carrier::from_headers([
///     ("traceparent", "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"),
///     ("Content-Type", "application/json"),
///     ("X-Request-Id", "req-42"),
/// ]);
///
/// assert_eq!(carrier.len(), 2);
/// assert!(carrier.get("content-type").is_none());
/// assert_eq!(carrier.get("x-request-id"), Some("req-42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    entries: HashMap<String, String>,
}

impl Carrier {
    /// Creates an empty carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a carrier from an inbound header collection.
    ///
    /// Headers named in [`EXCLUDED_HEADERS`] are skipped regardless of case.
    /// An empty header collection yields an empty carrier; this operation has
    /// no failure modes.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut entries = HashMap::new();
        for (name, value) in headers {
            let key = name.to_ascii_lowercase();
            if EXCLUDED_HEADERS.contains(&key.as_str()) {
                continue;
            }
            entries.insert(key, value.to_owned());
        }
        Self { entries }
    }

    /// Returns the value for the given header name, if present.
    ///
    /// Lookup is case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Inserts an entry, returning the previous value for that name.
    ///
    /// The name is normalized to lowercase. Insertion does not apply the
    /// exclusion set; that filter belongs to header extraction only.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into().to_ascii_lowercase(), value.into())
    }

    /// Returns `true` if the given header name has an entry.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the carrier has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in arbitrary order.
    pub fn iter(&self) -> std::collections::hash_map::Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl From<HashMap<String, String>> for Carrier {
    /// Normalizes the map's keys to lowercase. No exclusion filter is applied.
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl FromIterator<(String, String)> for Carrier {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut carrier = Carrier::new();
        for (name, value) in iter {
            carrier.insert(name, value);
        }
        carrier
    }
}

impl<'a> IntoIterator for &'a Carrier {
    type Item = (&'a String, &'a String);
    type IntoIter = std::collections::hash_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
