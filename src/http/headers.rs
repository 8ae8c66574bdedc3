//! HTTP header map with case-insensitive name lookup.
//!
//! HTTP headers are order-preserving and case-insensitive per RFC 9110 §5.
//! The map additionally round-trips through serde without losing entry
//! order, value multiplicity, or the name casing the producer supplied —
//! the cache entry codec depends on all three.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A case-insensitive, multi-value HTTP header map.
///
/// Preserves insertion order and allows multiple values per header name.
/// [`append`](Self::append) adds a value; [`set`](Self::set) replaces all
/// existing values for a name.
///
/// # Examples
///
/// ```
/// use recache::http::Headers;
///
/// let mut headers = Headers::new();
/// headers.append("Content-Type", "text/html");
/// headers.append("Set-Cookie", "a=1");
/// headers.append("Set-Cookie", "b=2");
///
/// assert_eq!(headers.get("content-type"), Some("text/html"));
/// assert_eq!(headers.values_joined("set-cookie", ","), Some("a=1,b=2".to_owned()));
///
/// headers.set("Content-Type", "application/json");
/// assert_eq!(headers.get("Content-Type"), Some("application/json"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header map with pre-allocated capacity for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends a header entry. Multiple values for the same name are preserved.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Replaces all values for `name` with a single entry.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.entries.push((name, value.into()));
    }

    /// Returns the first value for the given header name (case-insensitive), or `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns an iterator over all values for the given header name (case-insensitive).
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Joins all values for `name` with `separator`, or `None` if the header is absent.
    pub fn values_joined(&self, name: &str, separator: &str) -> Option<String> {
        let values: Vec<&str> = self.get_all(name).collect();
        if values.is_empty() {
            None
        } else {
            Some(values.join(separator))
        }
    }

    /// Returns the distinct header names in first-occurrence order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
                names.push(name);
            }
        }
        names
    }

    /// Removes all entries with the given header name (case-insensitive).
    ///
    /// Returns `true` if any entries were removed.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.entries.len() < before
    }

    /// Returns `true` if the map contains at least one entry with the given name.
    pub fn contains(&self, name: &str) -> bool {
        self.entries
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Returns the total number of header entries (not unique names).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no header entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over all `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_get() {
        let mut h = Headers::new();
        h.append("Content-Type", "text/plain");
        assert_eq!(h.get("content-type"), Some("text/plain"));
        assert_eq!(h.get("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn append_preserves_multi_values() {
        let mut h = Headers::new();
        h.append("Set-Cookie", "a=1");
        h.append("Set-Cookie", "b=2");
        let vals: Vec<_> = h.get_all("set-cookie").collect();
        assert_eq!(vals, vec!["a=1", "b=2"]);
    }

    #[test]
    fn set_replaces_all_values() {
        let mut h = Headers::new();
        h.append("X-Tag", "old-1");
        h.append("X-Tag", "old-2");
        h.set("x-tag", "new");
        let vals: Vec<_> = h.get_all("X-Tag").collect();
        assert_eq!(vals, vec!["new"]);
    }

    #[test]
    fn names_are_distinct_in_first_occurrence_order() {
        let mut h = Headers::new();
        h.append("B-Header", "1");
        h.append("A-Header", "2");
        h.append("b-header", "3");
        assert_eq!(h.names(), vec!["B-Header", "A-Header"]);
    }

    #[test]
    fn values_joined() {
        let mut h = Headers::new();
        h.append("Accept", "text/html");
        h.append("Accept", "application/json");
        assert_eq!(
            h.values_joined("accept", ","),
            Some("text/html,application/json".to_owned())
        );
        assert_eq!(h.values_joined("missing", ","), None);
    }

    #[test]
    fn serde_round_trip_preserves_order_and_case() {
        let mut h = Headers::new();
        h.append("X-First", "1");
        h.append("x-first", "2");
        h.append("Content-Type", "text/plain");

        let encoded = serde_json::to_vec(&h).unwrap();
        let decoded: Headers = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, h);

        let pairs: Vec<_> = decoded.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("X-First", "1"),
                ("x-first", "2"),
                ("Content-Type", "text/plain"),
            ]
        );
    }
}
