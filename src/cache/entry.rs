//! Cache entry record, codec, and freshness policy.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::http::Headers;

/// A stored cache entry: response payload, response headers, and the
/// metadata the middleware maintains for the storage adapter's benefit.
///
/// `last_access` and `frequency` exist so adapters can implement
/// recency-based (LRU/MRU) or frequency-based (LFU/MFU) eviction without
/// decoding anything themselves; the middleware keeps them current on every
/// hit. They are advisory counters, not correctness-critical state.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime};
/// use recache::cache::Entry;
/// use recache::http::Headers;
///
/// let now = SystemTime::now();
/// let mut headers = Headers::new();
/// headers.append("Content-Type", "text/plain");
///
/// let entry = Entry::new(b"hello".to_vec(), headers, now + Duration::from_secs(10), now);
/// assert!(entry.is_fresh(now));
/// assert_eq!(entry.frequency, 1);
///
/// let decoded = Entry::decode(&entry.encode());
/// assert_eq!(decoded, entry);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Raw response body bytes.
    pub payload: Vec<u8>,
    /// Response headers as produced by the wrapped handler.
    pub headers: Headers,
    /// Absolute timestamp after which the entry is stale.
    pub expires_at: SystemTime,
    /// Timestamp of the most recent hit.
    pub last_access: SystemTime,
    /// Monotonically increasing hit counter.
    pub frequency: u64,
}

impl Default for Entry {
    /// The zero entry: empty payload and headers, both timestamps at the
    /// Unix epoch, frequency 0. Always stale, so decoding garbage uniformly
    /// degrades to a cache miss.
    fn default() -> Self {
        Self {
            payload: Vec::new(),
            headers: Headers::new(),
            expires_at: UNIX_EPOCH,
            last_access: UNIX_EPOCH,
            frequency: 0,
        }
    }
}

impl Entry {
    /// Creates a freshly stored entry with a hit count of one.
    pub fn new(
        payload: Vec<u8>,
        headers: Headers,
        expires_at: SystemTime,
        now: SystemTime,
    ) -> Self {
        Self {
            payload,
            headers,
            expires_at,
            last_access: now,
            frequency: 1,
        }
    }

    /// Serializes the entry to bytes for storage.
    pub fn encode(&self) -> Vec<u8> {
        // Serializing these field types cannot fail; an empty vec decodes
        // back to the zero entry either way.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Deserializes an entry from stored bytes.
    ///
    /// Malformed or empty input never surfaces an error: it yields the zero
    /// entry, whose freshness check always fails. Callers treat "absent"
    /// and "corrupt" identically, as a miss.
    pub fn decode(bytes: &[u8]) -> Entry {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// Returns `true` if the entry is still servable at `now`.
    ///
    /// Strict inequality: an entry expiring exactly at `now` is stale.
    pub fn is_fresh(&self, now: SystemTime) -> bool {
        self.expires_at > now
    }

    /// Records a hit: updates the last-access time and bumps the counter.
    pub fn touch(&mut self, now: SystemTime) {
        self.last_access = now;
        self.frequency += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn sample_headers() -> Headers {
        let mut headers = Headers::new();
        headers.append("Content-Type", "application/json");
        headers.append("Set-Cookie", "a=1");
        headers.append("set-cookie", "b=2");
        headers
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let now = SystemTime::now();
        let mut entry = Entry::new(
            b"{\"ok\":true}".to_vec(),
            sample_headers(),
            now + Duration::from_secs(30),
            now,
        );
        entry.touch(now + Duration::from_secs(1));

        let decoded = Entry::decode(&entry.encode());
        assert_eq!(decoded, entry);
        assert_eq!(decoded.frequency, 2);
        // Multi-value headers keep both their values and their name casing.
        let cookies: Vec<_> = decoded.headers.get_all("Set-Cookie").collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
        assert_eq!(decoded.headers.names(), vec!["Content-Type", "Set-Cookie"]);
    }

    #[test]
    fn decode_of_empty_bytes_is_the_zero_entry() {
        let entry = Entry::decode(b"");
        assert_eq!(entry, Entry::default());
        assert!(!entry.is_fresh(UNIX_EPOCH));
        assert!(!entry.is_fresh(SystemTime::now()));
    }

    #[test]
    fn decode_of_garbage_is_the_zero_entry() {
        let entry = Entry::decode(b"\x00\xffnot json at all");
        assert_eq!(entry, Entry::default());
    }

    #[test]
    fn expiration_boundary_is_strict() {
        let now = SystemTime::now();
        let entry = Entry::new(Vec::new(), Headers::new(), now, now);
        assert!(!entry.is_fresh(now)); // expires exactly now: stale
        assert!(entry.is_fresh(now - Duration::from_millis(1)));
    }

    #[test]
    fn touch_updates_bookkeeping() {
        let now = SystemTime::now();
        let mut entry = Entry::new(Vec::new(), Headers::new(), now + Duration::from_secs(5), now);
        let later = now + Duration::from_secs(2);
        entry.touch(later);
        assert_eq!(entry.last_access, later);
        assert_eq!(entry.frequency, 2);
        assert_eq!(entry.expires_at, now + Duration::from_secs(5)); // unchanged
    }
}
