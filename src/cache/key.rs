//! Cache key derivation.
//!
//! A request maps to a 64-bit fingerprint: a non-cryptographic hash over
//! the key-generation function's output, followed by the values of each
//! configured vary header. Keys address storage slots only — they are not
//! reversible and carry no security weight, so a fast 64-bit digest is the
//! right tool and accidental collisions are an accepted risk.

use std::hash::Hasher;
use std::sync::Arc;

use seahash::SeaHasher;

use crate::http::Request;

/// A pluggable key-generation function: maps a request to the byte string
/// that seeds its cache key.
///
/// The default is [`default_key`]. Custom generators are useful when the
/// URL alone over- or under-identifies a variant (session-keyed APIs,
/// GraphQL-style POST reads keyed on an operation name, and so on).
pub type KeyFn = Arc<dyn Fn(&Request) -> Vec<u8> + Send + Sync>;

/// The default key-generation function.
///
/// For a body-bearing write method with a non-empty body, the derivation
/// input is the full URL string followed by the raw body bytes; for all
/// other requests it is the URL string alone. Request bodies are buffered
/// [`bytes::Bytes`], so reading them here leaves them intact for the
/// downstream handler.
pub fn default_key(request: &Request) -> Vec<u8> {
    let mut input = request.url().into_bytes();
    if request.method().has_request_body() && !request.body().is_empty() {
        input.extend_from_slice(request.body());
    }
    input
}

/// Derives the 64-bit cache key for a request.
///
/// Feeds the key function's output into the hasher, then the joined values
/// of each vary header in `vary` order (values for one header are
/// concatenated with no separator; headers with no value contribute
/// nothing). Two requests with identical derivation input always produce
/// identical keys.
pub fn derive_key(request: &Request, key_fn: &KeyFn, vary: &[String]) -> u64 {
    let mut hasher = SeaHasher::new();
    hasher.write(&key_fn(request));
    for name in vary {
        let joined: String = request.headers().get_all(name).collect();
        if !joined.is_empty() {
            hasher.write(joined.as_bytes());
        }
    }
    hasher.finish()
}

/// Renders a cache key in compact base-36, for adapters that want
/// string-typed keys.
///
/// # Examples
///
/// ```
/// use recache::cache::key_as_str;
///
/// assert_eq!(key_as_str(0), "0");
/// assert_eq!(key_as_str(35), "z");
/// assert_eq!(key_as_str(36), "10");
/// ```
pub fn key_as_str(mut key: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if key == 0 {
        return "0".to_owned();
    }
    // u64::MAX in base 36 is 13 digits.
    let mut buf = [0u8; 13];
    let mut start = buf.len();
    while key > 0 {
        start -= 1;
        buf[start] = DIGITS[(key % 36) as usize];
        key /= 36;
    }
    String::from_utf8_lossy(&buf[start..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap().0
    }

    fn default_key_fn() -> KeyFn {
        Arc::new(default_key)
    }

    #[test]
    fn derivation_is_deterministic() {
        let request = parse(b"GET /a?x=1 HTTP/1.1\r\nHost: t\r\n\r\n");
        let key_fn = default_key_fn();
        assert_eq!(
            derive_key(&request, &key_fn, &[]),
            derive_key(&request, &key_fn, &[])
        );
    }

    #[test]
    fn normalized_value_order_hashes_identically() {
        let mut a = parse(b"GET /a?x=2&x=1 HTTP/1.1\r\nHost: t\r\n\r\n");
        let mut b = parse(b"GET /a?x=1&x=2 HTTP/1.1\r\nHost: t\r\n\r\n");
        a.normalize_query();
        b.normalize_query();
        let key_fn = default_key_fn();
        assert_eq!(
            derive_key(&a, &key_fn, &[]),
            derive_key(&b, &key_fn, &[])
        );
    }

    #[test]
    fn different_urls_get_different_keys() {
        let a = parse(b"GET /a HTTP/1.1\r\nHost: t\r\n\r\n");
        let b = parse(b"GET /b HTTP/1.1\r\nHost: t\r\n\r\n");
        let key_fn = default_key_fn();
        assert_ne!(
            derive_key(&a, &key_fn, &[]),
            derive_key(&b, &key_fn, &[])
        );
    }

    #[test]
    fn post_body_participates_in_the_key() {
        let a = parse(b"POST /q HTTP/1.1\r\nHost: t\r\nContent-Length: 2\r\n\r\naa");
        let b = parse(b"POST /q HTTP/1.1\r\nHost: t\r\nContent-Length: 2\r\n\r\nbb");
        let key_fn = default_key_fn();
        assert_ne!(
            derive_key(&a, &key_fn, &[]),
            derive_key(&b, &key_fn, &[])
        );
    }

    #[test]
    fn get_body_is_ignored() {
        // A body on a safe read does not change the key.
        let a = parse(b"GET /q HTTP/1.1\r\nHost: t\r\nContent-Length: 2\r\n\r\naa");
        let b = parse(b"GET /q HTTP/1.1\r\nHost: t\r\n\r\n");
        let key_fn = default_key_fn();
        assert_eq!(
            derive_key(&a, &key_fn, &[]),
            derive_key(&b, &key_fn, &[])
        );
    }

    #[test]
    fn vary_header_values_split_the_key() {
        let a = parse(b"GET /a HTTP/1.1\r\nHost: t\r\nAccept-Language: en\r\n\r\n");
        let b = parse(b"GET /a HTTP/1.1\r\nHost: t\r\nAccept-Language: de\r\n\r\n");
        let key_fn = default_key_fn();
        let vary = vec!["Accept-Language".to_owned()];
        assert_ne!(
            derive_key(&a, &key_fn, &vary),
            derive_key(&b, &key_fn, &vary)
        );
        // Without the vary configuration the header is invisible.
        assert_eq!(
            derive_key(&a, &key_fn, &[]),
            derive_key(&b, &key_fn, &[])
        );
    }

    #[test]
    fn absent_vary_header_contributes_nothing() {
        let with_config = parse(b"GET /a HTTP/1.1\r\nHost: t\r\n\r\n");
        let key_fn = default_key_fn();
        let vary = vec!["Accept-Language".to_owned()];
        assert_eq!(
            derive_key(&with_config, &key_fn, &vary),
            derive_key(&with_config, &key_fn, &[])
        );
    }

    #[test]
    fn custom_key_fn_overrides_the_default() {
        let a = parse(b"GET /a HTTP/1.1\r\nHost: t\r\n\r\n");
        let b = parse(b"GET /b HTTP/1.1\r\nHost: t\r\n\r\n");
        let constant: KeyFn = Arc::new(|_req: &Request| b"fixed".to_vec());
        assert_eq!(
            derive_key(&a, &constant, &[]),
            derive_key(&b, &constant, &[])
        );
    }

    #[test]
    fn base36_rendering() {
        assert_eq!(key_as_str(0), "0");
        assert_eq!(key_as_str(1), "1");
        assert_eq!(key_as_str(35), "z");
        assert_eq!(key_as_str(36), "10");
        assert_eq!(key_as_str(u64::MAX), "3w5e11264sgsf");
    }
}
