//! HTTP/1.1 request parsing using the [`httparse`] crate.
//!
//! The query string is held as an ordered multi-value pair list rather than
//! a map: cache-key derivation must see repeated parameters (`?x=2&x=1`)
//! exactly as sent, and must be able to re-order values within a parameter
//! without disturbing anything else.

use bytes::Bytes;
use thiserror::Error;

use super::{Headers, Method};

/// Errors that can occur while parsing an HTTP/1.1 request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is incomplete — more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// A fully parsed HTTP/1.1 request.
///
/// Created by [`Request::parse`] from a raw byte buffer. The body is stored
/// as a [`Bytes`] buffer, so inspecting it (for example while deriving a
/// cache key) never consumes it.
///
/// Query parameter values are kept verbatim — no percent- or plus-decoding.
/// Decoding is the handler's concern; the cache layer fingerprints the bytes
/// the client actually sent.
///
/// # Examples
///
/// ```
/// use recache::http::Request;
///
/// let raw = b"GET /hello?name=world HTTP/1.1\r\nHost: localhost\r\n\r\n";
/// let (request, _offset) = Request::parse(raw).unwrap();
///
/// assert_eq!(request.method().as_str(), "GET");
/// assert_eq!(request.path(), "/hello");
/// assert_eq!(request.query_param("name"), Some("world"));
/// assert_eq!(request.url(), "/hello?name=world");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Maximum number of headers we support per request.
    const MAX_HEADERS: usize = 64;

    /// Parse a raw HTTP/1.1 request from a byte slice.
    ///
    /// Returns the parsed `Request` and the byte offset at which the body
    /// begins in `buf` (immediately after the `\r\n\r\n` header terminator).
    /// Everything past that offset is taken as the body.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Incomplete`] — more data is needed to complete the request headers.
    /// - [`RequestError::Parse`] — the data is malformed and cannot be parsed.
    /// - [`RequestError::MissingField`] — a required field (method, path) is absent.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), RequestError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw_req = httparse::Request::new(&mut headers);

        let body_offset = match raw_req.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(RequestError::Incomplete),
        };

        let method: Method = raw_req
            .method
            .ok_or(RequestError::MissingField { field: "method" })?
            .parse()
            .unwrap(); // Infallible

        let raw_path = raw_req
            .path
            .ok_or(RequestError::MissingField { field: "path" })?;

        let (path, query) = match raw_path.find('?') {
            Some(pos) => (
                raw_path[..pos].to_owned(),
                parse_query_pairs(&raw_path[pos + 1..]),
            ),
            None => (raw_path.to_owned(), Vec::new()),
        };

        let mut header_map = Headers::with_capacity(raw_req.headers.len());
        for header in raw_req.headers.iter() {
            if let Ok(value) = std::str::from_utf8(header.value) {
                header_map.append(header.name, value);
            }
        }

        let body = Bytes::copy_from_slice(&buf[body_offset..]);

        Ok((
            Self {
                method,
                path,
                query,
                headers: header_map,
                body,
            },
            body_offset,
        ))
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without the query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the request body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the query as ordered `(name, value)` pairs, duplicates included.
    pub fn query_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reconstructs the query string from the current pairs, or `None` when empty.
    pub fn query_string(&self) -> Option<String> {
        if self.query.is_empty() {
            return None;
        }
        let joined = self
            .query
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        Some(joined)
    }

    /// Returns the full request URL: path plus the current query string.
    pub fn url(&self) -> String {
        match self.query_string() {
            Some(query) => format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// Returns the first value for a query parameter, or `None`.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all values for a query parameter in their current order.
    pub fn query_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if the query contains the parameter at least once.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query.iter().any(|(k, _)| k == name)
    }

    /// Removes every occurrence of a query parameter.
    ///
    /// Returns `true` if any pairs were removed.
    pub fn remove_query_param(&mut self, name: &str) -> bool {
        let before = self.query.len();
        self.query.retain(|(k, _)| k != name);
        self.query.len() < before
    }

    /// Sorts the values within each query parameter lexicographically.
    ///
    /// Parameter order (first occurrence) and name case are left untouched,
    /// so `?x=2&y=9&x=1` becomes `?x=1&x=2&y=9`. Two requests differing only
    /// in the internal ordering of a repeated parameter's values end up with
    /// identical URLs and therefore identical cache keys.
    pub fn normalize_query(&mut self) {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (name, value) in self.query.drain(..) {
            match grouped.iter_mut().find(|(n, _)| *n == name) {
                Some((_, values)) => values.push(value),
                None => grouped.push((name, vec![value])),
            }
        }
        for (_, values) in &mut grouped {
            values.sort_unstable();
        }
        self.query = grouped
            .into_iter()
            .flat_map(|(name, values)| {
                values.into_iter().map(move |value| (name.clone(), value))
            })
            .collect();
    }
}

/// Splits a query string into `(name, value)` pairs, preserving order and
/// duplicates. A parameter without `=` gets an empty value.
fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let name = parts.next().unwrap_or("").to_owned();
            let value = parts.next().unwrap_or("").to_owned();
            (name, value)
        })
        .collect()
}
