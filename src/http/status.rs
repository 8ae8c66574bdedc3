//! HTTP response status codes.

use std::fmt;

use thiserror::Error;

/// Error returned when constructing a [`StatusCode`] from an out-of-range number.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid HTTP status code {0}: must be in 100..=999")]
pub struct InvalidStatusCode(pub u16);

/// An HTTP response status code.
///
/// Stored as a validated `u16` rather than an enum so every code in the
/// registry range is representable, including unregistered ones a handler
/// may legitimately emit. Well-known codes are available as associated
/// constants.
///
/// # Examples
///
/// ```
/// use recache::http::StatusCode;
///
/// assert_eq!(StatusCode::OK.as_u16(), 200);
/// assert_eq!(StatusCode::OK.canonical_reason(), "OK");
/// assert!(StatusCode::OK.is_success());
/// assert!(StatusCode::NOT_FOUND.is_error());
///
/// let unregistered = StatusCode::from_u16(399).unwrap();
/// assert!(!unregistered.is_error());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const CREATED: StatusCode = StatusCode(201);
    pub const ACCEPTED: StatusCode = StatusCode(202);
    pub const NO_CONTENT: StatusCode = StatusCode(204);

    pub const MOVED_PERMANENTLY: StatusCode = StatusCode(301);
    pub const FOUND: StatusCode = StatusCode(302);
    pub const NOT_MODIFIED: StatusCode = StatusCode(304);

    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const UNAUTHORIZED: StatusCode = StatusCode(401);
    pub const FORBIDDEN: StatusCode = StatusCode(403);
    pub const NOT_FOUND: StatusCode = StatusCode(404);
    pub const METHOD_NOT_ALLOWED: StatusCode = StatusCode(405);
    pub const CONFLICT: StatusCode = StatusCode(409);
    pub const PAYLOAD_TOO_LARGE: StatusCode = StatusCode(413);
    pub const UNPROCESSABLE_ENTITY: StatusCode = StatusCode(422);
    pub const TOO_MANY_REQUESTS: StatusCode = StatusCode(429);

    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);
    pub const NOT_IMPLEMENTED: StatusCode = StatusCode(501);
    pub const BAD_GATEWAY: StatusCode = StatusCode(502);
    pub const SERVICE_UNAVAILABLE: StatusCode = StatusCode(503);
    pub const GATEWAY_TIMEOUT: StatusCode = StatusCode(504);

    /// Constructs a `StatusCode` from a number, rejecting values outside `100..=999`.
    pub fn from_u16(code: u16) -> Result<StatusCode, InvalidStatusCode> {
        if (100..=999).contains(&code) {
            Ok(StatusCode(code))
        } else {
            Err(InvalidStatusCode(code))
        }
    }

    /// Returns the numeric status code.
    pub fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns the canonical reason phrase, or `""` for unregistered codes.
    pub fn canonical_reason(self) -> &'static str {
        match self.0 {
            200 => "OK",
            201 => "Created",
            202 => "Accepted",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            413 => "Payload Too Large",
            422 => "Unprocessable Entity",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            501 => "Not Implemented",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            504 => "Gateway Timeout",
            _ => "",
        }
    }

    /// Returns `true` for 2xx codes.
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Returns `true` for 3xx codes.
    pub fn is_redirection(self) -> bool {
        (300..400).contains(&self.0)
    }

    /// Returns `true` for any code numerically at or above 400.
    ///
    /// This is the storage gate: the middleware never caches a response
    /// whose status is an error.
    pub fn is_error(self) -> bool {
        self.0 >= 400
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.canonical_reason())
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_u16_accepts_registry_range() {
        assert_eq!(StatusCode::from_u16(200).unwrap(), StatusCode::OK);
        assert_eq!(StatusCode::from_u16(399).unwrap().as_u16(), 399);
        assert_eq!(StatusCode::from_u16(99), Err(InvalidStatusCode(99)));
        assert_eq!(StatusCode::from_u16(1000), Err(InvalidStatusCode(1000)));
    }

    #[test]
    fn error_boundary_is_400() {
        assert!(!StatusCode::from_u16(399).unwrap().is_error());
        assert!(StatusCode::BAD_REQUEST.is_error());
        assert!(StatusCode::INTERNAL_SERVER_ERROR.is_error());
    }

    #[test]
    fn unregistered_code_has_empty_reason() {
        assert_eq!(StatusCode::from_u16(399).unwrap().canonical_reason(), "");
    }
}
