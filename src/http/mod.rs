//! HTTP message types the cache middleware operates on.
//!
//! This module provides the primitives the rest of the crate is built from:
//! [`Method`], [`StatusCode`], [`Headers`], [`Request`], and [`Response`].

pub mod headers;
pub mod method;
pub mod request;
pub mod response;
pub mod status;

pub use headers::Headers;
pub use method::Method;
pub use request::Request;
pub use response::Response;
pub use status::StatusCode;
