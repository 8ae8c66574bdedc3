//! # recache
//!
//! Response-caching middleware for async HTTP services.
//!
//! The cache sits in a middleware chain in front of a request handler.
//! Repeated requests are served from a pluggable storage adapter; misses
//! fall through to the handler, whose successful responses are stored for
//! the configured time-to-live. A reserved query parameter can force
//! invalidation-and-regeneration of a single entry.
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use recache::cache::{CacheMiddleware, MemoryAdapter};
//! use recache::middleware::{Next, from_middleware, handler};
//! use recache::{Request, Response, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let adapter = Arc::new(MemoryAdapter::new());
//!     let cache = CacheMiddleware::builder()
//!         .adapter(adapter)
//!         .ttl(Duration::from_secs(60))
//!         .build()
//!         .expect("valid cache configuration");
//!
//!     let chain = vec![
//!         from_middleware(Arc::new(cache)),
//!         handler(|_req| async { Response::new(StatusCode::OK).body("hello") }),
//!     ];
//!
//!     let raw = b"GET /greet HTTP/1.1\r\nHost: localhost\r\n\r\n";
//!     let (request, _) = Request::parse(raw).expect("well-formed request");
//!     let response = Next::new(chain).run(request).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

pub mod cache;
pub mod http;
pub mod middleware;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use cache::{Adapter, CacheMiddleware, Entry, MemoryAdapter};
pub use http::{Headers, Method, Request, Response, StatusCode};
