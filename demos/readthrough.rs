//! Read-through caching demo.
//!
//! Builds a middleware chain with an in-memory adapter in front of a slow
//! handler, then pushes a handful of requests through it: a cold miss, a
//! warm hit, and a forced refresh. Run with:
//!
//! ```text
//! RUST_LOG=recache=debug cargo run --example readthrough
//! ```

use std::sync::Arc;
use std::time::Duration;

use recache::cache::{CacheMiddleware, MemoryAdapter};
use recache::middleware::{Handler, Next, from_middleware, handler};
use recache::{Request, Response, StatusCode};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recache=debug".into()),
        )
        .init();

    let adapter = Arc::new(MemoryAdapter::new());
    let cache = CacheMiddleware::builder()
        .adapter(adapter)
        .ttl(Duration::from_secs(30))
        .refresh_param("_refresh")
        .expires_header(true)
        .build()
        .expect("valid cache configuration");

    let chain: Vec<Handler> = vec![
        from_middleware(Arc::new(cache)),
        handler(|req: Request| async move {
            // Stand-in for an expensive upstream computation.
            tokio::time::sleep(Duration::from_millis(150)).await;
            Response::new(StatusCode::OK)
                .header("Content-Type", "text/plain")
                .body(format!("report for {}", req.path()))
        }),
    ];

    for raw in [
        &b"GET /report?week=32 HTTP/1.1\r\nHost: localhost\r\n\r\n"[..],
        &b"GET /report?week=32 HTTP/1.1\r\nHost: localhost\r\n\r\n"[..],
        &b"GET /report?week=32&_refresh=1 HTTP/1.1\r\nHost: localhost\r\n\r\n"[..],
        &b"GET /report?week=32 HTTP/1.1\r\nHost: localhost\r\n\r\n"[..],
    ] {
        let (request, _) = Request::parse(raw).expect("well-formed request");
        let url = request.url();
        let started = std::time::Instant::now();
        let response = Next::new(chain.clone()).run(request).await;
        println!(
            "{url} -> {} in {:?} ({} bytes)",
            response.status(),
            started.elapsed(),
            response.payload().len()
        );
    }
}
