//! Middleware pipeline — composable before/after request handler logic.
//!
//! An ordered stack of handlers, each of which may pass a request through,
//! short-circuit with its own response, or decorate the downstream
//! response. Requests flow through the chain **by value**: a middleware may
//! rewrite the request (the cache layer, for instance, normalizes the query
//! string and strips its refresh parameter) before handing it on.
//!
//! ## Core types
//!
//! - [`Middleware`] — trait implemented by all middleware.
//! - [`Next`] — cursor into the remaining chain; call [`Next::run`] to
//!   advance to the next layer.
//! - [`Handler`] — type-erased, cheaply-cloneable middleware function.
//! - [`from_middleware`] — converts a [`Middleware`] trait object into a
//!   [`Handler`].
//! - [`handler`] — adapts a terminal `async fn(Request) -> Response` into a
//!   [`Handler`], for the innermost layer of the chain.

use std::{future::Future, pin::Pin, sync::Arc};

use crate::{Request, Response, StatusCode};

/// A type-erased, reference-counted middleware function.
///
/// Every entry in the middleware stack is stored as a `Handler`. The
/// [`Arc`] wrapper makes handlers cheap to clone so that [`Next`] can
/// advance through the chain without copying closures.
pub type Handler = Arc<
    dyn Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
        + Send
        + Sync
        + 'static,
>;

/// A cursor into the remaining middleware chain for a single request.
///
/// `Next` is consumed by [`run`](Self::run), so it cannot be invoked more
/// than once per middleware invocation. When the chain is exhausted without
/// any layer producing a response, a `500` fallback is returned.
///
/// # Examples
///
/// ```
/// use recache::middleware::{handler, Next};
/// use recache::{Request, Response, StatusCode};
///
/// #[tokio::main]
/// async fn main() {
///     let chain = vec![handler(|_req| async {
///         Response::new(StatusCode::OK).body("hi")
///     })];
///     let (request, _) =
///         Request::parse(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();
///     let response = Next::new(chain).run(request).await;
///     assert_eq!(response.status(), StatusCode::OK);
/// }
/// ```
pub struct Next {
    chain: Vec<Handler>,
    // Position of the next handler to invoke.
    index: usize,
}

impl Next {
    /// Creates a `Next` positioned at the start of the given chain.
    pub fn new(chain: Vec<Handler>) -> Self {
        Self { chain, index: 0 }
    }

    /// Invokes the next handler in the chain and returns its response.
    ///
    /// If no handler remains, a `500 Internal Server Error` response is
    /// returned as a safe fallback.
    pub async fn run(mut self, request: Request) -> Response {
        if self.index < self.chain.len() {
            let current = self.chain[self.index].clone();
            self.index += 1;
            current(request, self).await
        } else {
            Response::new(StatusCode::INTERNAL_SERVER_ERROR)
                .body("no handler produced a response")
        }
    }
}

/// The core trait for all middleware.
///
/// Implementors receive the [`Request`] by value and a [`Next`] cursor.
/// They may:
///
/// - **Pass through** — call `next.run(request).await` unchanged.
/// - **Short-circuit** — return a [`Response`] without calling `next`.
/// - **Decorate** — forward, then inspect or modify the returned response.
///
/// Implementations must be `Send + Sync` (shared across Tokio tasks) and
/// `handle` must return a pinned, `Send` future.
pub trait Middleware: Send + Sync {
    /// Handle the request and optionally delegate to the next layer.
    fn handle(
        &self,
        request: Request,
        next: Next,
    ) -> Pin<Box<dyn Future<Output = Response> + Send>>;
}

/// Converts a [`Middleware`] implementation into a [`Handler`].
pub fn from_middleware<M>(middleware: Arc<M>) -> Handler
where
    M: Middleware + 'static,
{
    Arc::new(move |request: Request, next: Next| middleware.handle(request, next))
}

/// Adapts a terminal request handler into a [`Handler`].
///
/// The resulting handler ignores the rest of the chain; place it last.
pub fn handler<H, F>(f: H) -> Handler
where
    H: Fn(Request) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    let f = Arc::new(f);
    Arc::new(move |request: Request, _next: Next| {
        let f = Arc::clone(&f);
        Box::pin(async move { f(request).await })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &[u8]) -> Request {
        Request::parse(raw).unwrap().0
    }

    #[tokio::test]
    async fn exhausted_chain_falls_back_to_500() {
        let response = Next::new(Vec::new())
            .run(parse(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"))
            .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn terminal_handler_short_circuits() {
        let chain = vec![handler(|req: Request| async move {
            Response::new(StatusCode::OK).body(req.path().to_owned())
        })];
        let response = Next::new(chain)
            .run(parse(b"GET /echo HTTP/1.1\r\nHost: x\r\n\r\n"))
            .await;
        assert_eq!(response.payload(), b"/echo");
    }

    #[tokio::test]
    async fn middleware_can_rewrite_the_request() {
        struct StripMarker;

        impl Middleware for StripMarker {
            fn handle(
                &self,
                mut request: Request,
                next: Next,
            ) -> Pin<Box<dyn Future<Output = Response> + Send>> {
                Box::pin(async move {
                    request.remove_query_param("marker");
                    next.run(request).await
                })
            }
        }

        let chain = vec![
            from_middleware(Arc::new(StripMarker)),
            handler(|req: Request| async move {
                Response::new(StatusCode::OK).body(req.url())
            }),
        ];
        let response = Next::new(chain)
            .run(parse(b"GET /a?marker=1&keep=2 HTTP/1.1\r\nHost: x\r\n\r\n"))
            .await;
        assert_eq!(response.payload(), b"/a?keep=2");
    }
}
