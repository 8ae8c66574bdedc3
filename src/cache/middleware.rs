//! Response-caching middleware — the orchestrator tying key derivation,
//! freshness, refresh, and the storage adapter together around the
//! downstream handler.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::cache::adapter::Adapter;
use crate::cache::entry::Entry;
use crate::cache::key::{KeyFn, default_key, derive_key, key_as_str};
use crate::http::{Method, Request, Response, StatusCode};
use crate::middleware::{Middleware, Next};

/// Errors rejected at construction time by [`CacheMiddlewareBuilder::build`].
///
/// Nothing is ever partially configured: `build` either returns a ready
/// middleware or one of these.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No storage adapter was supplied.
    #[error("no storage adapter configured")]
    MissingAdapter,

    /// The time-to-live was missing or not positive.
    #[error("ttl must be set and greater than zero")]
    InvalidTtl,

    /// A method outside the GET/POST allow-list was requested.
    #[error("cannot cache {0} requests: only GET and POST are cacheable")]
    UnsupportedMethod(String),
}

/// Caching middleware for the request pipeline.
///
/// Sits in front of a handler and serves repeated requests from a storage
/// adapter instead of recomputing them.
///
/// # Behavior
///
/// - Requests whose method is not in the cacheable set pass straight
///   through, untouched.
/// - For cacheable requests the query string is normalized (values within a
///   repeated parameter are sorted) and a 64-bit key is derived from the
///   key-generation function's output plus any configured vary headers.
/// - If the configured refresh parameter is present, it is stripped from
///   the query, the entry under the recomputed key is released, and the
///   request is forwarded; the handler never sees the parameter.
/// - A fresh stored entry is served directly: its headers are replayed
///   (values for one name joined with commas), an `Expires` header is added
///   when enabled, a `Vary` header listing the configured vary names is
///   added when any are set, and the cached payload becomes the body. The
///   hit is recorded back into storage (last access, frequency).
/// - Otherwise the request is forwarded, and the handler's response is
///   stored under the key — unless its status is 400 or above. Errors are
///   never cached.
///
/// Adapter calls are best-effort by contract; no cache-layer problem ever
/// surfaces as an HTTP error. The worst case is a miss.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use recache::cache::{CacheMiddleware, MemoryAdapter};
///
/// let cache = CacheMiddleware::builder()
///     .adapter(Arc::new(MemoryAdapter::new()))
///     .ttl(Duration::from_secs(60))
///     .refresh_param("_refresh")
///     .vary(["Accept-Language"])
///     .expires_header(true)
///     .build()
///     .unwrap();
/// ```
pub struct CacheMiddleware {
    adapter: Arc<dyn Adapter>,
    ttl: Duration,
    refresh_param: Option<String>,
    methods: Vec<Method>,
    vary: Vec<String>,
    // Comma-joined vary names, precomputed for the hit path.
    vary_names: Option<String>,
    write_expires_header: bool,
    key_fn: KeyFn,
}

impl CacheMiddleware {
    /// Starts building a `CacheMiddleware`.
    pub fn builder() -> CacheMiddlewareBuilder {
        CacheMiddlewareBuilder::default()
    }
}

/// Builder for [`CacheMiddleware`].
///
/// The adapter and a positive TTL are required; everything else has a
/// default. See [`CacheMiddleware`] for the resulting behavior.
///
/// | Setting          | Default                      |
/// |------------------|------------------------------|
/// | Methods          | `GET` only                   |
/// | Refresh param    | disabled                     |
/// | Vary headers     | none                         |
/// | `Expires` header | not emitted                  |
/// | Key function     | URL (+ body for POST writes) |
#[derive(Default)]
pub struct CacheMiddlewareBuilder {
    adapter: Option<Arc<dyn Adapter>>,
    ttl: Option<Duration>,
    refresh_param: Option<String>,
    methods: Option<Vec<Method>>,
    vary: Vec<String>,
    write_expires_header: bool,
    key_fn: Option<KeyFn>,
}

impl CacheMiddlewareBuilder {
    /// Sets the storage adapter. Required.
    #[must_use]
    pub fn adapter(mut self, adapter: Arc<dyn Adapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Sets how long each stored response stays fresh. Required, and must
    /// be greater than zero.
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Names the query parameter that forces invalidation-and-regeneration
    /// of the matching entry. Disabled when unset.
    #[must_use]
    pub fn refresh_param(mut self, name: impl Into<String>) -> Self {
        self.refresh_param = Some(name.into());
        self
    }

    /// Sets the cacheable methods. Only GET and POST are accepted; the
    /// narrow POST allowance exists for POST-as-read APIs where the body
    /// selects the variant.
    #[must_use]
    pub fn methods(mut self, methods: Vec<Method>) -> Self {
        self.methods = Some(methods);
        self
    }

    /// Adds request headers whose values participate in key derivation,
    /// producing independent entries per distinct value.
    #[must_use]
    pub fn vary<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vary.extend(headers.into_iter().map(Into::into));
        self
    }

    /// Controls whether hits carry an `Expires` header with the entry's
    /// expiration in HTTP date format. Off by default.
    #[must_use]
    pub fn expires_header(mut self, enabled: bool) -> Self {
        self.write_expires_header = enabled;
        self
    }

    /// Replaces the default key-generation function.
    #[must_use]
    pub fn key_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Request) -> Vec<u8> + Send + Sync + 'static,
    {
        self.key_fn = Some(Arc::new(f));
        self
    }

    /// Validates the configuration and builds the middleware.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingAdapter`] — no adapter supplied.
    /// - [`ConfigError::InvalidTtl`] — TTL missing or zero.
    /// - [`ConfigError::UnsupportedMethod`] — a method other than GET or POST.
    pub fn build(self) -> Result<CacheMiddleware, ConfigError> {
        let adapter = self.adapter.ok_or(ConfigError::MissingAdapter)?;
        let ttl = self
            .ttl
            .filter(|ttl| !ttl.is_zero())
            .ok_or(ConfigError::InvalidTtl)?;

        let methods = self.methods.unwrap_or_else(|| vec![Method::Get]);
        for method in &methods {
            if !matches!(method, Method::Get | Method::Post) {
                return Err(ConfigError::UnsupportedMethod(method.as_str().to_owned()));
            }
        }

        let vary_names = if self.vary.is_empty() {
            None
        } else {
            Some(self.vary.join(","))
        };

        Ok(CacheMiddleware {
            adapter,
            ttl,
            refresh_param: self.refresh_param,
            methods,
            vary: self.vary,
            vary_names,
            write_expires_header: self.write_expires_header,
            key_fn: self.key_fn.unwrap_or_else(|| Arc::new(default_key)),
        })
    }
}

impl Middleware for CacheMiddleware {
    /// Run one request through the hit/miss/refresh state machine.
    ///
    /// Responses are first-class values in this pipeline, so capturing the
    /// downstream status, headers, and body is just reading them off the
    /// `Response` that `next.run` returns — the response itself is passed
    /// up unchanged.
    fn handle(
        &self,
        request: Request,
        next: Next,
    ) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        let adapter = Arc::clone(&self.adapter);
        let ttl = self.ttl;
        let refresh_param = self.refresh_param.clone();
        let methods = self.methods.clone();
        let vary = self.vary.clone();
        let vary_names = self.vary_names.clone();
        let write_expires_header = self.write_expires_header;
        let key_fn = Arc::clone(&self.key_fn);

        Box::pin(async move {
            let mut request = request;

            if !methods.contains(request.method()) {
                trace!(method = %request.method(), path = request.path(), "method not cacheable, bypassing");
                return next.run(request).await;
            }

            request.normalize_query();
            let mut key = derive_key(&request, &key_fn, &vary);

            let refreshing = refresh_param
                .as_deref()
                .is_some_and(|name| request.has_query_param(name));

            if refreshing {
                if let Some(name) = refresh_param.as_deref() {
                    request.remove_query_param(name);
                }
                // The marker must not leak into the key or the handler's
                // view of the URL, so the key is recomputed after removal.
                key = derive_key(&request, &key_fn, &vary);
                adapter.release(key);
                debug!(key = %key_as_str(key), url = %request.url(), "forced refresh");
            } else {
                let now = SystemTime::now();
                let stored = adapter.get(key).unwrap_or_default();
                let mut entry = Entry::decode(&stored);

                if entry.is_fresh(now) {
                    entry.touch(now);
                    adapter.set(key, Bytes::from(entry.encode()), entry.expires_at);
                    debug!(key = %key_as_str(key), frequency = entry.frequency, "cache hit");

                    let mut response = Response::new(StatusCode::OK);
                    for name in entry.headers.names() {
                        if let Some(joined) = entry.headers.values_joined(name, ",") {
                            response.set_header(name, joined);
                        }
                    }
                    if write_expires_header {
                        response.set_header("Expires", httpdate::fmt_http_date(entry.expires_at));
                    }
                    if let Some(names) = &vary_names {
                        response.set_header("Vary", names.clone());
                    }
                    return response.body_bytes(entry.payload);
                }

                // Absent and corrupt decode to the same always-stale zero
                // entry; either way the slot is dead.
                adapter.release(key);
                debug!(key = %key_as_str(key), "cache miss");
            }

            let started = Instant::now();
            let response = next.run(request).await;
            let elapsed = started.elapsed();

            if response.status().is_error() {
                debug!(
                    key = %key_as_str(key),
                    status = response.status().as_u16(),
                    ?elapsed,
                    "error response not stored"
                );
            } else {
                let now = SystemTime::now();
                let expires_at = now + ttl;
                let entry = Entry::new(
                    response.payload().to_vec(),
                    response.headers().clone(),
                    expires_at,
                    now,
                );
                adapter.set(key, Bytes::from(entry.encode()), expires_at);
                debug!(
                    key = %key_as_str(key),
                    status = response.status().as_u16(),
                    ?elapsed,
                    "stored fresh entry"
                );
            }

            response
        })
    }
}
