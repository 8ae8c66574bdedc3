//! Response caching — middleware, key derivation, entry codec, and the
//! storage adapter seam.
//!
//! The flow per request: derive a 64-bit key from the request
//! ([`derive_key`]), look the key up through the [`Adapter`], decode the
//! stored bytes into an [`Entry`], and either serve the entry (if still
//! fresh) or forward to the downstream handler and store what comes back.
//! A configurable refresh query parameter forces
//! invalidation-and-regeneration for its key.
//!
//! [`CacheMiddleware`] is the orchestrator; everything else here is a
//! building block it composes. Storage policy — eviction, durability,
//! sharding — lives entirely behind the [`Adapter`] trait; the in-tree
//! [`MemoryAdapter`] is a deliberately policy-free reference
//! implementation.

pub mod adapter;
pub mod entry;
pub mod key;
pub mod middleware;

pub use adapter::{Adapter, MemoryAdapter};
pub use entry::Entry;
pub use key::{KeyFn, default_key, derive_key, key_as_str};
pub use middleware::{CacheMiddleware, CacheMiddlewareBuilder, ConfigError};
