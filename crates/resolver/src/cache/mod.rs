pub mod entry;
pub mod key;
pub mod memory;

use async_trait::async_trait;
use std::time::Duration;

pub use key::cache_key;
pub use memory::MemoryCache;

/// Any backend offering `get`/`set` can hold the result cache.
///
/// Values are full decoded responses enriched with `ttl` and `expires`;
/// string-only backends store the JSON text and hand back a
/// `Value::String`, which the read path parses. `ttl` on `set` is the
/// entry's lifetime, for stores that support their own expiry directives.
///
/// Store failures must stay inside the implementation (log and return
/// `None`/unit): the cache is never part of the resolve failure surface.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration);
}
