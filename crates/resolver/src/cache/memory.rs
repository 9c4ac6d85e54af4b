use super::CacheStore;
use async_trait::async_trait;
use compact_str::CompactString;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::time::Duration;

/// The bundled in-process store. Expiry is enforced by the read-side decay
/// in the cache layer, so entries are simply overwritten in place; `ttl`
/// only matters to stores with their own expiry machinery.
#[derive(Default)]
pub struct MemoryCache {
    map: DashMap<CompactString, serde_json::Value, FxBuildHasher>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.map.get(key).map(|entry| entry.value().clone())
    }

    async fn set(&self, key: &str, value: serde_json::Value, _ttl: Duration) {
        self.map.insert(CompactString::from(key), value);
    }
}
