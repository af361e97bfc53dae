//! Result caches. A missing or broken backend behaves exactly like a cache
//! that never hits.

use crate::domain::ports::Cache;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[cfg(feature = "redis-cache")]
use crate::adapters::redis_cache::RedisCache;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Builds `prefix:k1=v1:k2=v2...` with keys in lexicographic order, so the
/// order parts are added in never changes the key.
#[derive(Debug, Clone)]
pub struct CacheKey {
    prefix: String,
    parts: BTreeMap<String, String>,
}

impl CacheKey {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            parts: BTreeMap::new(),
        }
    }

    pub fn part(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.parts.insert(name.into(), value.to_string());
        self
    }

    pub fn build(&self) -> String {
        let stable = self
            .parts
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(":");
        format!("{}:{}", self.prefix, stable)
    }
}

/// Key for `parts` given in any order.
pub fn build_key<'a, I>(prefix: &str, parts: I) -> String
where
    I: IntoIterator<Item = (&'a str, String)>,
{
    parts
        .into_iter()
        .fold(CacheKey::new(prefix), |key, (name, value)| key.part(name, value))
        .build()
}

/// Always misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl Cache for NoCache {
    async fn get(&self, _key: &str) -> Option<Value> {
        None
    }

    async fn set(&self, _key: &str, _value: Value, _ttl: Duration) {}
}

/// Process-local TTL map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (Value, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, expires)| *expires > now)
            .count()
    }
}

impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires)) if *expires > now => return Some(value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.entries.write().await.remove(key);
        None
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires)| *expires > now);
        entries.insert(key.to_string(), (value, now + ttl));
    }
}

/// The cache selected by configuration.
pub enum CacheBackend {
    Disabled(NoCache),
    Memory(MemoryCache),
    #[cfg(feature = "redis-cache")]
    Redis(RedisCache),
}

impl CacheBackend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disabled(_) => "none",
            Self::Memory(_) => "memory",
            #[cfg(feature = "redis-cache")]
            Self::Redis(_) => "redis",
        }
    }
}

impl Cache for CacheBackend {
    async fn get(&self, key: &str) -> Option<Value> {
        match self {
            Self::Disabled(cache) => cache.get(key).await,
            Self::Memory(cache) => cache.get(key).await,
            #[cfg(feature = "redis-cache")]
            Self::Redis(cache) => cache.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        match self {
            Self::Disabled(cache) => cache.set(key, value, ttl).await,
            Self::Memory(cache) => cache.set(key, value, ttl).await,
            #[cfg(feature = "redis-cache")]
            Self::Redis(cache) => cache.set(key, value, ttl).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_is_independent_of_part_order() {
        let a = CacheKey::new("scrape").part("query", "a").part("limit", 5).build();
        let b = CacheKey::new("scrape").part("limit", 5).part("query", "a").build();

        assert_eq!(a, b);
        assert_eq!(a, "scrape:limit=5:query=a");
    }

    #[test]
    fn test_build_key_sorts_parts() {
        let key = build_key(
            "scrape",
            [
                ("sources", "linkedin,careerjet".to_string()),
                ("location", "pune".to_string()),
            ],
        );
        assert_eq!(key, "scrape:location=pune:sources=linkedin,careerjet");
    }

    #[tokio::test]
    async fn test_no_cache_always_misses() {
        let cache = NoCache;
        cache.set("k", json!({"a": 1}), DEFAULT_TTL).await;
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip_and_expiry() {
        let cache = MemoryCache::new();
        cache.set("fresh", json!([1, 2, 3]), DEFAULT_TTL).await;
        cache.set("stale", json!("gone"), Duration::from_millis(20)).await;

        assert_eq!(cache.get("fresh").await, Some(json!([1, 2, 3])));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.get("stale").await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_writes_purge_expired_entries() {
        let cache = MemoryCache::new();
        for i in 0..5 {
            cache
                .set(&format!("old-{}", i), json!(i), Duration::from_millis(10))
                .await;
        }
        tokio::time::sleep(Duration::from_millis(30)).await;

        cache.set("new", json!("kept"), DEFAULT_TTL).await;

        let stored = cache.entries.read().await;
        assert_eq!(stored.len(), 1);
        assert!(stored.contains_key("new"));
    }
}
