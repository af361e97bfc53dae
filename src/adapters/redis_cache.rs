//! Redis-backed result cache, shared between processes.

use crate::domain::ports::Cache;
use crate::utils::error::{AggregatorError, Result};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde_json::Value;
use std::time::Duration;

const KEY_PREFIX: &str = "job-aggregator:";

pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connects and pings; callers fall back to no cache when this fails.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).map_err(|e| AggregatorError::CacheError {
            message: format!("Redis connection error: {}", e),
        })?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AggregatorError::CacheError {
                message: format!("Redis connection manager error: {}", e),
            })?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| AggregatorError::CacheError {
                message: format!("Redis ping failed: {}", e),
            })?;

        Ok(Self { conn })
    }

    fn namespaced(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }
}

impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match conn.get(Self::namespaced(key)).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Redis get failed, treating as miss: {}", e);
                return None;
            }
        };
        raw.and_then(|s| serde_json::from_str(&s).ok())
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let payload = match serde_json::to_string(&value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Cache value not serializable: {}", e);
                return;
            }
        };

        let mut conn = self.conn.clone();
        let result: redis::RedisResult<()> = conn
            .set_ex(Self::namespaced(key), payload, ttl.as_secs().max(1))
            .await;
        if let Err(e) = result {
            tracing::warn!("Redis set failed, result not cached: {}", e);
        }
    }
}
