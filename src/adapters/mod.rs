// Adapters layer: concrete implementations for external systems (job sites, http, cache, storage).

pub mod cache;
pub mod http;
#[cfg(feature = "redis-cache")]
pub mod redis_cache;
pub mod sources;
pub mod store;
