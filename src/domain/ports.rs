use crate::domain::model::{JobFilter, JobRecord, RawCard, SavedJob, SavedPage, StatusUpdate};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// One external job site.
///
/// `scrape` returns at most `limit` cards, each already passing
/// [`RawCard::is_acceptable`]. Network and markup problems are recovered
/// inside the adapter; an `Err` is reserved for failures that leave the
/// adapter unable to run at all.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Registry key, lowercase (e.g. `linkedin`).
    fn key(&self) -> &'static str;

    /// Display name stamped on every record (e.g. `LinkedIn`).
    fn source_name(&self) -> &'static str;

    async fn scrape(&self, query: &str, location: &str, limit: usize) -> Result<Vec<RawCard>>;
}

/// Key-value store with TTL used to memoize scrape responses.
///
/// Implementations swallow their own backend failures: an unreachable store
/// reads as a miss and writes as a no-op.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Option<Value>> + Send;
    fn set(
        &self,
        key: &str,
        value: Value,
        ttl: Duration,
    ) -> impl std::future::Future<Output = ()> + Send;
}

/// Durable storage of jobs a user chose to keep.
pub trait JobStore: Send + Sync {
    fn create(&self, job: JobRecord) -> impl std::future::Future<Output = Result<SavedJob>> + Send;
    fn query(
        &self,
        filter: &JobFilter,
    ) -> impl std::future::Future<Output = Result<SavedPage>> + Send;
    fn update_status(
        &self,
        id: i64,
        update: &StatusUpdate,
    ) -> impl std::future::Future<Output = Result<SavedJob>> + Send;
}
