use crate::adapters::cache::{build_key, DEFAULT_TTL};
use crate::core::aggregator::Aggregator;
use crate::domain::model::{
    AggregationRequest, JobFilter, JobRecord, SavedJob, SavedPage, ScrapeResponse, StatusUpdate,
};
use crate::domain::ports::{Cache, JobStore};
use crate::utils::error::Result;
use crate::utils::validation::{validate_job_url, validate_non_empty_string};
use std::time::Duration;

pub const SCRAPE_CACHE_PREFIX: &str = "scrape";
pub const DEFAULT_SOURCES: [&str; 3] = ["linkedin", "careerjet", "timesjobs"];
pub const DEFAULT_QUERY: &str = "python developer";
pub const DEFAULT_LOCATION: &str = "pune";
pub const DEFAULT_LIMIT: usize = 10;

/// What the request-routing layer talks to: cached scraping plus saved-job curation.
pub struct JobService<C: Cache, S: JobStore> {
    aggregator: Aggregator,
    cache: C,
    store: S,
    cache_ttl: Duration,
    default_sources: Vec<String>,
}

impl<C: Cache, S: JobStore> JobService<C, S> {
    pub fn new(aggregator: Aggregator, cache: C, store: S) -> Self {
        Self {
            aggregator,
            cache,
            store,
            cache_ttl: DEFAULT_TTL,
            default_sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_default_sources(mut self, sources: Vec<String>) -> Self {
        self.default_sources = sources;
        self
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Aggregates `sources` (or the defaults when empty), memoized by request.
    pub async fn scrape(
        &self,
        query: &str,
        location: &str,
        limit: usize,
        sources: &[String],
    ) -> ScrapeResponse {
        let sources = if sources.iter().all(|s| s.trim().is_empty()) {
            self.default_sources.as_slice()
        } else {
            sources
        };
        let request = AggregationRequest::new(query, location, limit, sources);

        let key = build_key(
            SCRAPE_CACHE_PREFIX,
            [
                ("query", request.query().to_string()),
                ("location", request.location().to_string()),
                ("limit", request.limit().to_string()),
                ("sources", request.sources().join(",")),
            ],
        );

        if let Some(cached) = self.cache.get(&key).await {
            match serde_json::from_value::<ScrapeResponse>(cached) {
                Ok(response) => {
                    tracing::debug!("Cache hit for {}", key);
                    return response;
                }
                Err(e) => tracing::warn!("Ignoring unreadable cache entry {}: {}", key, e),
            }
        }

        let jobs = self.aggregator.aggregate(&request).await;
        let response = ScrapeResponse {
            total_jobs: jobs.len(),
            jobs,
            query: request.query().to_string(),
            location: request.location().to_string(),
            sources: request.sources().to_vec(),
            per_source_limit: request.limit(),
        };

        match serde_json::to_value(&response) {
            Ok(value) => self.cache.set(&key, value, self.cache_ttl).await,
            Err(e) => tracing::warn!("Scrape response not cached: {}", e),
        }

        response
    }

    pub async fn save_job(&self, job: JobRecord) -> Result<SavedJob> {
        validate_non_empty_string("title", &job.title)?;
        validate_job_url(&job.url)?;

        let saved = self.store.create(job).await?;
        tracing::info!("Saved job {} ({})", saved.id, saved.job.title);
        Ok(saved)
    }

    pub async fn save_all(&self, jobs: Vec<JobRecord>) -> Result<Vec<SavedJob>> {
        let mut saved = Vec::with_capacity(jobs.len());
        for job in jobs {
            saved.push(self.save_job(job).await?);
        }
        Ok(saved)
    }

    pub async fn saved_jobs(&self, filter: &JobFilter) -> Result<SavedPage> {
        self.store.query(filter).await
    }

    pub async fn update_status(&self, id: i64, update: &StatusUpdate) -> Result<SavedJob> {
        let saved = self.store.update_status(id, update).await?;
        tracing::info!(
            "Updated job {}: liked={}, applied={}",
            saved.id,
            saved.job.liked,
            saved.job.applied
        );
        Ok(saved)
    }
}
