//! Fan-out/fan-in over the selected sources.
//!
//! Every resolved adapter runs as its own tokio task with the same query,
//! location and per-source limit. All tasks are awaited; a task that errors
//! or panics contributes nothing and does not disturb the others. Results
//! are concatenated in resolution order, each block keeping its adapter's
//! own ordering.

use crate::core::normalizer::normalize;
use crate::core::registry::SourceRegistry;
use crate::domain::model::{AggregationRequest, JobRecord, RawCard};
use crate::utils::error::{AggregatorError, Result};
use futures::future::join_all;
use std::sync::Arc;

/// What one adapter produced during an aggregation call.
#[derive(Debug)]
pub struct SourceOutcome {
    pub key: &'static str,
    pub source_name: &'static str,
    pub result: Result<Vec<JobRecord>>,
}

impl SourceOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn record_count(&self) -> usize {
        self.result.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[derive(Clone)]
pub struct Aggregator {
    registry: Arc<SourceRegistry>,
}

impl Aggregator {
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Combined records of every adapter that succeeded.
    pub async fn aggregate(&self, request: &AggregationRequest) -> Vec<JobRecord> {
        self.aggregate_outcomes(request)
            .await
            .into_iter()
            .flat_map(|outcome| outcome.result.unwrap_or_default())
            .collect()
    }

    /// Per-adapter outcomes in resolution order. Empty, with no network
    /// activity, when no source resolves or the limit is zero.
    pub async fn aggregate_outcomes(&self, request: &AggregationRequest) -> Vec<SourceOutcome> {
        let adapters = self.registry.resolve(request.sources());
        if adapters.is_empty() || request.limit() == 0 {
            tracing::debug!(
                "Nothing to aggregate (sources: {:?}, limit: {})",
                request.sources(),
                request.limit()
            );
            return Vec::new();
        }

        let limit = request.limit();
        let handles = adapters.iter().map(|adapter| {
            let adapter = Arc::clone(adapter);
            let query = request.query().to_string();
            let location = request.location().to_string();
            tokio::spawn(async move { adapter.scrape(&query, &location, limit).await })
        });
        let joined = join_all(handles).await;

        let outcomes: Vec<SourceOutcome> = adapters
            .iter()
            .zip(joined)
            .map(|(adapter, joined)| {
                let result: Result<Vec<JobRecord>> = match joined {
                    Ok(Ok(cards)) => Ok(cards
                        .into_iter()
                        .filter(RawCard::is_acceptable)
                        .take(limit)
                        .map(|card| normalize(card, adapter.source_name(), request.location()))
                        .collect()),
                    Ok(Err(e)) => Err(AggregatorError::AdapterFailure {
                        source_name: adapter.source_name().to_string(),
                        message: e.to_string(),
                    }),
                    Err(e) => Err(AggregatorError::AdapterFailure {
                        source_name: adapter.source_name().to_string(),
                        message: if e.is_panic() {
                            "adapter task panicked".to_string()
                        } else {
                            e.to_string()
                        },
                    }),
                };

                match &result {
                    Ok(records) => tracing::debug!(
                        "{} returned {} records",
                        adapter.source_name(),
                        records.len()
                    ),
                    Err(e) => tracing::warn!("{}; contributing no records", e),
                }

                SourceOutcome {
                    key: adapter.key(),
                    source_name: adapter.source_name(),
                    result,
                }
            })
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        let total: usize = outcomes.iter().map(SourceOutcome::record_count).sum();
        tracing::info!(
            "Aggregated {} jobs from {} sources ({} failed)",
            total,
            outcomes.len(),
            failed
        );

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SourceAdapter;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    enum Behaviour {
        Produce(usize),
        Fail,
        Panic,
        Slow(Duration),
    }

    struct FakeSource {
        key: &'static str,
        name: &'static str,
        behaviour: Behaviour,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new(key: &'static str, name: &'static str, behaviour: Behaviour) -> Self {
            Self {
                key,
                name,
                behaviour,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    fn cards(key: &str, count: usize) -> Vec<RawCard> {
        (0..count)
            .map(|i| RawCard {
                title: format!("{} Title {}", key, i),
                company: format!("{} Co", key),
                location: String::new(),
                url: format!("https://example.com/{}/{}", key, i),
            })
            .collect()
    }

    #[async_trait]
    impl SourceAdapter for FakeSource {
        fn key(&self) -> &'static str {
            self.key
        }

        fn source_name(&self) -> &'static str {
            self.name
        }

        async fn scrape(&self, _query: &str, _location: &str, limit: usize) -> Result<Vec<RawCard>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Produce(available) => Ok(cards(self.key, limit.min(*available))),
                Behaviour::Fail => Err(AggregatorError::ConfigError {
                    message: "site layout unknown".to_string(),
                }),
                Behaviour::Panic => panic!("boom"),
                Behaviour::Slow(delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(cards(self.key, limit))
                }
            }
        }
    }

    fn aggregator(sources: Vec<FakeSource>) -> Aggregator {
        Aggregator::new(SourceRegistry::new(
            sources
                .into_iter()
                .map(|s| Arc::new(s) as Arc<dyn SourceAdapter>)
                .collect(),
        ))
    }

    #[tokio::test]
    async fn test_per_source_limit_and_block_order() {
        let aggregator = aggregator(vec![
            FakeSource::new("linkedin", "LinkedIn", Behaviour::Produce(50)),
            FakeSource::new("careerjet", "CareerJet", Behaviour::Produce(50)),
            FakeSource::new("timesjobs", "TimesJobs", Behaviour::Produce(50)),
        ]);
        let request = AggregationRequest::new(
            "python developer",
            "remote",
            7,
            ["careerjet", "linkedin", "timesjobs"],
        );

        let jobs = aggregator.aggregate(&request).await;

        assert_eq!(jobs.len(), 21);
        let sources: Vec<&str> = jobs.iter().map(|j| j.source.as_str()).collect();
        assert!(sources[..7].iter().all(|s| *s == "CareerJet"));
        assert!(sources[7..14].iter().all(|s| *s == "LinkedIn"));
        assert!(sources[14..].iter().all(|s| *s == "TimesJobs"));
        assert_eq!(jobs[0].title, "careerjet Title 0");
        assert_eq!(jobs[6].title, "careerjet Title 6");
        assert!(jobs.iter().all(|j| !j.liked && !j.applied && j.location == "Remote"));
    }

    #[tokio::test]
    async fn test_short_sources_contribute_what_they_have() {
        let aggregator = aggregator(vec![
            FakeSource::new("linkedin", "LinkedIn", Behaviour::Produce(3)),
            FakeSource::new("careerjet", "CareerJet", Behaviour::Produce(10)),
        ]);
        let request = AggregationRequest::new("rust", "Pune", 5, ["linkedin", "careerjet"]);

        let jobs = aggregator.aggregate(&request).await;
        assert_eq!(jobs.len(), 3 + 5);
        assert!(jobs.iter().all(|j| j.location == "Pune"));
    }

    #[tokio::test]
    async fn test_unknown_sources_never_call_adapters() {
        let source = FakeSource::new("linkedin", "LinkedIn", Behaviour::Produce(5));
        let calls = Arc::clone(&source.calls);
        let aggregator = aggregator(vec![source]);

        let request = AggregationRequest::new("rust", "Pune", 5, ["monster", "indeed"]);
        assert!(aggregator.aggregate(&request).await.is_empty());

        let request = AggregationRequest::new("rust", "Pune", 5, Vec::<String>::new());
        assert!(aggregator.aggregate(&request).await.is_empty());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_limit_skips_adapters() {
        let source = FakeSource::new("linkedin", "LinkedIn", Behaviour::Produce(5));
        let calls = Arc::clone(&source.calls);
        let aggregator = aggregator(vec![source]);

        let request = AggregationRequest::new("rust", "Pune", 0, ["linkedin"]);
        assert!(aggregator.aggregate(&request).await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_adapter_is_isolated() {
        let aggregator = aggregator(vec![
            FakeSource::new("linkedin", "LinkedIn", Behaviour::Produce(10)),
            FakeSource::new("careerjet", "CareerJet", Behaviour::Fail),
            FakeSource::new("timesjobs", "TimesJobs", Behaviour::Produce(10)),
        ]);
        let request =
            AggregationRequest::new("rust", "Pune", 4, ["linkedin", "careerjet", "timesjobs"]);

        let outcomes = aggregator.aggregate_outcomes(&request).await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].is_success());
        assert!(matches!(
            outcomes[1].result,
            Err(AggregatorError::AdapterFailure { .. })
        ));
        assert!(outcomes[2].is_success());

        let jobs = aggregator.aggregate(&request).await;
        assert_eq!(jobs.len(), 8);
        assert!(jobs.iter().all(|j| j.source != "CareerJet"));
    }

    #[tokio::test]
    async fn test_panicking_adapter_is_isolated() {
        let aggregator = aggregator(vec![
            FakeSource::new("linkedin", "LinkedIn", Behaviour::Panic),
            FakeSource::new("careerjet", "CareerJet", Behaviour::Produce(10)),
        ]);
        let request = AggregationRequest::new("rust", "Pune", 2, ["linkedin", "careerjet"]);

        let jobs = aggregator.aggregate(&request).await;
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.source == "CareerJet"));
    }

    #[tokio::test]
    async fn test_adapters_run_concurrently() {
        let delay = Duration::from_millis(300);
        let aggregator = aggregator(vec![
            FakeSource::new("a", "A", Behaviour::Slow(delay)),
            FakeSource::new("b", "B", Behaviour::Slow(delay)),
            FakeSource::new("c", "C", Behaviour::Slow(delay)),
        ]);
        let request = AggregationRequest::new("rust", "Pune", 1, ["a", "b", "c"]);

        let started = Instant::now();
        let jobs = aggregator.aggregate(&request).await;

        assert_eq!(jobs.len(), 3);
        assert!(started.elapsed() < delay * 2);
    }

    struct Sloppy;

    #[async_trait]
    impl SourceAdapter for Sloppy {
        fn key(&self) -> &'static str {
            "sloppy"
        }

        fn source_name(&self) -> &'static str {
            "Sloppy"
        }

        async fn scrape(&self, _query: &str, _location: &str, _limit: usize) -> Result<Vec<RawCard>> {
            let mut out = cards("sloppy", 5);
            out[1].url.clear();
            out[3].title.clear();
            Ok(out)
        }
    }

    #[tokio::test]
    async fn test_unacceptable_and_excess_cards_never_reach_output() {
        let aggregator = Aggregator::new(SourceRegistry::new(vec![Arc::new(Sloppy)]));
        let request = AggregationRequest::new("rust", "Pune", 2, ["sloppy"]);

        let jobs = aggregator.aggregate(&request).await;
        let titles: Vec<&str> = jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["sloppy Title 0", "sloppy Title 2"]);
    }
}
