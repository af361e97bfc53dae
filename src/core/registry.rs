use crate::adapters::http::FetchClient;
use crate::adapters::sources::{
    CareerJetAdapter, CareerJetConfig, LinkedInAdapter, LinkedInConfig, TimesJobsAdapter,
    TimesJobsConfig,
};
use crate::domain::ports::SourceAdapter;
use crate::utils::error::{AggregatorError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Per-site settings for the built-in adapters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub linkedin: LinkedInConfig,
    pub careerjet: CareerJetConfig,
    pub timesjobs: TimesJobsConfig,
}

/// Known adapters by key, in registration order. Built once, read-only afterwards.
#[derive(Clone)]
pub struct SourceRegistry {
    adapters: Vec<Arc<dyn SourceAdapter>>,
}

impl SourceRegistry {
    /// Later adapters reusing an existing key are ignored.
    pub fn new(adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        let mut unique: Vec<Arc<dyn SourceAdapter>> = Vec::with_capacity(adapters.len());
        for adapter in adapters {
            if unique.iter().any(|a| a.key() == adapter.key()) {
                tracing::warn!("Duplicate source '{}' ignored", adapter.key());
                continue;
            }
            unique.push(adapter);
        }
        Self { adapters: unique }
    }

    /// LinkedIn, CareerJet and TimesJobs, each with its own HTTP client.
    pub fn from_sources(config: &SourcesConfig, timeout: Duration) -> Result<Self> {
        let client = || {
            FetchClient::builder()
                .timeout(timeout)
                .build()
                .map_err(AggregatorError::from)
        };

        let linkedin = LinkedInAdapter::new(&config.linkedin, client()?)?;
        let careerjet = CareerJetAdapter::new(&config.careerjet, client()?)?;
        let timesjobs = TimesJobsAdapter::new(
            &config.timesjobs,
            TimesJobsAdapter::client_for(&config.timesjobs, timeout)?,
        )?;

        Ok(Self::new(vec![
            Arc::new(linkedin),
            Arc::new(careerjet),
            Arc::new(timesjobs),
        ]))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.key()).collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn SourceAdapter>> {
        let key = key.trim().to_lowercase();
        self.adapters.iter().find(|a| a.key() == key).cloned()
    }

    /// Adapters for `names` in the order given; unknown and repeated names are dropped.
    pub fn resolve(&self, names: &[String]) -> Vec<Arc<dyn SourceAdapter>> {
        let mut resolved: Vec<Arc<dyn SourceAdapter>> = Vec::new();
        for name in names {
            match self.get(name) {
                Some(adapter) => {
                    if !resolved.iter().any(|a| a.key() == adapter.key()) {
                        resolved.push(adapter);
                    }
                }
                None => tracing::debug!(
                    "{}",
                    AggregatorError::UnknownSource {
                        name: name.clone()
                    }
                ),
            }
        }
        resolved
    }
}
