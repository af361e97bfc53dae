use crate::adapters::cache::{CacheBackend, MemoryCache, NoCache};
use crate::core::registry::{SourceRegistry, SourcesConfig};
use crate::core::service::{DEFAULT_LIMIT, DEFAULT_SOURCES};
use crate::utils::error::{AggregatorError, Result};
use crate::utils::validation::{
    validate_one_of, validate_path, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CACHE_BACKENDS: [&str; 3] = ["none", "memory", "redis"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub aggregation: AggregationConfig,
    pub http: HttpConfig,
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub default_sources: Vec<String>,
    pub default_limit: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            default_sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: String,
    pub ttl_seconds: u64,
    pub redis_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            ttl_seconds: 300,
            redis_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "./saved_jobs.json".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AggregatorError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the variable's value; unset variables stay as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AggregatorError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("sources.linkedin.search_url", &self.sources.linkedin.search_url)?;
        validate_url("sources.timesjobs.search_url", &self.sources.timesjobs.search_url)?;
        if self.sources.careerjet.origins.is_empty() {
            return Err(AggregatorError::MissingConfigError {
                field: "sources.careerjet.origins".to_string(),
            });
        }
        for origin in &self.sources.careerjet.origins {
            validate_url("sources.careerjet.origins", origin)?;
        }

        validate_positive_number("http.timeout_seconds", self.http.timeout_seconds, 1)?;
        validate_positive_number("cache.ttl_seconds", self.cache.ttl_seconds, 1)?;
        validate_one_of("cache.backend", &self.cache.backend, &CACHE_BACKENDS)?;
        if self.cache.backend == "redis" && self.cache.redis_url.is_none() {
            return Err(AggregatorError::MissingConfigError {
                field: "cache.redis_url".to_string(),
            });
        }

        for source in &self.aggregation.default_sources {
            validate_one_of(
                "aggregation.default_sources",
                &source.to_lowercase(),
                &DEFAULT_SOURCES,
            )?;
        }

        validate_path("storage.path", &self.storage.path)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_seconds)
    }

    pub fn build_registry(&self) -> Result<SourceRegistry> {
        SourceRegistry::from_sources(&self.sources, self.timeout())
    }

    /// Never fails: an unreachable or unavailable backend degrades to no cache.
    pub async fn build_cache(&self) -> CacheBackend {
        match self.cache.backend.as_str() {
            "memory" => CacheBackend::Memory(MemoryCache::new()),
            "redis" => self.redis_cache().await,
            _ => CacheBackend::Disabled(NoCache),
        }
    }

    #[cfg(feature = "redis-cache")]
    async fn redis_cache(&self) -> CacheBackend {
        let Some(url) = self.cache.redis_url.as_deref() else {
            return CacheBackend::Disabled(NoCache);
        };
        match crate::adapters::redis_cache::RedisCache::connect(url).await {
            Ok(cache) => CacheBackend::Redis(cache),
            Err(e) => {
                tracing::warn!("{}; continuing without cache", e);
                CacheBackend::Disabled(NoCache)
            }
        }
    }

    #[cfg(not(feature = "redis-cache"))]
    async fn redis_cache(&self) -> CacheBackend {
        tracing::warn!("Built without the redis-cache feature; continuing without cache");
        CacheBackend::Disabled(NoCache)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
