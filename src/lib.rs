pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::cache::{CacheBackend, MemoryCache, NoCache};
pub use adapters::store::{FileJobStore, MemoryJobStore};
pub use config::toml_config::AppConfig;
pub use core::{aggregator::Aggregator, registry::SourceRegistry, service::JobService};
pub use utils::error::{AggregatorError, Result};
