pub mod aggregator;
pub mod normalizer;
pub mod registry;
pub mod service;

pub use crate::domain::model::{AggregationRequest, JobRecord, RawCard, ScrapeResponse};
pub use crate::domain::ports::{Cache, JobStore, SourceAdapter};
pub use crate::utils::error::Result;
