pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::service::{DEFAULT_LOCATION, DEFAULT_QUERY};
#[cfg(feature = "cli")]
use crate::domain::model::{JobFilter, StatusUpdate};
#[cfg(feature = "cli")]
use crate::utils::error::{AggregatorError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::{Args, Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "job-aggregator")]
#[command(about = "Scrape job listings from several job sites and curate the ones worth keeping")]
pub struct CliConfig {
    #[arg(short, long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Search the configured job sites and print the merged listings
    Scrape(ScrapeArgs),
    /// List saved jobs
    Saved(SavedArgs),
    /// Update a saved job's title or flags
    Status(StatusArgs),
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct ScrapeArgs {
    #[arg(short, long, default_value = DEFAULT_QUERY)]
    pub query: String,

    #[arg(short, long, default_value = DEFAULT_LOCATION)]
    pub location: String,

    #[arg(long, help = "Listings per source (defaults to aggregation.default_limit)")]
    pub limit: Option<usize>,

    #[arg(long, value_delimiter = ',', help = "Comma-separated source keys")]
    pub sources: Vec<String>,

    #[arg(long, help = "Save every returned listing")]
    pub save: bool,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct SavedArgs {
    #[arg(long, help = "Matches title, company or description")]
    pub search: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub source: Option<String>,

    #[arg(long)]
    pub liked: Option<bool>,

    #[arg(long)]
    pub applied: Option<bool>,

    #[arg(long, default_value = "10")]
    pub limit: usize,

    #[arg(long, default_value = "0")]
    pub offset: usize,
}

#[cfg(feature = "cli")]
impl SavedArgs {
    pub fn filter(&self) -> JobFilter {
        JobFilter {
            search: self.search.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            source: self.source.clone(),
            liked: self.liked,
            applied: self.applied,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    pub id: i64,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub liked: Option<bool>,

    #[arg(long)]
    pub applied: Option<bool>,
}

#[cfg(feature = "cli")]
impl StatusArgs {
    pub fn update(&self) -> StatusUpdate {
        StatusUpdate {
            title: self.title.clone(),
            liked: self.liked,
            applied: self.applied,
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validate_path("config", path)?;
        }

        match &self.command {
            Command::Scrape(args) => {
                validate_non_empty_string("query", &args.query)?;
            }
            Command::Saved(args) => {
                if args.limit == 0 {
                    return Err(AggregatorError::InvalidConfigValueError {
                        field: "limit".to_string(),
                        value: args.limit.to_string(),
                        reason: "Value must be at least 1".to_string(),
                    });
                }
            }
            Command::Status(args) => {
                if args.title.is_none() && args.liked.is_none() && args.applied.is_none() {
                    return Err(AggregatorError::ValidationError {
                        message: "Nothing to update: pass --title, --liked or --applied"
                            .to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
