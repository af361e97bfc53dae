use clap::Parser;
use job_aggregator::config::Command;
use job_aggregator::utils::error::ErrorSeverity;
use job_aggregator::utils::{logger, validation::Validate};
use job_aggregator::{
    Aggregator, AggregatorError, AppConfig, CacheBackend, CliConfig, FileJobStore, JobService,
    Result,
};
use serde::Serialize;

type Service = JobService<CacheBackend, FileJobStore>;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting job-aggregator");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = cli.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &config).await {
        tracing::error!(
            "❌ {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            AppConfig::from_file(path)?
        }
        None => AppConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

async fn build_service(config: &AppConfig) -> Result<Service> {
    let registry = config.build_registry()?;
    let cache = config.build_cache().await;
    tracing::debug!(
        "Sources: {:?}, cache: {}, store: {}",
        registry.keys(),
        cache.name(),
        config.storage.path
    );

    let store = FileJobStore::new(&config.storage.path);
    Ok(JobService::new(Aggregator::new(registry), cache, store)
        .with_cache_ttl(config.cache_ttl())
        .with_default_sources(config.aggregation.default_sources.clone()))
}

async fn run(cli: &CliConfig, config: &AppConfig) -> Result<()> {
    let service = build_service(config).await?;

    match &cli.command {
        Command::Scrape(args) => {
            let limit = args.limit.unwrap_or(config.aggregation.default_limit);
            let response = service
                .scrape(&args.query, &args.location, limit, &args.sources)
                .await;
            tracing::info!(
                "✅ {} jobs from {}",
                response.total_jobs,
                response.sources.join(", ")
            );

            if args.save {
                let saved = service.save_all(response.jobs.clone()).await?;
                tracing::info!("💾 Saved {} jobs to {}", saved.len(), config.storage.path);
            }
            print_json(&response)
        }
        Command::Saved(args) => {
            let page = service.saved_jobs(&args.filter()).await?;
            print_json(&page)
        }
        Command::Status(args) => {
            let saved = service.update_status(args.id, &args.update()).await?;
            print_json(&saved)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(AggregatorError::from)?;
    println!("{}", rendered);
    Ok(())
}
