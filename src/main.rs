mod adapters;
mod application;
mod cli;
mod config;
mod enrichment;
mod ports;
mod shared;

use adapters::outbound::network::{
    ClearlyDefinedSource, DependencyTrackClient, RateLimited, SnykSource,
};
use adapters::outbound::storage::{JsonFileCache, JsonFileRetryMemory};
use application::dto::{EnrichmentEvent, ProjectRef};
use application::use_cases::EnrichProjectUseCase;
use chrono::Utc;
use cli::{Args, SourceKind};
use config::EnricherConfig;
use ports::outbound::{LicenseSource, SystemClock};
use shared::Result;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("\nAn error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse_args();
    let config = EnricherConfig::from_env()?;

    let event = EnrichmentEvent::new(
        Utc::now(),
        "manual enrichment run",
        ProjectRef {
            uuid: args.project_uuid,
            name: args.project_name.clone(),
            version: args.project_version.clone(),
            purl: None,
        },
    );

    let summary = match args.source {
        SourceKind::ClearlyDefined => {
            run_cycle(&config, &event, ClearlyDefinedSource::new()?).await?
        }
        SourceKind::Snyk => run_cycle(&config, &event, SnykSource::new()?).await?,
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_cycle<S: LicenseSource>(
    config: &EnricherConfig,
    event: &EnrichmentEvent,
    source: S,
) -> Result<application::dto::EnrichmentSummary> {
    let inventory = DependencyTrackClient::new(
        &config.dependency_track_api_url,
        &config.dependency_track_api_key,
    )?;
    let cache = JsonFileCache::open(&config.cache_path)?;
    let retry_memory = JsonFileRetryMemory::open(&config.retry_memory_path)?;
    let rate_limited = RateLimited::new(source, config.fetch_permits, config.fetch_spacing);

    let use_case = EnrichProjectUseCase::new(
        inventory,
        cache,
        retry_memory,
        rate_limited,
        SystemClock,
        config.fetch_cooldown,
    );
    use_case.execute(event).await
}
