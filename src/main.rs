mod cli;
mod models;
mod output;
mod scrapers;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use scrapers::{BrowserFetcher, Fetcher, HttpFetcher, Pipeline, RunOutput, ScrapeError};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = match err.downcast_ref::<ScrapeError>() {
                Some(ScrapeError::Fetch { source, .. }) => {
                    if source.is_blocked() {
                        error!("Blocked by ZonaProp: {:#}", err);
                        error!(
                            "The site only serves visitors from Argentina, \
                             retry through an Argentine VPN or --proxy"
                        );
                    } else {
                        error!("Network failure: {:#}", err);
                    }
                    2
                }
                Some(ScrapeError::Parse { .. }) => {
                    error!("Site layout changed: {:#}", err);
                    error!("The extraction rules no longer match ZonaProp's markup");
                    3
                }
                None => {
                    error!("{:#}", err);
                    1
                }
            };
            ExitCode::from(code)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    info!("🏠 ZonaProp Scraper");

    let query = args.search_query()?;
    let fetcher: Box<dyn Fetcher> = if args.browser {
        Box::new(BrowserFetcher::new(&args.fetch_settings())?)
    } else {
        Box::new(HttpFetcher::new(&args.fetch_settings())?)
    };

    let started = Instant::now();
    let pipeline = Pipeline::new(fetcher, args.run_settings());
    let output = pipeline.run(&query).await?;

    let saved = output::save_csv(&args.output_dir, &query, &output.records)?;
    info!("💾 Saved {} listings to {}", output.records.len(), saved.listings.display());
    if let Some(complete) = &saved.complete {
        info!("💾 Saved full listing data to {}", complete.display());
    }
    log_summary(&output, started.elapsed())?;

    Ok(())
}

fn log_summary(output: &RunOutput, elapsed: Duration) -> anyhow::Result<()> {
    let stats = &output.stats;
    info!("✅ Scraped {} listings from {} pages", output.records.len(), stats.pages_fetched);
    info!("Total time: {:.1}s", elapsed.as_secs_f64());
    if !output.records.is_empty() {
        let per_hundred = elapsed.as_secs_f64() / output.records.len() as f64 * 100.0;
        info!("Rate: 100 listings every {:.1}s", per_hundred);
    }
    if stats.dropped_without_url > 0 || stats.duplicates > 0 {
        info!(
            "Dropped {} listings without URL and {} duplicates",
            stats.dropped_without_url, stats.duplicates
        );
    }
    if !stats.skipped_pages.is_empty() {
        info!("Skipped unreadable pages: {:?}", stats.skipped_pages);
    }
    for (field, count) in &stats.missing_fields {
        info!("{} listings without {}", count, field);
    }

    debug!(
        "Run stats: {}",
        serde_json::to_string(stats).context("Failed to serialize run stats")?
    );
    Ok(())
}
