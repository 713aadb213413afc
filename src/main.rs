mod config;
mod fetcher;
mod models;
mod parser;
mod partition_key;
mod publisher;

use std::process::ExitCode;

use anyhow::Result;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::CrawlConfig;
use publisher::{KinesisStream, PublishSummary, StreamError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let config = CrawlConfig::default();
    match run(&config).await {
        Ok(summary) => {
            info!(
                published = summary.published,
                failed = summary.failed,
                skipped = summary.skipped,
                "crawl complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Some(stream_err) = e.downcast_ref::<StreamError>() {
                eprintln!("{stream_err}");
            } else {
                error!("crawl failed: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &CrawlConfig) -> Result<PublishSummary> {
    let html = fetcher::fetch_html(config).await?;
    let offers = parser::parse_offers(&html)?;
    info!(count = offers.len(), "found new offers");

    if offers.is_empty() {
        return Ok(PublishSummary::default());
    }

    let stream = KinesisStream::new(&config.region).await;
    let summary = publisher::publish_offers(&stream, config, &offers).await?;
    Ok(summary)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("offer_stream_crawler=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
