use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::json;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;

const READY_ATTEMPTS: u32 = 50;
const READY_INTERVAL: Duration = Duration::from_millis(100);

/// Renders the product page in a headless browser and returns its HTML.
///
/// Spawns chromedriver for the duration of the call; the driver process and
/// the browser session are torn down whether or not navigation succeeds.
pub async fn fetch_html(config: &CrawlConfig) -> Result<String> {
    let mut driver = spawn_driver(config)?;
    let result = fetch_with_driver(config).await;

    if let Err(e) = driver.kill().await {
        warn!(error = %e, "failed to stop chromedriver");
    }
    result
}

fn spawn_driver(config: &CrawlConfig) -> Result<Child> {
    info!(path = %config.driver_path.display(), port = config.driver_port, "starting chromedriver");
    Command::new(&config.driver_path)
        .arg(format!("--port={}", config.driver_port))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to launch {}", config.driver_path.display()))
}

async fn fetch_with_driver(config: &CrawlConfig) -> Result<String> {
    let driver_url = config.driver_url();
    wait_for_driver(&driver_url).await?;

    let client = ClientBuilder::native()
        .capabilities(chrome_capabilities(config.headless))
        .connect(&driver_url)
        .await
        .with_context(|| format!("failed to open a webdriver session at {driver_url}"))?;

    let html = load_page(&client, &config.product_url).await;
    if let Err(e) = client.close().await {
        warn!(error = %e, "failed to close webdriver session");
    }
    html
}

async fn load_page(client: &Client, url: &str) -> Result<String> {
    info!(url, "navigating");
    client
        .goto(url)
        .await
        .with_context(|| format!("failed to navigate to {url}"))?;
    let html = client.source().await.context("failed to read page source")?;
    debug!(bytes = html.len(), "page loaded");
    Ok(html)
}

fn chrome_capabilities(headless: bool) -> Capabilities {
    let args: Vec<&str> = if headless { vec!["--headless"] } else { Vec::new() };
    let mut caps = Capabilities::new();
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

#[derive(Debug, Deserialize)]
struct DriverStatus {
    value: DriverStatusValue,
}

#[derive(Debug, Deserialize)]
struct DriverStatusValue {
    ready: bool,
}

async fn wait_for_driver(driver_url: &str) -> Result<()> {
    let http = reqwest::Client::new();
    let status_url = format!("{driver_url}/status");

    for attempt in 1..=READY_ATTEMPTS {
        match http.get(&status_url).send().await {
            Ok(resp) => match resp.json::<DriverStatus>().await {
                Ok(status) if status.value.ready => {
                    debug!(attempt, "chromedriver ready");
                    return Ok(());
                }
                Ok(_) => debug!(attempt, "chromedriver not ready yet"),
                Err(e) => debug!(attempt, error = %e, "unreadable chromedriver status"),
            },
            Err(e) => debug!(attempt, error = %e, "chromedriver not reachable yet"),
        }
        tokio::time::sleep(READY_INTERVAL).await;
    }

    bail!("chromedriver at {driver_url} did not become ready")
}
