use std::path::PathBuf;

pub const DEFAULT_PRODUCT_URL: &str = "https://www.amazon.com/gp/offer-listing/B086542G1M";
pub const DEFAULT_STREAM_NAME: &str = "jeremy_testing";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_DRIVER_PATH: &str = "/usr/local/bin/chromedriver";
pub const DEFAULT_DRIVER_PORT: u16 = 9515;
pub const DEFAULT_PARTITION_KEY_LEN: usize = 10;

/// Everything a single crawl-and-publish run needs, built once in `main`.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub product_url: String,
    pub stream_name: String,
    pub region: String,
    pub driver_path: PathBuf,
    pub driver_port: u16,
    pub headless: bool,
    pub partition_key_len: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            product_url: DEFAULT_PRODUCT_URL.to_string(),
            stream_name: DEFAULT_STREAM_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
            driver_path: PathBuf::from(DEFAULT_DRIVER_PATH),
            driver_port: DEFAULT_DRIVER_PORT,
            headless: true,
            partition_key_len: DEFAULT_PARTITION_KEY_LEN,
        }
    }
}

impl CrawlConfig {
    pub fn driver_url(&self) -> String {
        format!("http://localhost:{}", self.driver_port)
    }
}
