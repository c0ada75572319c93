use std::fs;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

/// Run parameters. Every field has a compiled default; an optional
/// `config.toml` next to the binary overrides them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listing URL prefix; the page offset is appended.
    pub listing_url: String,
    /// Output CSV path, truncated at startup.
    pub output_path: String,
    /// Page offsets scraped: `offset_start..offset_end` stepping `offset_step`.
    pub offset_start: usize,
    pub offset_end: usize,
    pub offset_step: usize,
    /// Free-proxy listing URL prefix; the page number is appended.
    pub proxy_listing_url: String,
    /// How many proxy-listing pages to scrape.
    pub proxy_listing_pages: usize,
    /// URL probed through each candidate proxy.
    pub probe_url: String,
    pub validate_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    /// Fixed pause between listing requests.
    pub sleep_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listing_url: "https://www.douban.com/doulist/1264675/?start=".to_string(),
            output_path: "books.csv".to_string(),
            offset_start: 0,
            offset_end: 530,
            offset_step: 25,
            proxy_listing_url: "https://www.kuaidaili.com/free/intr/".to_string(),
            proxy_listing_pages: 5,
            probe_url: "https://www.douban.com/doulist/1264675/?start=0".to_string(),
            validate_timeout_secs: 1,
            fetch_timeout_secs: 3,
            sleep_secs: 1,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self> {
        Self::from_file("config.toml")
    }

    /// Missing or empty file falls back to the defaults.
    pub fn from_file(path: &str) -> Result<Self> {
        let config_data = fs::read_to_string(path).unwrap_or_default();
        if config_data.is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = toml::from_str(&config_data)?;
        Ok(settings)
    }

    pub fn offsets(&self) -> impl Iterator<Item = usize> {
        (self.offset_start..self.offset_end).step_by(self.offset_step.max(1))
    }

    pub fn validate_timeout(&self) -> Duration {
        Duration::from_secs(self.validate_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn sleep(&self) -> Duration {
        Duration::from_secs(self.sleep_secs)
    }
}
