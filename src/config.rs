// src/config.rs

use crate::fetch::PageFetcher;
use anyhow::{bail, Context, Result};
use scraper::Selector;
use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
};

pub const DEFAULT_URL_TEMPLATE: &str = "https://sgp.postcodebase.com/all?page={page}";
pub const DEFAULT_OUTPUT_PATH: &str = "./data/postcode_data.csv";
pub const DEFAULT_START_PAGE: u32 = 1;
pub const DEFAULT_END_PAGE: u32 = 1242;

/// Placeholder substituted with the page index in `url_template`.
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Which browser client drives the page fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    /// Headless Chromium; renders client-side content.
    #[default]
    Chromium,
    /// Plain HTTP GET; only for pages rendered server-side.
    Http,
}

impl ClientKind {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Some(Self::Chromium),
            "http" => Some(Self::Http),
            _ => None,
        }
    }
}

/// How long to wait after navigation before reading the document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaitStrategy {
    /// Sleep for a fixed delay, then read whatever is there.
    Fixed { delay_ms: u64 },
    /// Poll the page source until `selector` matches, at most `timeout_ms`.
    Selector {
        selector: String,
        timeout_ms: u64,
        poll_interval_ms: u64,
    },
}

impl Default for WaitStrategy {
    fn default() -> Self {
        WaitStrategy::Selector {
            selector: "table tr td".to_string(),
            timeout_ms: 10_000,
            poll_interval_ms: 250,
        }
    }
}

impl WaitStrategy {
    /// The source site's original blind two second wait.
    pub fn fixed_two_seconds() -> Self {
        WaitStrategy::Fixed { delay_ms: 2_000 }
    }

    pub fn no_wait() -> Self {
        WaitStrategy::Fixed { delay_ms: 0 }
    }
}

/// What to do with a data row that has a postcode cell but no region cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Log a warning and drop the row.
    #[default]
    Skip,
    /// Abort the run.
    Fail,
}

/// Everything a scrape run needs to know.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub url_template: String,
    pub start_page: u32,
    pub end_page: u32,
    pub output_path: PathBuf,
    pub client: ClientKind,
    pub chrome_path: Option<PathBuf>,
    pub wait: WaitStrategy,
    pub row_policy: RowPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            start_page: DEFAULT_START_PAGE,
            end_page: DEFAULT_END_PAGE,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            client: ClientKind::default(),
            chrome_path: None,
            wait: WaitStrategy::default(),
            row_policy: RowPolicy::default(),
        }
    }
}

impl ScrapeConfig {
    /// Defaults, or the YAML file named by `POSTCODE_SCRAPER_CONFIG`, with
    /// environment overrides applied on top. The result is validated.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var("POSTCODE_SCRAPER_CONFIG") {
            Ok(path) if !path.trim().is_empty() => Self::from_yaml_file(path.trim())?,
            _ => Self::default(),
        };
        cfg.apply_env(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {:?}", path))?;
        Self::from_yaml_str(&text).with_context(|| format!("parsing config file {:?}", path))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Apply overrides from a key lookup (the process environment in `load`).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("POSTCODE_START_PAGE") {
            self.start_page = v
                .trim()
                .parse()
                .with_context(|| format!("POSTCODE_START_PAGE={:?} is not a page number", v))?;
        }
        if let Some(v) = lookup("POSTCODE_END_PAGE") {
            self.end_page = v
                .trim()
                .parse()
                .with_context(|| format!("POSTCODE_END_PAGE={:?} is not a page number", v))?;
        }
        if let Some(v) = lookup("POSTCODE_OUTPUT") {
            self.output_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("POSTCODE_URL_TEMPLATE") {
            self.url_template = v;
        }
        if let Some(v) = lookup("POSTCODE_CLIENT") {
            self.client = match ClientKind::from_name(&v) {
                Some(kind) => kind,
                None => bail!("POSTCODE_CLIENT={:?}: expected `chromium` or `http`", v),
            };
        }
        if let Some(v) = lookup("CHROME_PATH") {
            self.chrome_path = Some(PathBuf::from(v));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_page == 0 {
            bail!("start_page must be at least 1");
        }
        if self.start_page > self.end_page {
            bail!(
                "start_page {} is after end_page {}",
                self.start_page,
                self.end_page
            );
        }
        PageFetcher::from_config(self)?.page_url(self.start_page)?;

        if let WaitStrategy::Selector {
            selector,
            poll_interval_ms,
            ..
        } = &self.wait
        {
            if Selector::parse(selector).is_err() {
                bail!("wait selector {:?} is not a valid CSS selector", selector);
            }
            if *poll_interval_ms == 0 {
                bail!("wait poll_interval_ms must be greater than zero");
            }
        }
        Ok(())
    }

    /// Number of pages in the configured range.
    pub fn page_count(&self) -> u32 {
        self.end_page.saturating_sub(self.start_page) + 1
    }
}
