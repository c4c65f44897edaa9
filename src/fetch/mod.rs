// src/fetch/mod.rs

pub mod wait;

use crate::browser::Browser;
use crate::config::{ScrapeConfig, WaitStrategy, PAGE_PLACEHOLDER};
use anyhow::{bail, Context, Result};
use tracing::{debug, instrument};
use url::Url;

/// Loads one listing page through a browser session and returns its
/// rendered markup.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    url_template: String,
    wait: WaitStrategy,
}

impl PageFetcher {
    pub fn new(url_template: impl Into<String>, wait: WaitStrategy) -> Result<Self> {
        let url_template = url_template.into();
        if !url_template.contains(PAGE_PLACEHOLDER) {
            bail!(
                "url_template {:?} has no {} placeholder",
                url_template,
                PAGE_PLACEHOLDER
            );
        }
        Ok(Self { url_template, wait })
    }

    pub fn from_config(cfg: &ScrapeConfig) -> Result<Self> {
        Self::new(cfg.url_template.clone(), cfg.wait.clone())
    }

    pub fn page_url(&self, page: u32) -> Result<Url> {
        let raw = self
            .url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string());
        Url::parse(&raw).with_context(|| format!("invalid page URL {:?}", raw))
    }

    #[instrument(level = "debug", skip(self, browser))]
    pub async fn fetch<B>(&self, browser: &mut B, page: u32) -> Result<String>
    where
        B: Browser + ?Sized,
    {
        let url = self.page_url(page)?;
        browser
            .navigate(&url)
            .await
            .with_context(|| format!("loading page {} ({})", page, url))?;

        let html = wait::settle(browser, &self.wait)
            .await
            .with_context(|| format!("reading page {} ({})", page, url))?;
        debug!(page, bytes = html.len(), "page fetched");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct EchoBrowser {
        visited: Vec<String>,
    }

    #[async_trait]
    impl Browser for EchoBrowser {
        async fn navigate(&mut self, url: &Url) -> Result<()> {
            self.visited.push(url.to_string());
            Ok(())
        }

        async fn page_source(&mut self) -> Result<String> {
            let last = self.visited.last().cloned().unwrap_or_default();
            Ok(format!("<html><body>{}</body></html>", last))
        }

        async fn quit(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn template_needs_placeholder() {
        assert!(PageFetcher::new("https://example.com/all", WaitStrategy::no_wait()).is_err());
    }

    #[test]
    fn page_url_interpolates_index() {
        let fetcher = PageFetcher::from_config(&ScrapeConfig::default()).unwrap();
        assert_eq!(
            fetcher.page_url(1242).unwrap().as_str(),
            "https://sgp.postcodebase.com/all?page=1242"
        );
    }

    #[tokio::test]
    async fn fetch_navigates_then_reads_source() {
        let fetcher =
            PageFetcher::new("https://example.com/all?page={page}", WaitStrategy::no_wait())
                .unwrap();
        let mut browser = EchoBrowser { visited: vec![] };

        let html = fetcher.fetch(&mut browser, 3).await.unwrap();
        assert_eq!(browser.visited, vec!["https://example.com/all?page=3"]);
        assert!(html.contains("page=3"));
    }
}
