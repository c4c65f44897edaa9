// src/aggregate.rs

use crate::browser::{self, Browser};
use crate::config::{RowPolicy, ScrapeConfig};
use crate::extract::extract_regions;
use crate::fetch::PageFetcher;
use crate::region_map::RegionMap;
use anyhow::{bail, Context, Result};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Launch the configured browser and scrape `start_page..=end_page`.
pub async fn run(cfg: &ScrapeConfig) -> Result<RegionMap> {
    cfg.validate()?;
    let browser = browser::launch(cfg).await?;
    scrape_all_pages(browser, cfg).await
}

/// Scrape every page in the configured range with one browser session.
///
/// The session is consumed: it is quit before returning, whether the scrape
/// succeeded or failed part way through.
#[instrument(level = "info", skip_all, fields(start = cfg.start_page, end = cfg.end_page))]
pub async fn scrape_all_pages<B>(mut browser: B, cfg: &ScrapeConfig) -> Result<RegionMap>
where
    B: Browser,
{
    let started = Instant::now();
    let scraped = match PageFetcher::from_config(cfg) {
        Ok(fetcher) => {
            scrape_range(
                &mut browser,
                &fetcher,
                cfg.start_page,
                cfg.end_page,
                cfg.row_policy,
            )
            .await
        }
        Err(e) => Err(e),
    };
    let quit = browser.quit().await;

    let all = match (scraped, quit) {
        (Ok(all), Ok(())) => all,
        (Ok(_), Err(e)) => return Err(e.context("closing browser session")),
        (Err(e), Ok(())) => return Err(e),
        (Err(e), Err(quit_err)) => {
            warn!("closing browser session after failure: {:#}", quit_err);
            return Err(e);
        }
    };

    info!(
        pages = cfg.page_count(),
        regions = all.len(),
        postcodes = all.total_postcodes(),
        elapsed = ?started.elapsed(),
        "scrape finished"
    );
    Ok(all)
}

/// Fetch, extract and fold pages `start..=end` in order on an open session.
pub async fn scrape_range<B>(
    browser: &mut B,
    fetcher: &PageFetcher,
    start: u32,
    end: u32,
    policy: RowPolicy,
) -> Result<RegionMap>
where
    B: Browser + ?Sized,
{
    if start == 0 || start > end {
        bail!("invalid page range {}..={}", start, end);
    }

    let mut all = RegionMap::new();
    for page_number in start..=end {
        info!("Scraping page {}", page_number);
        let html = fetcher.fetch(browser, page_number).await?;
        let data = extract_regions(&html, policy)
            .with_context(|| format!("extracting rows from page {}", page_number))?;
        debug!(
            page = page_number,
            regions = data.len(),
            postcodes = data.total_postcodes(),
            "page extracted"
        );
        all.merge(data);
    }
    Ok(all)
}
