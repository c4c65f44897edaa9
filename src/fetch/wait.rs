// src/fetch/wait.rs

use crate::browser::Browser;
use crate::config::WaitStrategy;
use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{trace, warn};

/// Wait for client-side rendering to settle, then return the page source.
///
/// With a selector strategy the source is polled until the selector matches
/// or the timeout passes. A timeout is not an error: a listing page past the
/// last result has no rows, and the extractor turns that into an empty map.
pub async fn settle<B>(browser: &mut B, strategy: &WaitStrategy) -> Result<String>
where
    B: Browser + ?Sized,
{
    match strategy {
        WaitStrategy::Fixed { delay_ms } => {
            if *delay_ms > 0 {
                sleep(Duration::from_millis(*delay_ms)).await;
            }
            browser.page_source().await
        }
        WaitStrategy::Selector {
            selector,
            timeout_ms,
            poll_interval_ms,
        } => {
            let timeout = Duration::from_millis(*timeout_ms);
            let interval = Duration::from_millis((*poll_interval_ms).max(1));
            let started = Instant::now();
            let mut polls = 0u32;
            loop {
                let html = browser.page_source().await?;
                polls += 1;
                if matches_selector(&html, selector)? {
                    trace!(polls, elapsed = ?started.elapsed(), "selector matched");
                    return Ok(html);
                }
                if started.elapsed() >= timeout {
                    warn!(
                        selector = %selector,
                        polls,
                        "no match within {:?}; using the document as is",
                        timeout
                    );
                    return Ok(html);
                }
                sleep(interval).await;
            }
        }
    }
}

fn matches_selector(html: &str, selector: &str) -> Result<bool> {
    let sel = Selector::parse(selector)
        .map_err(|e| anyhow!("invalid CSS selector {:?}: {:?}", selector, e))?;
    let doc = Html::parse_document(html);
    let found = doc.select(&sel).next().is_some();
    Ok(found)
}
