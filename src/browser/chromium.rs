// src/browser/chromium.rs

use super::Browser;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::Path;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

/// Headless Chromium session with a single tab reused for every page.
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    page: Page,
    handler: JoinHandle<()>,
    closed: bool,
}

impl ChromiumBrowser {
    /// Launch headless Chromium. With no `chrome_path`, the executable is
    /// looked up in the usual install locations.
    pub async fn launch(chrome_path: Option<&Path>) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions");
        if let Some(path) = chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // CDP events must be drained for the browser to make progress.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("chromium handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open a tab")?;

        info!("chromium session started");
        Ok(Self {
            browser,
            page,
            handler,
            closed: false,
        })
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn navigate(&mut self, url: &Url) -> Result<()> {
        debug!("navigating to {}", url);
        self.page
            .goto(url.as_str())
            .await
            .with_context(|| format!("navigation to {} failed", url))?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.page
            .content()
            .await
            .context("reading rendered page source")
    }

    async fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            warn!("waiting for chromium to exit: {}", e);
        }
        self.handler.abort();
        closed.context("closing chromium")?;
        info!("chromium session closed");
        Ok(())
    }
}

impl Drop for ChromiumBrowser {
    fn drop(&mut self) {
        // The child process is killed when `browser` drops; the handler task
        // would otherwise outlive it.
        self.handler.abort();
    }
}
