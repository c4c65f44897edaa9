// src/browser/http.rs

use super::Browser;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// A "browser" that only performs a GET; no script runs, so it sees the
/// server-rendered markup.
pub struct HttpBrowser {
    client: Client,
    current: Option<String>,
}

impl HttpBrowser {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .context("building HTTP client")?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            current: None,
        }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn navigate(&mut self, url: &Url) -> Result<()> {
        debug!("GET {}", url);
        let html = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status {}", url))?
            .text()
            .await
            .with_context(|| format!("Reading text from {}", url))?;
        self.current = Some(html);
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        self.current
            .clone()
            .context("page_source called before any navigation")
    }

    async fn quit(&mut self) -> Result<()> {
        self.current = None;
        Ok(())
    }
}
