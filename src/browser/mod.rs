//! Browser clients that load a listing page and hand back its markup.
//!
//! A scrape run owns exactly one client for its whole duration and must call
//! [`Browser::quit`] when it is done, whether the run succeeded or not.

pub mod chromium;
pub mod http;

pub use chromium::ChromiumBrowser;
pub use http::HttpBrowser;

use crate::config::{ClientKind, ScrapeConfig};
use anyhow::Result;
use async_trait::async_trait;
use url::Url;

#[async_trait]
pub trait Browser: Send {
    /// Load `url` in the session's page.
    async fn navigate(&mut self, url: &Url) -> Result<()>;
    /// Markup of the currently loaded document, as rendered right now.
    async fn page_source(&mut self) -> Result<String>;
    /// End the session and release whatever backs it.
    async fn quit(&mut self) -> Result<()>;
}

#[async_trait]
impl<B: Browser + ?Sized> Browser for Box<B> {
    async fn navigate(&mut self, url: &Url) -> Result<()> {
        (**self).navigate(url).await
    }

    async fn page_source(&mut self) -> Result<String> {
        (**self).page_source().await
    }

    async fn quit(&mut self) -> Result<()> {
        (**self).quit().await
    }
}

#[async_trait]
impl<B: Browser + ?Sized> Browser for &mut B {
    async fn navigate(&mut self, url: &Url) -> Result<()> {
        (**self).navigate(url).await
    }

    async fn page_source(&mut self) -> Result<String> {
        (**self).page_source().await
    }

    async fn quit(&mut self) -> Result<()> {
        (**self).quit().await
    }
}

/// Start the client selected by `cfg.client`.
pub async fn launch(cfg: &ScrapeConfig) -> Result<Box<dyn Browser>> {
    match cfg.client {
        ClientKind::Chromium => {
            let browser = ChromiumBrowser::launch(cfg.chrome_path.as_deref()).await?;
            Ok(Box::new(browser))
        }
        ClientKind::Http => Ok(Box::new(HttpBrowser::new()?)),
    }
}
