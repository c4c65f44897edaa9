use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use postcode_scraper::{
    load_from_csv, save_to_csv, scrape_all_pages, Browser, RowPolicy, ScrapeConfig, WaitStrategy,
};
use std::{
    collections::HashMap,
    fs,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};
use tempfile::tempdir;
use url::Url;

/// In-memory site: page index → listing markup. Pages render their rows
/// only after `render_after` reads, like a client-side rendered table.
struct FakeSite {
    pages: HashMap<u32, String>,
    render_after: usize,
    current: Option<u32>,
    reads: usize,
    quits: Arc<AtomicUsize>,
}

impl FakeSite {
    fn new(quits: Arc<AtomicUsize>) -> Self {
        Self {
            pages: HashMap::new(),
            render_after: 0,
            current: None,
            reads: 0,
            quits,
        }
    }

    fn page(mut self, n: u32, rows: &str) -> Self {
        self.pages.insert(
            n,
            format!(
                "<html><body><table>\
                 <tr><th>Postcode</th><th>Region</th></tr>{}\
                 </table></body></html>",
                rows
            ),
        );
        self
    }
}

#[async_trait]
impl Browser for FakeSite {
    async fn navigate(&mut self, url: &Url) -> Result<()> {
        let n: u32 = url
            .query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .context("missing page parameter")?;
        if !self.pages.contains_key(&n) {
            bail!("DNS failure for page {}", n);
        }
        self.current = Some(n);
        self.reads = 0;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        let n = self.current.context("nothing loaded")?;
        self.reads += 1;
        if self.reads <= self.render_after {
            return Ok("<html><body><div id=app></div></body></html>".to_string());
        }
        Ok(self.pages[&n].clone())
    }

    async fn quit(&mut self) -> Result<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn config(start: u32, end: u32, output: &std::path::Path) -> ScrapeConfig {
    ScrapeConfig {
        url_template: "https://listing.test/all?page={page}".to_string(),
        start_page: start,
        end_page: end,
        output_path: output.to_path_buf(),
        wait: WaitStrategy::Selector {
            selector: "table tr td".to_string(),
            timeout_ms: 500,
            poll_interval_ms: 1,
        },
        ..ScrapeConfig::default()
    }
}

#[tokio::test]
async fn scrape_then_write_csv() -> Result<()> {
    let dir = tempdir()?;
    let out = dir.path().join("data").join("postcode_data.csv");
    let quits = Arc::new(AtomicUsize::new(0));

    let mut site = FakeSite::new(quits.clone())
        .page(
            1,
            "<tr><td>123456</td><td>North</td></tr>\
             <tr><td>123789</td><td>North</td></tr>\
             <tr><td>456000</td><td>South</td></tr>",
        )
        .page(2, "")
        .page(
            3,
            "<tr><td>Section divider</td></tr>\
             <tr><td>456111</td><td>South</td></tr>\
             <tr><td>789000</td><td>West</td></tr>",
        );
    site.render_after = 2;

    let cfg = config(1, 3, &out);
    let data = scrape_all_pages(site, &cfg).await?;
    assert_eq!(quits.load(Ordering::SeqCst), 1);

    save_to_csv(&data, &cfg.output_path)?;
    let text = fs::read_to_string(&out)?;
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Region,Postcodes",
            "North,\"123, 123\"",
            "South,\"456, 456\"",
            "West,789",
        ]
    );

    let back = load_from_csv(&out)?;
    assert_eq!(back, data);
    assert_eq!(back.total_postcodes(), 5);
    Ok(())
}

#[tokio::test]
async fn fail_policy_aborts_and_still_quits() -> Result<()> {
    let dir = tempdir()?;
    let out = dir.path().join("never.csv");
    let quits = Arc::new(AtomicUsize::new(0));
    let site = FakeSite::new(quits.clone())
        .page(1, "<tr><td>123456</td><td>North</td></tr>")
        .page(2, "<tr><td>lonely</td></tr>");

    let cfg = ScrapeConfig {
        row_policy: RowPolicy::Fail,
        ..config(1, 2, &out)
    };
    let err = scrape_all_pages(site, &cfg).await.unwrap_err();
    assert!(format!("{:#}", err).contains("page 2"), "{:#}", err);
    assert_eq!(quits.load(Ordering::SeqCst), 1);
    assert!(!out.exists());
    Ok(())
}

#[tokio::test]
async fn network_failure_aborts_and_still_quits() {
    let quits = Arc::new(AtomicUsize::new(0));
    let site = FakeSite::new(quits.clone()).page(1, "<tr><td>123456</td><td>North</td></tr>");
    let dir = tempdir().unwrap();

    let err = scrape_all_pages(site, &config(1, 2, &dir.path().join("x.csv")))
        .await
        .unwrap_err();
    assert!(format!("{:#}", err).contains("DNS failure"));
    assert_eq!(quits.load(Ordering::SeqCst), 1);
}
