use anyhow::Result;
use postcode_scraper::{aggregate, output, ScrapeConfig};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let cfg = ScrapeConfig::load()?;
    info!(
        "scraping pages {}..={} with {:?} client → {}",
        cfg.start_page,
        cfg.end_page,
        cfg.client,
        cfg.output_path.display()
    );

    // ─── 3) scrape every page ────────────────────────────────────────
    let start = Instant::now();
    let data = aggregate::run(&cfg).await?;
    info!(
        regions = data.len(),
        postcodes = data.total_postcodes(),
        elapsed = ?start.elapsed(),
        "scraped"
    );

    // ─── 4) write the aggregate ──────────────────────────────────────
    output::save_to_csv(&data, &cfg.output_path)?;

    info!("all done");
    Ok(())
}
