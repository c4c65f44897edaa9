pub mod aggregate;
pub mod browser;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod output;
pub mod region_map;

pub use aggregate::{run, scrape_all_pages, scrape_range};
pub use browser::Browser;
pub use config::{ClientKind, RowPolicy, ScrapeConfig, WaitStrategy};
pub use extract::{extract_regions, postcode_prefix};
pub use fetch::PageFetcher;
pub use output::{load_from_csv, save_to_csv};
pub use region_map::RegionMap;
