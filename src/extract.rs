// src/extract.rs

use crate::config::RowPolicy;
use crate::region_map::RegionMap;
use anyhow::{bail, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::{trace, warn};

/// Characters of the postcode column kept as the prefix.
pub const PREFIX_LEN: usize = 3;

/// The first [`PREFIX_LEN`] characters of `postcode`, or all of it when shorter.
pub fn postcode_prefix(postcode: &str) -> &str {
    match postcode.char_indices().nth(PREFIX_LEN) {
        Some((end, _)) => &postcode[..end],
        None => postcode,
    }
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect()
}

/// Parse a listing page into region → postcode prefixes.
///
/// Every `tr` in the document after the first (the header) is a candidate.
/// Rows without `td` cells are ignored; rows with a single cell are handled
/// according to `policy`. Cell text is used untrimmed.
pub fn extract_regions(html: &str, policy: RowPolicy) -> Result<RegionMap> {
    let doc = Html::parse_document(html);
    let row_sel = Selector::parse("tr").expect("CSS selector for table rows should be valid");
    let cell_sel = Selector::parse("td").expect("CSS selector for table cells should be valid");

    let mut map = RegionMap::new();
    for (idx, row) in doc.select(&row_sel).enumerate().skip(1) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        match cells.as_slice() {
            [] => continue,
            [only] => {
                let text = cell_text(only);
                match policy {
                    RowPolicy::Skip => {
                        warn!(row = idx, text = %text, "row has one cell; skipping");
                        continue;
                    }
                    RowPolicy::Fail => {
                        bail!("row {} has one cell ({:?}); expected postcode and region", idx, text)
                    }
                }
            }
            [postcode, region, ..] => {
                let postcode = cell_text(postcode);
                let region = cell_text(region);
                trace!(row = idx, postcode = %postcode, region = %region, "row");
                map.push(region, postcode_prefix(&postcode));
            }
        }
    }
    Ok(map)
}
