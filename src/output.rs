// src/output.rs

use crate::region_map::RegionMap;
use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::{fs, path::Path};
use tracing::{info, instrument};

pub const HEADER: [&str; 2] = ["Region", "Postcodes"];

/// Separator between postcodes inside the second column.
pub const POSTCODE_SEPARATOR: &str = ", ";

/// Write `data` as `Region,Postcodes` rows, replacing any existing file.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn save_to_csv(data: &RegionMap, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {:?}", parent))?;
    }

    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_path(path)
        .with_context(|| format!("opening {:?} for writing", path))?;

    wtr.write_record(HEADER)
        .with_context(|| format!("writing header to {:?}", path))?;
    for (region, postcodes) in data.iter() {
        let joined = postcodes.join(POSTCODE_SEPARATOR);
        wtr.write_record([region, joined.as_str()])
            .with_context(|| format!("writing region {:?} to {:?}", region, path))?;
    }
    wtr.flush().with_context(|| format!("flushing {:?}", path))?;

    info!(
        regions = data.len(),
        postcodes = data.total_postcodes(),
        "wrote {}",
        path.display()
    );
    Ok(())
}

/// Read a file written by [`save_to_csv`] back into a [`RegionMap`].
pub fn load_from_csv(path: impl AsRef<Path>) -> Result<RegionMap> {
    let path = path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {:?}", path))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("reading header of {:?}", path))?;
    if headers.iter().ne(HEADER) {
        bail!("{:?} does not start with a Region,Postcodes header", path);
    }

    let mut map = RegionMap::new();
    for (idx, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {:?} at record {}", path, idx))?;
        let region = record.get(0).unwrap_or_default();
        // A region is never written without a postcode, so an empty field
        // is a single empty postcode.
        let postcodes = record
            .get(1)
            .unwrap_or_default()
            .split(POSTCODE_SEPARATOR)
            .map(str::to_string)
            .collect();
        map.extend_region(region, postcodes);
    }
    Ok(map)
}
