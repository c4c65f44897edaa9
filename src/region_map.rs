// src/region_map.rs

use std::collections::HashMap;

/// Region name → postcode prefixes, in the order regions were first seen.
///
/// Postcodes within a region keep their scrape order and are never
/// deduplicated. Region names are used exactly as scraped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionMap {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl RegionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one postcode prefix to `region`, creating the region if it is new.
    pub fn push(&mut self, region: impl Into<String>, postcode: impl Into<String>) {
        let region = region.into();
        let postcode = postcode.into();
        match self.index.get(&region) {
            Some(&idx) => self.entries[idx].1.push(postcode),
            None => {
                self.index.insert(region.clone(), self.entries.len());
                self.entries.push((region, vec![postcode]));
            }
        }
    }

    /// Insert a whole sequence for `region`, extending it if the region exists.
    pub fn extend_region(&mut self, region: impl Into<String>, postcodes: Vec<String>) {
        let region = region.into();
        match self.index.get(&region) {
            Some(&idx) => self.entries[idx].1.extend(postcodes),
            None => {
                self.index.insert(region.clone(), self.entries.len());
                self.entries.push((region, postcodes));
            }
        }
    }

    /// Fold `other` into `self`: known regions are extended in order,
    /// new regions are appended after the existing ones.
    pub fn merge(&mut self, other: RegionMap) {
        for (region, postcodes) in other.entries {
            self.extend_region(region, postcodes);
        }
    }

    pub fn get(&self, region: &str) -> Option<&[String]> {
        self.index
            .get(region)
            .map(|&idx| self.entries[idx].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(region, postcodes)| (region.as_str(), postcodes.as_slice()))
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(region, _)| region.as_str())
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of postcode entries across all regions.
    pub fn total_postcodes(&self) -> usize {
        self.entries.iter().map(|(_, p)| p.len()).sum()
    }
}

impl IntoIterator for RegionMap {
    type Item = (String, Vec<String>);
    type IntoIter = std::vec::IntoIter<(String, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
