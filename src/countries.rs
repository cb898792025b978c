//! Runtime country lookup over the compacted outlines.
//!
//! Decoded once from the resource store and immutable afterwards; queries
//! are read-only scans over at most a few hundred 16-vertex contours, so
//! every lookup is a bounded, synchronous computation.

use crate::error::{check_coordinates, Error};
use crate::store::ResourceStore;
use crate::types::{Contour, RingPoint, MAX_BOX_MATCHES};
use log::debug;

/// One country: its ISO code and single canonical outline.
#[derive(Debug, Clone)]
pub struct CountryRecord {
    code: String,
    contour: Contour,
}

impl CountryRecord {
    /// ISO region code, two letters. Display-only; lookups identify
    /// countries by array index.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The compacted outline.
    pub fn contour(&self) -> &Contour {
        &self.contour
    }
}

/// Spatial index answering point-to-country queries.
pub struct CountryIndex {
    records: Vec<CountryRecord>,
}

impl CountryIndex {
    /// Decodes the ragged outline arrays of the store into one record per
    /// country.
    pub fn from_store(store: &ResourceStore) -> Self {
        let mut records = Vec::with_capacity(store.country_count());
        let mut offset = 0usize;
        for (idx, &count) in store.country_vertex_counts.iter().enumerate() {
            let count = count as usize;
            let points = (offset..offset + count)
                .map(|i| RingPoint {
                    lat: store.country_lats[i],
                    lon: store.country_lons[i],
                })
                .collect();
            records.push(CountryRecord {
                code: store.string(store.country_codes[idx]).to_string(),
                contour: Contour::new(points),
            });
            offset += count;
        }
        debug!("loaded {} country outlines", records.len());
        Self { records }
    }

    /// Number of indexed countries.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no countries at all.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The record at a previously returned index.
    pub fn record(&self, index: usize) -> &CountryRecord {
        &self.records[index]
    }

    /// Resolves a coordinate to the index of the country containing it, or
    /// nearest to it.
    ///
    /// Bounding boxes are scanned first, stopping at [`MAX_BOX_MATCHES`]
    /// candidates. A single box match is returned directly. Overlapping
    /// matches are resolved by box-nesting depth, then by exact ray-cast
    /// containment ranked by border distance. When the point is inside no
    /// box at all - mid-ocean, for instance - the country with the nearest
    /// border wins, so the only `None` outcome is an empty index.
    pub fn find_country_index(&self, latitude: f64, longitude: f64) -> Result<Option<usize>, Error> {
        check_coordinates(latitude, longitude)?;
        if self.records.is_empty() {
            return Ok(None);
        }
        let p = RingPoint::from_degrees(latitude, longitude);

        let mut matches = Vec::with_capacity(MAX_BOX_MATCHES);
        for (idx, record) in self.records.iter().enumerate() {
            if record.contour.contains_box(p) {
                matches.push(idx);
                if matches.len() == MAX_BOX_MATCHES {
                    break;
                }
            }
        }

        let found = match matches.len() {
            0 => self.nearest_border(p, None),
            1 => Some(matches[0]),
            _ => self.disambiguate(p, &matches),
        };
        Ok(found)
    }

    /// Index with the minimum border distance to `p`, restricted to `pool`
    /// when given.
    fn nearest_border(&self, p: RingPoint, pool: Option<&[usize]>) -> Option<usize> {
        let candidates: Box<dyn Iterator<Item = usize> + '_> = match pool {
            Some(pool) => Box::new(pool.iter().copied()),
            None => Box::new(0..self.records.len()),
        };
        candidates
            .map(|i| (i, self.records[i].contour.min_distance_to_borders(p)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    /// Resolves two or more box matches.
    fn disambiguate(&self, p: RingPoint, matches: &[usize]) -> Option<usize> {
        // A smaller country whose box sits inside a larger one's box is the
        // more specific answer; prefer the most deeply nested candidate.
        let depths: Vec<usize> = matches
            .iter()
            .map(|&i| {
                matches
                    .iter()
                    .filter(|&&j| {
                        j != i && self.records[j].contour.box_encloses(&self.records[i].contour)
                    })
                    .count()
            })
            .collect();
        let max_depth = depths.iter().copied().max().unwrap_or(0);
        if max_depth > 0 {
            let deepest: Vec<usize> = matches
                .iter()
                .zip(&depths)
                .filter(|(_, &d)| d == max_depth)
                .map(|(&i, _)| i)
                .collect();
            if deepest.len() == 1 {
                return Some(deepest[0]);
            }
        }

        let containing: Vec<usize> = matches
            .iter()
            .copied()
            .filter(|&i| self.records[i].contour.contains(p))
            .collect();
        if containing.is_empty() {
            self.nearest_border(p, Some(matches))
        } else {
            self.nearest_border(p, Some(&containing))
        }
    }
}
