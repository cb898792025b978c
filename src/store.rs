//! The flat resource store shared between the offline pipeline and the
//! runtime lookup components.
//!
//! Everything is parallel, index-aligned arrays: country outlines as a
//! ragged array (per-country vertex counts plus flattened fixed-point
//! coordinate arrays), city records as one array per field. All strings are
//! interned into a single deduplicated table and referenced by index, so
//! repeated country codes and time-zone identifiers are stored once.
//!
//! The city arrays are sorted ascending by longitude. That ordering is a
//! load-bearing invariant - gazetteer searches early-exit on it - so it is
//! validated whenever a store is decoded, along with array alignment and
//! string-index bounds.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Parallel-array resource store, bincode-encoded for shipping inside an
/// application bundle.
#[derive(Debug, Default, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct ResourceStore {
    /// Deduplicated string table; all name/code/zone fields index into it.
    pub strings: Vec<String>,

    /// Per-country ISO code, as a string-table index.
    pub country_codes: Vec<u32>,
    /// Per-country vertex count into the flattened coordinate arrays.
    pub country_vertex_counts: Vec<u32>,
    /// Flattened outline latitudes, fixed-point (degrees * 100,000).
    pub country_lats: Vec<i32>,
    /// Flattened outline longitudes, fixed-point (degrees * 100,000).
    pub country_lons: Vec<i32>,

    /// Per-city name, as a string-table index.
    pub city_names: Vec<u32>,
    /// Per-city owning country code, as a string-table index.
    pub city_countries: Vec<u32>,
    /// Per-city latitude in decimal degrees.
    pub city_lats: Vec<f64>,
    /// Per-city longitude in decimal degrees; ascending across the array.
    pub city_lons: Vec<f64>,
    /// Per-city elevation in meters, where known.
    pub city_elevations: Vec<Option<f32>>,
    /// Per-city IANA time-zone identifier, as a string-table index.
    pub city_timezones: Vec<u32>,
}

impl ResourceStore {
    /// Encodes the store to its binary wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::error::EncodeError> {
        bincode::encode_to_vec(self, bincode::config::standard())
    }

    /// Decodes and validates a store from its binary wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let (store, _): (Self, _) =
            bincode::decode_from_slice(bytes, bincode::config::standard())?;
        store.validate()?;
        Ok(store)
    }

    /// Number of country records.
    pub fn country_count(&self) -> usize {
        self.country_codes.len()
    }

    /// Number of city records.
    pub fn city_count(&self) -> usize {
        self.city_names.len()
    }

    /// Resolves a string-table index.
    pub fn string(&self, idx: u32) -> &str {
        &self.strings[idx as usize]
    }

    /// Checks every structural invariant the runtime relies on.
    pub fn validate(&self) -> Result<(), Error> {
        if self.country_codes.len() != self.country_vertex_counts.len() {
            return Err(Error::CorruptStore(format!(
                "{} country codes but {} vertex counts",
                self.country_codes.len(),
                self.country_vertex_counts.len()
            )));
        }
        let total: usize = self
            .country_vertex_counts
            .iter()
            .map(|&c| c as usize)
            .sum();
        if total != self.country_lats.len() || total != self.country_lons.len() {
            return Err(Error::CorruptStore(format!(
                "vertex counts sum to {} but coordinate arrays hold {}/{} entries",
                total,
                self.country_lats.len(),
                self.country_lons.len()
            )));
        }

        let cities = self.city_names.len();
        if self.city_countries.len() != cities
            || self.city_lats.len() != cities
            || self.city_lons.len() != cities
            || self.city_elevations.len() != cities
            || self.city_timezones.len() != cities
        {
            return Err(Error::CorruptStore(
                "city arrays are not index-aligned".to_string(),
            ));
        }
        if self.city_lons.windows(2).any(|w| w[0] > w[1]) {
            return Err(Error::CorruptStore(
                "city records are not sorted by ascending longitude".to_string(),
            ));
        }

        let limit = self.strings.len() as u32;
        let indices = self
            .country_codes
            .iter()
            .chain(&self.city_names)
            .chain(&self.city_countries)
            .chain(&self.city_timezones);
        for &idx in indices {
            if idx >= limit {
                return Err(Error::CorruptStore(format!(
                    "string index {} out of bounds ({} strings)",
                    idx,
                    self.strings.len()
                )));
            }
        }
        Ok(())
    }
}
