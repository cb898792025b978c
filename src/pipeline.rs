//! The offline build pipeline: raw geometry and city records in, a compact
//! [`ResourceStore`] out.
//!
//! Runs once, ahead of time, as a single-threaded batch job. Per-record
//! failures are logged and skipped; the batch itself never aborts.

use rustc_hash::FxHashMap;

use crate::compact::compact;
use crate::geometry;
use crate::normalize;
use crate::store::ResourceStore;
use crate::types::{Contour, SyntheticId, MAX_OUTLINE_VERTICES};
use log::{debug, info, warn};

/// Default bounding-box gap, in degrees, under which two fragments of the
/// same entity are merged into one contour.
pub const MERGE_PROXIMITY_DEG: f64 = 1.0;

/// One raw geometry record from the upstream source: a country or place
/// code plus the polygon fragments belonging to it. Ring points are
/// `[longitude, latitude]` pairs in decimal degrees.
#[derive(Debug, Clone)]
pub struct RawRegion {
    /// ISO region identifier, two letters.
    pub code: String,
    /// Polygon fragments; outer rings only.
    pub fragments: Vec<Vec<[f64; 2]>>,
}

/// One raw city record from the upstream source.
#[derive(Debug, Clone)]
pub struct RawCity {
    /// City name.
    pub name: String,
    /// Owning ISO country code.
    pub country_code: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Elevation in meters, where the source knows it.
    pub elevation: Option<f32>,
    /// IANA time-zone identifier.
    pub timezone: String,
}

/// String interning table shared by every store field.
#[derive(Default)]
struct Interner {
    map: FxHashMap<String, u32>,
    strings: Vec<String>,
}

impl Interner {
    fn intern(&mut self, s: &str) -> u32 {
        *self.map.entry(s.to_string()).or_insert_with(|| {
            let idx = self.strings.len() as u32;
            self.strings.push(s.to_string());
            idx
        })
    }
}

/// Drives normalize -> compact per country and serializes the parallel
/// arrays of the resource store.
pub struct Pipeline {
    proximity: f64,
    budget: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self {
            proximity: MERGE_PROXIMITY_DEG,
            budget: MAX_OUTLINE_VERTICES,
        }
    }
}

impl Pipeline {
    /// A pipeline with an explicit merge proximity (degrees) and vertex
    /// budget.
    pub fn new(proximity: f64, budget: usize) -> Self {
        Self { proximity, budget }
    }

    /// Processes all records and assembles the resource store.
    pub fn build(&self, regions: Vec<RawRegion>, cities: Vec<RawCity>) -> ResourceStore {
        let mut interner = Interner::default();
        let mut store = ResourceStore::default();

        let outlines = self.build_outlines(regions);
        info!("compacted {} country outlines", outlines.len());
        for (code, contour) in outlines {
            store.country_codes.push(interner.intern(&code));
            store
                .country_vertex_counts
                .push(contour.points().len() as u32);
            for p in contour.points() {
                store.country_lats.push(p.lat);
                store.country_lons.push(p.lon);
            }
        }

        let cities = self.collect_cities(cities);
        info!("serializing {} city records", cities.len());
        for city in cities {
            store.city_names.push(interner.intern(&city.name));
            store.city_countries.push(interner.intern(&city.country_code));
            store.city_lats.push(city.latitude);
            store.city_lons.push(city.longitude);
            store.city_elevations.push(city.elevation);
            store.city_timezones.push(interner.intern(&city.timezone));
        }

        store.strings = interner.strings;
        store
    }

    /// Normalizes and compacts every region, one canonical contour per code,
    /// sorted by code for a deterministic store layout.
    fn build_outlines(&self, regions: Vec<RawRegion>) -> Vec<(String, Contour)> {
        let mut by_code: FxHashMap<String, Vec<Vec<[f64; 2]>>> = FxHashMap::default();
        for region in regions {
            by_code
                .entry(region.code)
                .or_default()
                .extend(region.fragments);
        }

        let mut outlines: Vec<(String, Contour)> = Vec::with_capacity(by_code.len());
        for (code, fragments) in by_code {
            match self.canonical_outline(&code, fragments) {
                Some(contour) => outlines.push((code, contour)),
                None => warn!("no usable geometry for {}; record skipped", code),
            }
        }
        outlines.sort_by(|a, b| a.0.cmp(&b.0));
        outlines
    }

    fn canonical_outline(&self, code: &str, fragments: Vec<Vec<[f64; 2]>>) -> Option<Contour> {
        let mut usable: Vec<Vec<[f64; 2]>> = Vec::with_capacity(fragments.len());
        for mut ring in fragments {
            if ring.is_empty() {
                warn!("{}: empty fragment skipped", code);
                continue;
            }
            if ring
                .iter()
                .any(|p| !p[0].is_finite() || !p[1].is_finite())
            {
                warn!("{}: fragment with unparsable coordinate skipped", code);
                continue;
            }
            normalize::close(&mut ring);
            usable.push(ring);
        }
        if usable.is_empty() {
            return None;
        }

        // Several disjoint fragments may survive the merge; the largest one
        // becomes the country's single canonical outline.
        normalize::merge(usable, self.proximity)
            .into_iter()
            .map(|ring| {
                let anchor = geometry::centroid(&ring);
                Contour::new(compact(&ring, anchor, self.budget))
            })
            .filter(|contour| !contour.points().is_empty())
            .max_by(|a, b| a.area().total_cmp(&b.area()))
    }

    /// Filters, dedupes, and longitude-sorts the city records.
    fn collect_cities(&self, cities: Vec<RawCity>) -> Vec<RawCity> {
        let mut seen: FxHashMap<i64, ()> = FxHashMap::default();
        let mut kept: Vec<RawCity> = Vec::with_capacity(cities.len());
        for city in cities {
            if !city.latitude.is_finite()
                || !city.longitude.is_finite()
                || city.latitude.abs() > 90.0
                || city.longitude.abs() > 180.0
            {
                warn!("city {:?} has unusable coordinates; skipped", city.name);
                continue;
            }
            let id = SyntheticId::from_degrees(city.latitude, city.longitude);
            if seen.insert(id.value(), ()).is_some() {
                debug!("city {:?} collides with an earlier record; skipped", city.name);
                continue;
            }
            kept.push(city);
        }
        kept.sort_by(|a, b| a.longitude.total_cmp(&b.longitude));
        kept
    }
}
