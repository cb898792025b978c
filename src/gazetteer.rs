//! Runtime city, time-zone, and elevation lookup over the flat city table.
//!
//! The city arrays are sorted ascending by longitude, so every radius or
//! band search seeks to its western bound once and stops scanning as soon
//! as a record's longitude passes the eastern bound.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use chrono_tz::{OffsetComponents, Tz};

use crate::error::{check_coordinates, Error};
use crate::store::ResourceStore;
use crate::types::{Location, CITY_SEARCH_RADIUS_KM, PLATEAU_RADIUS_KM};

/// Kilometers per degree of longitude at the equator, rounded down a little
/// so longitude bands always cover the full search radius.
const KM_PER_DEGREE: f64 = 111.0;

/// Half-width, in degrees, of one time zone's nominal longitude band.
const ZONE_HALF_WIDTH_DEG: f64 = 7.5;

/// A resolved city record returned from gazetteer queries.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    /// City name.
    pub name: String,
    /// Owning ISO country code.
    pub country_code: String,
    /// IANA time-zone identifier.
    pub timezone: String,
    /// City coordinates in decimal degrees.
    pub location: Location,
    /// Elevation in meters, where known.
    pub elevation: Option<f32>,
    /// Great-circle distance from the query point in kilometers.
    pub distance_km: f64,
}

/// City/time-zone/elevation lookup component.
pub struct Gazetteer {
    store: Arc<ResourceStore>,
}

impl Gazetteer {
    /// Wraps the loaded resource store.
    pub fn from_store(store: Arc<ResourceStore>) -> Self {
        Self { store }
    }

    fn location(&self, index: usize) -> Location {
        Location::new(self.store.city_lats[index], self.store.city_lons[index])
    }

    fn resolve(&self, index: usize, distance_km: f64) -> City {
        City {
            name: self.store.string(self.store.city_names[index]).to_string(),
            country_code: self
                .store
                .string(self.store.city_countries[index])
                .to_string(),
            timezone: self
                .store
                .string(self.store.city_timezones[index])
                .to_string(),
            location: self.location(index),
            elevation: self.store.city_elevations[index],
            distance_km,
        }
    }

    /// The nearest city within [`CITY_SEARCH_RADIUS_KM`], if any.
    pub fn find_city(&self, latitude: f64, longitude: f64) -> Result<Option<City>, Error> {
        check_coordinates(latitude, longitude)?;
        let nearest = self
            .scan_within(latitude, longitude, CITY_SEARCH_RADIUS_KM)
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1));
        Ok(nearest.map(|(i, d)| self.resolve(i, d)))
    }

    /// All cities within `radius_km` of the coordinate, nearest first.
    pub fn cities_within(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: f64,
    ) -> Result<Vec<City>, Error> {
        check_coordinates(latitude, longitude)?;
        let mut hits = self.scan_within(latitude, longitude, radius_km);
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(hits
            .into_iter()
            .map(|(i, d)| self.resolve(i, d))
            .collect())
    }

    /// Indices and distances of all cities within `radius_km`, using the
    /// ascending-longitude order to bound the scan.
    fn scan_within(&self, latitude: f64, longitude: f64, radius_km: f64) -> Vec<(usize, f64)> {
        let here = Location::new(latitude, longitude);
        let cos_lat = latitude.to_radians().cos().abs();
        let max_dlon = if cos_lat < 1e-3 {
            360.0
        } else {
            radius_km / (KM_PER_DEGREE * cos_lat)
        };

        let lons = &self.store.city_lons;
        let start = lons.partition_point(|&l| l < longitude - max_dlon);
        let mut hits = Vec::new();
        for i in start..lons.len() {
            if lons[i] > longitude + max_dlon {
                break;
            }
            let d = here.distance_to(&self.location(i));
            if d <= radius_km {
                hits.push((i, d));
            }
        }
        hits
    }

    /// An approximate coordinate for a time-zone identifier.
    ///
    /// Cities carrying exactly this zone id are preferred; one match is
    /// returned as-is, several are reduced to the candidate nearest their
    /// common centroid. Without any id match the search falls back to the
    /// zone's canonical longitude (15 degrees per hour of base UTC offset)
    /// and widens over a half then a full nominal zone band, both handled
    /// as two disjoint ranges where they cross the antimeridian.
    pub fn find_location_for_time_zone(&self, zone_id: &str) -> Option<Location> {
        let by_id: Vec<usize> = match self
            .store
            .strings
            .iter()
            .position(|s| s == zone_id)
        {
            Some(idx) => {
                let idx = idx as u32;
                (0..self.store.city_count())
                    .filter(|&i| self.store.city_timezones[i] == idx)
                    .collect()
            }
            None => Vec::new(),
        };
        if by_id.len() == 1 {
            return Some(self.location(by_id[0]));
        }
        if by_id.len() > 1 {
            return self.nearest_to_centroid(&by_id);
        }

        let canonical = canonical_longitude(zone_id)?;
        for half_width in [ZONE_HALF_WIDTH_DEG, 2.0 * ZONE_HALF_WIDTH_DEG] {
            let band = self.band_candidates(canonical, half_width);
            match band.len() {
                0 => continue,
                1 => return Some(self.location(band[0])),
                _ => return self.nearest_to_centroid(&band),
            }
        }
        None
    }

    /// City indices whose longitude falls within `half_width` degrees of
    /// `center`, wrapping across the antimeridian.
    fn band_candidates(&self, center: f64, half_width: f64) -> Vec<usize> {
        let lo = center - half_width;
        let hi = center + half_width;
        let mut out = if lo < -180.0 {
            let mut v = self.indices_in_lon_range(lo + 360.0, 180.0);
            v.extend(self.indices_in_lon_range(-180.0, hi));
            v
        } else if hi > 180.0 {
            let mut v = self.indices_in_lon_range(lo, 180.0);
            v.extend(self.indices_in_lon_range(-180.0, hi - 360.0));
            v
        } else {
            self.indices_in_lon_range(lo, hi)
        };
        out.sort_unstable();
        out.dedup();
        out
    }

    fn indices_in_lon_range(&self, lo: f64, hi: f64) -> Vec<usize> {
        let lons = &self.store.city_lons;
        let start = lons.partition_point(|&l| l < lo);
        let mut out = Vec::new();
        for i in start..lons.len() {
            if lons[i] > hi {
                break;
            }
            out.push(i);
        }
        out
    }

    /// The candidate nearest the candidates' mean coordinate; minimizes
    /// average error instead of biasing toward storage order.
    fn nearest_to_centroid(&self, candidates: &[usize]) -> Option<Location> {
        if candidates.is_empty() {
            return None;
        }
        let n = candidates.len() as f64;
        let mut lat = 0.0;
        let mut lon = 0.0;
        for &i in candidates {
            lat += self.store.city_lats[i];
            lon += self.store.city_lons[i];
        }
        let centroid = Location::new(lat / n, lon / n);
        candidates
            .iter()
            .map(|&i| self.location(i))
            .min_by(|a, b| {
                a.distance_to(&centroid)
                    .total_cmp(&b.distance_to(&centroid))
            })
    }

    /// Estimated elevation at the coordinate, from cities on the same
    /// plateau with known elevations.
    ///
    /// A candidate at most half as far away as every other candidate is
    /// trusted directly; interpolating around such a clearly local answer
    /// would only smooth it away. Otherwise the candidates are combined
    /// with weights `1 - d_i^2 / sum(d^2)`, the total divided by `n - 1`.
    /// Fewer than two usable candidates yield `None` rather than a guess.
    pub fn find_elevation(&self, latitude: f64, longitude: f64) -> Result<Option<f64>, Error> {
        check_coordinates(latitude, longitude)?;
        let mut candidates: Vec<(f64, f64)> = self
            .scan_within(latitude, longitude, PLATEAU_RADIUS_KM)
            .into_iter()
            .filter_map(|(i, d)| {
                self.store.city_elevations[i]
                    .map(|elevation| (d, elevation as f64))
            })
            .collect();
        if candidates.len() < 2 {
            return Ok(None);
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        if 2.0 * candidates[0].0 <= candidates[1].0 {
            return Ok(Some(candidates[0].1));
        }

        let sum_sq: f64 = candidates.iter().map(|(d, _)| d * d).sum();
        if sum_sq == 0.0 {
            let mean = candidates.iter().map(|(_, e)| e).sum::<f64>() / candidates.len() as f64;
            return Ok(Some(mean));
        }
        let weighted: f64 = candidates
            .iter()
            .map(|(d, e)| (1.0 - d * d / sum_sq) * e)
            .sum();
        Ok(Some(weighted / (candidates.len() - 1) as f64))
    }
}

/// Longitude implied by the zone's base UTC offset, 15 degrees per hour,
/// wrapped into [-180, 180].
fn canonical_longitude(zone_id: &str) -> Option<f64> {
    let tz: Tz = zone_id.parse().ok()?;
    let offset = tz.offset_from_utc_datetime(&Utc::now().naive_utc());
    let hours = offset.base_utc_offset().num_seconds() as f64 / 3600.0;
    let mut lon = hours * 15.0;
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    Some(lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{Pipeline, RawCity};

    fn city(name: &str, cc: &str, lat: f64, lon: f64, elev: Option<f32>, tz: &str) -> RawCity {
        RawCity {
            name: name.to_string(),
            country_code: cc.to_string(),
            latitude: lat,
            longitude: lon,
            elevation: elev,
            timezone: tz.to_string(),
        }
    }

    fn gazetteer(cities: Vec<RawCity>) -> Gazetteer {
        let store = Pipeline::default().build(Vec::new(), cities);
        Gazetteer::from_store(Arc::new(store))
    }

    #[test]
    fn nearest_city_within_radius() {
        let gaz = gazetteer(vec![
            city("Near", "AA", 0.0, 0.05, None, "Etc/UTC"),
            city("Far", "AA", 0.0, 0.12, None, "Etc/UTC"),
        ]);
        let hit = gaz.find_city(0.0, 0.0).unwrap().unwrap();
        assert_eq!(hit.name, "Near");
        assert!(hit.distance_km < 6.0);
    }

    #[test]
    fn no_city_beyond_search_radius() {
        let gaz = gazetteer(vec![city("Lone", "AA", 0.0, 0.3, None, "Etc/UTC")]);
        // ~33 km away, past the 20 km acceptance radius.
        assert!(gaz.find_city(0.0, 0.0).unwrap().is_none());
    }

    #[test]
    fn radius_search_collects_sorted_subset() {
        let gaz = gazetteer(vec![
            city("A", "AA", 0.0, 0.02, None, "Etc/UTC"),
            city("B", "AA", 0.0, 0.10, None, "Etc/UTC"),
            city("C", "AA", 0.0, 0.50, None, "Etc/UTC"),
        ]);
        let hits = gaz.cities_within(0.0, 0.0, 15.0).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "A");
        assert_eq!(hits[1].name, "B");
    }

    #[test]
    fn invalid_coordinates_rejected() {
        let gaz = gazetteer(Vec::new());
        assert!(gaz.find_city(100.0, 0.0).is_err());
        assert!(gaz.cities_within(0.0, 181.0, 5.0).is_err());
        assert!(gaz.find_elevation(-91.0, 0.0).is_err());
    }

    #[test]
    fn single_zone_id_match_returns_exact_coordinate() {
        let gaz = gazetteer(vec![
            city("Auckland", "NZ", -36.85, 174.76, None, "Pacific/Auckland"),
            city("Sydney", "AU", -33.87, 151.21, None, "Australia/Sydney"),
        ]);
        let loc = gaz
            .find_location_for_time_zone("Pacific/Auckland")
            .unwrap();
        assert_eq!(loc, Location::new(-36.85, 174.76));
    }

    #[test]
    fn multiple_zone_id_matches_pick_nearest_to_centroid() {
        let gaz = gazetteer(vec![
            city("West", "DE", 50.0, 7.0, None, "Europe/Berlin"),
            city("Mid", "DE", 50.0, 10.0, None, "Europe/Berlin"),
            city("East", "DE", 50.0, 13.2, None, "Europe/Berlin"),
        ]);
        let loc = gaz
            .find_location_for_time_zone("Europe/Berlin")
            .unwrap();
        assert_eq!(loc, Location::new(50.0, 10.0));
    }

    #[test]
    fn unmatched_zone_falls_back_to_canonical_band() {
        // No city carries the zone id; Honolulu's base offset is UTC-10, so
        // the canonical longitude is -150 and the Tahiti record sits inside
        // the half-band.
        let gaz = gazetteer(vec![
            city("Papeete", "PF", -17.55, -149.57, None, "Pacific/Tahiti"),
            city("Lima", "PE", -12.05, -77.04, None, "America/Lima"),
        ]);
        let loc = gaz
            .find_location_for_time_zone("Pacific/Honolulu")
            .unwrap();
        assert_eq!(loc, Location::new(-17.55, -149.57));
    }

    #[test]
    fn band_search_wraps_across_the_antimeridian() {
        // Etc/GMT-12 is UTC+12: canonical longitude 180. The only nearby
        // record sits on the far side of the antimeridian.
        let gaz = gazetteer(vec![
            city("Funafuti", "TV", -8.52, 179.2, None, "Pacific/Funafuti"),
            city("Suva", "FJ", -18.14, 178.44, None, "Pacific/Fiji"),
            city("BakerReach", "UM", 0.2, -176.5, None, "Pacific/Majuro"),
        ]);
        let loc = gaz.find_location_for_time_zone("Etc/GMT-12").unwrap();
        // All three fall in the wrapped band; the centroid-nearest one wins.
        assert_eq!(loc, Location::new(-18.14, 178.44));
    }

    #[test]
    fn unknown_zone_with_no_candidates_is_none() {
        let gaz = gazetteer(vec![city("Lima", "PE", -12.05, -77.04, None, "America/Lima")]);
        assert!(gaz.find_location_for_time_zone("not/a-zone").is_none());
        assert!(gaz
            .find_location_for_time_zone("Asia/Tokyo")
            .is_none());
    }

    #[test]
    fn equidistant_cities_interpolate_between_elevations() {
        let gaz = gazetteer(vec![
            city("Low", "AA", 0.0, -0.09, Some(500.0), "Etc/UTC"),
            city("High", "AA", 0.0, 0.09, Some(700.0), "Etc/UTC"),
        ]);
        let elevation = gaz.find_elevation(0.0, 0.0).unwrap().unwrap();
        assert!(elevation > 500.0 && elevation < 700.0);
        assert!((elevation - 600.0).abs() < 1.0);
    }

    #[test]
    fn clearly_nearest_city_wins_outright() {
        let gaz = gazetteer(vec![
            city("Here", "AA", 0.0, 0.01, Some(500.0), "Etc/UTC"),
            city("There", "AA", 0.0, 0.2, Some(700.0), "Etc/UTC"),
        ]);
        let elevation = gaz.find_elevation(0.0, 0.0).unwrap().unwrap();
        assert_eq!(elevation, 500.0);
    }

    #[test]
    fn too_few_elevation_candidates_yield_unknown() {
        // No candidates at all.
        let empty = gazetteer(Vec::new());
        assert_eq!(empty.find_elevation(0.0, 0.0).unwrap(), None);
        // One city in range, one too far, one without a known elevation.
        let gaz = gazetteer(vec![
            city("Near", "AA", 0.0, 0.05, Some(120.0), "Etc/UTC"),
            city("NoData", "AA", 0.0, 0.08, None, "Etc/UTC"),
            city("Far", "AA", 0.0, 3.0, Some(900.0), "Etc/UTC"),
        ]);
        assert_eq!(gaz.find_elevation(0.0, 0.0).unwrap(), None);
    }
}
