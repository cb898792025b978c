//! The process-scoped handle bundling the loaded store with both runtime
//! lookup components.
//!
//! Callers construct one [`Atlas`] (or [`install`](Atlas::install) it once
//! for the whole process) and share references; all loaded data is
//! immutable, so concurrent readers need no locking. The only
//! synchronization anywhere is the `OnceLock` guarding first
//! initialization - losing that race is harmless, the loser's work is
//! simply dropped.

use std::sync::{Arc, OnceLock};

use log::info;

use crate::countries::CountryIndex;
use crate::error::Error;
use crate::gazetteer::{City, Gazetteer};
use crate::store::ResourceStore;

static ATLAS: OnceLock<Atlas> = OnceLock::new();

/// Everything the surrounding application wants to know about one
/// coordinate, resolved in a single call.
#[derive(Debug, Clone)]
pub struct Placemark {
    /// ISO code of the containing or nearest country.
    pub country_code: Option<String>,
    /// Nearest city within the acceptance radius, if any.
    pub city: Option<City>,
    /// Estimated elevation in meters, where enough data exists.
    pub elevation: Option<f64>,
    /// Queried latitude in decimal degrees.
    pub latitude: f64,
    /// Queried longitude in decimal degrees.
    pub longitude: f64,
}

impl Placemark {
    /// The IANA time zone of the nearest city, if one was found.
    pub fn timezone(&self) -> Option<&str> {
        self.city.as_ref().map(|c| c.timezone.as_str())
    }
}

/// Loaded, immutable geocoding state: resource store, country index, and
/// gazetteer.
pub struct Atlas {
    store: Arc<ResourceStore>,
    countries: CountryIndex,
    gazetteer: Gazetteer,
}

impl Atlas {
    /// Builds an atlas from an already-decoded store, validating it first.
    pub fn from_store(store: ResourceStore) -> Result<Self, Error> {
        store.validate()?;
        let store = Arc::new(store);
        let countries = CountryIndex::from_store(&store);
        let gazetteer = Gazetteer::from_store(Arc::clone(&store));
        info!(
            "atlas ready: {} countries, {} cities",
            store.country_count(),
            store.city_count()
        );
        Ok(Self {
            store,
            countries,
            gazetteer,
        })
    }

    /// Decodes and loads an atlas from the store's binary form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_store(ResourceStore::from_bytes(bytes)?)
    }

    /// Installs a process-wide atlas on first call and returns it; later
    /// calls return the already-installed atlas and drop their argument.
    pub fn install(store: ResourceStore) -> Result<&'static Atlas, Error> {
        if let Some(existing) = ATLAS.get() {
            return Ok(existing);
        }
        let atlas = Self::from_store(store)?;
        Ok(ATLAS.get_or_init(|| atlas))
    }

    /// The process-wide atlas, if one has been installed.
    pub fn global() -> Option<&'static Atlas> {
        ATLAS.get()
    }

    /// The country lookup component.
    pub fn countries(&self) -> &CountryIndex {
        &self.countries
    }

    /// The city/time-zone/elevation lookup component.
    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// The underlying resource store.
    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Resolves a coordinate to country, city, and elevation in one call.
    pub fn locate(&self, latitude: f64, longitude: f64) -> Result<Placemark, Error> {
        let country_code = self
            .countries
            .find_country_index(latitude, longitude)?
            .map(|i| self.countries.record(i).code().to_string());
        let city = self.gazetteer.find_city(latitude, longitude)?;
        let elevation = self.gazetteer.find_elevation(latitude, longitude)?;
        Ok(Placemark {
            country_code,
            city,
            elevation,
            latitude,
            longitude,
        })
    }
}
