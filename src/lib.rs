//! Offline reverse geocoding over compacted country outlines.
//!
//! `terrapoint` answers, entirely offline, "which country, city, and time
//! zone is nearest to this coordinate, and what is a plausible elevation
//! there?" The data backing those answers is small enough to ship inside an
//! application bundle because country borders are reduced ahead of time to
//! at most 16 fixed-point vertices each.
//!
//! # Features
//!
//! - **Offline** - No network access at any point; all queries are bounded
//!   CPU-only computations over in-memory arrays
//! - **Compact** - Country outlines compacted to a handful of vertices,
//!   strings interned once, coordinates stored as fixed-point integers
//! - **Deterministic** - Integer coordinate comparisons never drift;
//!   documented tie-breaks for overlapping and nested countries
//! - **Thread-Safe** - Data is immutable after the one-time load; concurrent
//!   readers need no locking
//!
//! # Quick Start
//!
//! Build a store offline (normally done once, by the `build-database`
//! binary) and query it at run time:
//!
//! ```
//! use terrapoint::{Atlas, Pipeline, RawCity, RawRegion};
//!
//! let regions = vec![RawRegion {
//!     code: "FR".to_string(),
//!     // Ring points are [longitude, latitude] in decimal degrees.
//!     fragments: vec![vec![[-1.0, 43.0], [8.0, 43.0], [8.0, 50.0], [-1.0, 50.0]]],
//! }];
//! let cities = vec![RawCity {
//!     name: "Paris".to_string(),
//!     country_code: "FR".to_string(),
//!     latitude: 48.8566,
//!     longitude: 2.3522,
//!     elevation: Some(35.0),
//!     timezone: "Europe/Paris".to_string(),
//! }];
//!
//! let store = Pipeline::default().build(regions, cities);
//! let atlas = Atlas::from_store(store).unwrap();
//!
//! let mark = atlas.locate(48.85, 2.35).unwrap();
//! assert_eq!(mark.country_code.as_deref(), Some("FR"));
//! assert_eq!(mark.city.unwrap().name, "Paris");
//! ```
//!
//! # Architecture
//!
//! The offline pipeline runs once, ahead of time: raw multi-polygon country
//! shapes are normalized (rings closed, nearby fragments merged across a
//! synthetic isthmus, survivors reduced to convex hulls), compacted to at
//! most [`types::MAX_OUTLINE_VERTICES`] vertices by an angular sweep that
//! keeps the farthest point per sector, and serialized - together with the
//! longitude-sorted city table - into the flat parallel arrays of a
//! [`ResourceStore`].
//!
//! At run time the [`Atlas`] loads those arrays once and answers queries:
//!
//! 1. Country lookup: bounding-box prefilter, then nesting depth, ray-cast
//!    containment, and nearest-border distance to disambiguate overlaps;
//!    points in no box at all (open ocean) resolve to the nearest border
//! 2. City lookup: great-circle nearest within 20 km
//! 3. Time-zone reverse mapping: exact zone-id matches first, then the
//!    zone's canonical longitude band (15 degrees per offset hour)
//! 4. Elevation: inverse-distance weighting over cities on the same plateau
//!
//! # Thread Safety
//!
//! Loaded data is never mutated, so all queries are lock-free reads. The
//! one-time lazy initialization behind [`Atlas::install`] is guarded by a
//! `OnceLock`; concurrent first-callers cannot corrupt anything - at worst
//! the losing racer's work is dropped.
//!
//! # Limitations
//!
//! - Compacted outlines are rough star-shaped simplifications: precise near
//!   extremities, approximate along concave coastlines
//! - City answers are nearest-city, not street-level
//! - Ocean coordinates resolve to the nearest country border by design

#![warn(missing_docs)]

pub mod atlas;
pub mod compact;
pub mod countries;
mod error;
pub mod gazetteer;
pub mod geometry;
pub mod normalize;
pub mod pipeline;
pub mod store;
pub mod types;

pub use atlas::{Atlas, Placemark};
pub use countries::{CountryIndex, CountryRecord};
pub use error::Error;
pub use gazetteer::{City, Gazetteer};
pub use pipeline::{Pipeline, RawCity, RawRegion};
pub use store::ResourceStore;
pub use types::{Contour, Location, RingPoint, SyntheticId};
