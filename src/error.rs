//! Library error type.
//!
//! Only genuine failures surface here: coordinates a caller should never
//! have passed in, and resource data that fails validation at load time.
//! "Nothing found" outcomes are ordinary `None` results, not errors.

use thiserror::Error;

/// Errors produced by the runtime lookup components.
#[derive(Debug, Error)]
pub enum Error {
    /// Latitude or longitude outside the valid range. Rejected before any
    /// scan begins; computing on such values would silently produce
    /// meaningless results.
    #[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate {
        /// Offending latitude in decimal degrees
        latitude: f64,
        /// Offending longitude in decimal degrees
        longitude: f64,
    },

    /// The resource store failed to decode.
    #[error("resource store is not decodable: {0}")]
    UndecodableStore(#[from] bincode::error::DecodeError),

    /// The resource store decoded but violates a structural invariant.
    #[error("resource store is corrupt: {0}")]
    CorruptStore(String),
}

/// Validates caller-supplied coordinates, the shared precondition of every
/// runtime query.
pub fn check_coordinates(latitude: f64, longitude: f64) -> Result<(), Error> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::InvalidCoordinate {
            latitude,
            longitude,
        });
    }
    Ok(())
}
