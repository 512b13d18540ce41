//! Geographic bounding box parsing and geofence evaluation.
//!
//! The Twitter filter endpoint expresses a bounding box as a four-component
//! comma-separated string in the fixed order `swlon,swlat,nelon,nelat`.
//! The same string is sent verbatim as the server-side `locations` filter
//! and re-parsed here for the client-side geofence check, so the component
//! order must be preserved exactly.
//!
//! Containment is strict on both axes: a coordinate on a box edge is
//! outside the fence. Twitter's geo accuracy is loose enough that the
//! conservative reading is the useful one.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Number of components in the wire representation.
const COMPONENT_COUNT: usize = 4;

/// Errors that can occur while parsing a bounding box string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeoError {
    /// The string did not have exactly four comma-separated components.
    #[error("expected {COMPONENT_COUNT} comma-separated components (swlon,swlat,nelon,nelat), got {0}")]
    ComponentCount(usize),

    /// A component could not be parsed as a number.
    #[error("component {index} is not a number: '{value}'")]
    InvalidComponent { index: usize, value: String },
}

/// A rectangular lat/lon bounding box.
///
/// Logically the box pairs latitudes and longitudes as (lat, lon) corners,
/// but the external representation orders components as
/// `swlon,swlat,nelon,nelat`.
///
/// # Example
///
/// ```
/// use tweetflume_connector::geo::BoundingBox;
///
/// let bbox: BoundingBox = "-93.3,44.9,-93.1,45.0".parse().unwrap();
/// assert!(bbox.contains(44.95, -93.2));
/// assert!(!bbox.contains(44.9, -93.2)); // on the southwest lat edge
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Latitude of the southwest corner.
    pub southwest_lat: f64,

    /// Longitude of the southwest corner.
    pub southwest_lon: f64,

    /// Latitude of the northeast corner.
    pub northeast_lat: f64,

    /// Longitude of the northeast corner.
    pub northeast_lon: f64,
}

impl BoundingBox {
    /// Returns true if the coordinate lies strictly inside the box.
    ///
    /// Boundary points are excluded on both axes.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.southwest_lat < lat
            && lat < self.northeast_lat
            && self.southwest_lon < lon
            && lon < self.northeast_lon
    }
}

impl FromStr for BoundingBox {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components: Vec<&str> = s.split(',').map(str::trim).collect();
        if components.len() != COMPONENT_COUNT {
            return Err(GeoError::ComponentCount(components.len()));
        }

        let mut values = [0.0_f64; COMPONENT_COUNT];
        for (index, component) in components.iter().enumerate() {
            values[index] = component
                .parse()
                .map_err(|_| GeoError::InvalidComponent {
                    index,
                    value: (*component).to_string(),
                })?;
        }

        // Wire order is swlon, swlat, nelon, nelat.
        Ok(Self {
            southwest_lon: values[0],
            southwest_lat: values[1],
            northeast_lon: values[2],
            northeast_lat: values[3],
        })
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.southwest_lon, self.southwest_lat, self.northeast_lon, self.northeast_lat
        )
    }
}
