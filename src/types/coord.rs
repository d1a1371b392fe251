//! Geographic coordinates and locations.
//!
//! A `Coordinate` is an immutable, validated latitude/longitude pair. A
//! `Location` is what scene authors write: either a literal coordinate or
//! free text that must be routed through a [`Geocoder`](crate::geocode::Geocoder).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geocode::Geocoder;

/// A latitude/longitude pair in degrees.
///
/// Latitude is within [-90, 90] and longitude within [-180, 180]; both are
/// finite. Equality is by value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CoordinateRepr")]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

/// Accepted authoring forms: `[lat, lng]` or `{ lat, lng }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CoordinateRepr {
    Pair([f64; 2]),
    Object { lat: f64, lng: f64 },
}

impl TryFrom<CoordinateRepr> for Coordinate {
    type Error = String;

    fn try_from(repr: CoordinateRepr) -> std::result::Result<Self, Self::Error> {
        let (lat, lng) = match repr {
            CoordinateRepr::Pair([lat, lng]) => (lat, lng),
            CoordinateRepr::Object { lat, lng } => (lat, lng),
        };
        Coordinate::new(lat, lng).map_err(|e| e.to_string())
    }
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(MapError::MalformedInput {
                message: format!("latitude {} is outside [-90, 90]", lat),
                help: None,
            });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(MapError::MalformedInput {
                message: format!("longitude {} is outside [-180, 180]", lng),
                help: None,
            });
        }
        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Render as a point-constructor call for the target widget.
    pub fn to_js(&self) -> String {
        format!(
            "new google.maps.LatLng({},{})",
            format_number(self.lat),
            format_number(self.lng)
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", format_number(self.lat), format_number(self.lng))
    }
}

/// Format a number the way it should appear in script text.
///
/// Integral values drop the fractional part (`32.0` -> `32`).
pub fn format_number(n: f64) -> String {
    format!("{}", n)
}

/// A position as written by an author: coordinates or an address.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Coordinate(Coordinate),
    Address(String),
}

impl Location {
    /// Resolve to a coordinate, consulting the geocoder for addresses.
    pub fn resolve(&self, geocoder: &dyn Geocoder) -> Result<Coordinate> {
        match self {
            Location::Coordinate(c) => Ok(*c),
            Location::Address(text) => {
                geocoder.resolve(text).map_err(|e| MapError::Resolution {
                    address: text.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl From<Coordinate> for Location {
    fn from(c: Coordinate) -> Self {
        Location::Coordinate(c)
    }
}

impl From<&str> for Location {
    fn from(text: &str) -> Self {
        Location::Address(text.to_string())
    }
}

impl From<String> for Location {
    fn from(text: String) -> Self {
        Location::Address(text)
    }
}
