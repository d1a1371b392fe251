//! Routing requests rendered onto the map.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geocode::Geocoder;

use super::{Coordinate, Location, Options};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
}

impl TravelMode {
    pub fn name(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Metric,
    Imperial,
}

impl Units {
    pub fn name(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

/// An intermediate stop on a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub location: Coordinate,
    pub stopover: bool,
}

/// A route request plus the options of the renderer that draws it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionsRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub waypoints: Vec<Waypoint>,
    pub travel_mode: TravelMode,
    /// Falls back to the map's units when unset.
    pub units: Option<Units>,
    /// Extra request options (`avoidHighways`, ...).
    pub request_options: Options,
    /// Renderer options; `panel` names a DOM element id.
    pub renderer_options: Options,
}

impl DirectionsRequest {
    pub fn new(origin: Coordinate, destination: Coordinate, travel_mode: TravelMode) -> Self {
        Self {
            origin,
            destination,
            waypoints: Vec::new(),
            travel_mode,
            units: None,
            request_options: Options::new(),
            renderer_options: Options::new(),
        }
    }

    /// Build a request from coordinates or addresses.
    pub fn between(
        origin: impl Into<Location>,
        destination: impl Into<Location>,
        travel_mode: TravelMode,
        geocoder: &dyn Geocoder,
    ) -> Result<Self> {
        let origin = origin.into().resolve(geocoder)?;
        let destination = destination.into().resolve(geocoder)?;
        Ok(Self::new(origin, destination, travel_mode))
    }

    pub fn add_waypoint(&mut self, location: Coordinate, stopover: bool) {
        self.waypoints.push(Waypoint { location, stopover });
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }
}
