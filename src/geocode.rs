//! Address resolution boundary.
//!
//! Turning free text into coordinates is an external service. The generator
//! only depends on the narrow [`Geocoder`] trait; the CLI plugs in a
//! [`PlaceTable`] built from the manifest and scene `places:` tables.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::types::Coordinate;

/// Why an address could not be resolved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("no match for address")]
    NotFound,

    #[error("address is empty")]
    Empty,

    #[error("geocoding is unavailable")]
    Unavailable,
}

/// Resolves free-text addresses to coordinates.
pub trait Geocoder {
    fn resolve(&self, text: &str) -> Result<Coordinate, ResolveError>;
}

/// A geocoder that never resolves anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeocoder;

impl Geocoder for NoGeocoder {
    fn resolve(&self, _text: &str) -> Result<Coordinate, ResolveError> {
        Err(ResolveError::Unavailable)
    }
}

/// Table-backed geocoder keyed by normalized place name.
///
/// Lookups ignore case and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct PlaceTable {
    places: BTreeMap<String, Coordinate>,
}

impl PlaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a place.
    pub fn insert(&mut self, name: impl AsRef<str>, coordinate: Coordinate) -> &mut Self {
        self.places.insert(normalize(name.as_ref()), coordinate);
        self
    }

    /// Merge another table over this one; entries in `other` win.
    pub fn extend(&mut self, other: &PlaceTable) {
        for (name, coordinate) in &other.places {
            self.places.insert(name.clone(), *coordinate);
        }
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<(S, Coordinate)> for PlaceTable {
    fn from_iter<I: IntoIterator<Item = (S, Coordinate)>>(iter: I) -> Self {
        let mut table = PlaceTable::new();
        for (name, coordinate) in iter {
            table.insert(name, coordinate);
        }
        table
    }
}

impl Geocoder for PlaceTable {
    fn resolve(&self, text: &str) -> Result<Coordinate, ResolveError> {
        let key = normalize(text);
        if key.is_empty() {
            return Err(ResolveError::Empty);
        }
        self.places.get(&key).copied().ok_or(ResolveError::NotFound)
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_place_table_lookup_is_normalized() {
        let table: PlaceTable = [("New York,  NY", coord(40.7, -74.0))].into_iter().collect();

        assert_eq!(table.resolve("new york, ny"), Ok(coord(40.7, -74.0)));
        assert_eq!(table.resolve("  NEW YORK, NY "), Ok(coord(40.7, -74.0)));
        assert_eq!(table.resolve("Boston"), Err(ResolveError::NotFound));
        assert_eq!(table.resolve("   "), Err(ResolveError::Empty));
    }

    #[test]
    fn test_place_table_extend_overrides() {
        let mut base: PlaceTable = [("home", coord(1.0, 1.0))].into_iter().collect();
        let local: PlaceTable = [("home", coord(2.0, 2.0))].into_iter().collect();
        base.extend(&local);

        assert_eq!(base.len(), 1);
        assert_eq!(base.resolve("home"), Ok(coord(2.0, 2.0)));
    }

    #[test]
    fn test_no_geocoder_fails() {
        assert_eq!(NoGeocoder.resolve("anywhere"), Err(ResolveError::Unavailable));
    }
}
