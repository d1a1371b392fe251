//! Address pre-resolution for map-level settings.
//!
//! Map settings accept coordinates only. Before they are deserialized, any
//! address text in a location-valued key is resolved and replaced with a
//! `[lat, lng]` pair.

use serde_yaml::{Mapping, Value};

use crate::error::Result;
use crate::geocode::Geocoder;
use crate::types::{Coordinate, Location};

/// Keyword accepted in place of a street view position.
const LIVE_LOCATION: &str = "geolocation";

/// Resolve the address-valued keys of a raw `map:` section in place.
///
/// Handles `center`, `geolocation.backup` and `street_view.position`; the
/// latter keeps the `geolocation` keyword.
pub fn resolve_map_locations(map: &mut Mapping, geocoder: &dyn Geocoder) -> Result<()> {
    if let Some(center) = map.get_mut("center") {
        resolve_value(center, geocoder)?;
    }

    if let Some(Value::Mapping(geolocation)) = map.get_mut("geolocation") {
        if let Some(backup) = geolocation.get_mut("backup") {
            resolve_value(backup, geocoder)?;
        }
    }

    if let Some(Value::Mapping(street_view)) = map.get_mut("street_view") {
        if let Some(position) = street_view.get_mut("position") {
            let live = position
                .as_str()
                .is_some_and(|text| text.trim().eq_ignore_ascii_case(LIVE_LOCATION));
            if live {
                *position = Value::String(LIVE_LOCATION.to_string());
            } else {
                resolve_value(position, geocoder)?;
            }
        }
    }

    Ok(())
}

/// Whether a location is the live-location keyword.
pub fn is_live_location(location: &Location) -> bool {
    matches!(location, Location::Address(text) if text.trim().eq_ignore_ascii_case(LIVE_LOCATION))
}

/// Replace address text with its coordinate; other values are left for
/// deserialization to check.
fn resolve_value(value: &mut Value, geocoder: &dyn Geocoder) -> Result<()> {
    if let Value::String(text) = value {
        let coordinate = Location::Address(text.clone()).resolve(geocoder)?;
        *value = coordinate_value(coordinate);
    }
    Ok(())
}

fn coordinate_value(coordinate: Coordinate) -> Value {
    Value::Sequence(vec![Value::from(coordinate.lat()), Value::from(coordinate.lng())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MapError;
    use crate::geocode::PlaceTable;
    use crate::types::{MapSettings, StreetViewPosition};

    fn places() -> PlaceTable {
        [("Harbor", Coordinate::new(32.7, -117.2).unwrap())]
            .into_iter()
            .collect()
    }

    fn settings(yaml: &str) -> Result<MapSettings> {
        let mut map: Mapping = serde_yaml::from_str(yaml).unwrap();
        resolve_map_locations(&mut map, &places())?;
        Ok(serde_yaml::from_value(Value::Mapping(map)).unwrap())
    }

    #[test]
    fn test_center_address_resolved() {
        let settings = settings("center: harbor\n").unwrap();
        assert_eq!(settings.center, Some(Coordinate::new(32.7, -117.2).unwrap()));
    }

    #[test]
    fn test_literal_center_untouched() {
        let settings = settings("center: [1.5, 2.5]\n").unwrap();
        assert_eq!(settings.center, Some(Coordinate::new(1.5, 2.5).unwrap()));
    }

    #[test]
    fn test_backup_and_street_view() {
        let settings = settings(
            "geolocation:\n  backup: Harbor\nstreet_view:\n  position: Geolocation\n",
        )
        .unwrap();
        assert!(settings.geolocation.backup.is_some());
        assert!(matches!(
            settings.street_view.and_then(|v| v.position),
            Some(StreetViewPosition::Live(_))
        ));
    }

    #[test]
    fn test_unknown_address_fails() {
        let err = settings("center: Atlantis\n").unwrap_err();
        assert!(matches!(err, MapError::Resolution { address, .. } if address == "Atlantis"));
    }

    #[test]
    fn test_live_location_keyword() {
        assert!(is_live_location(&Location::from(" GeoLocation ")));
        assert!(!is_live_location(&Location::from("Harbor")));
    }
}
