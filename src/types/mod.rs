//! Core domain types for mapscript.
//!
//! This module contains the values a scene is built from:
//! - `Coordinate` / `Location` - positions, literal or by address
//! - `Marker`, `Shape`, `Poly`, `Layer` - the drawable entities
//! - `EventListener`, `Bind`, `DirectionsRequest` - behaviour wired into the map
//! - `MapSettings` - map-level options
//! - `Entity` - the sum type the registry accepts

mod coord;
mod directions;
mod entity;
mod event;
mod layer;
mod marker;
mod overlay;
mod settings;
mod style;

pub use coord::{format_number, Coordinate, Location};
pub use directions::{DirectionsRequest, TravelMode, Units, Waypoint};
pub use entity::Entity;
pub use event::{Bind, EventListener, ListenerTarget};
pub use layer::{FusionTable, GroundOverlay, KmlLayer, Layer};
pub use marker::{Marker, MarkerGroup, MarkerIcon, MarkerPosition, MarkerShape, MarkerShapeKind};
pub use overlay::{Circle, Poly, Polygon, Polyline, Rectangle, Shape};
pub use settings::{
    ControlSettings, Controls, GeolocationSettings, LiveLocation, MapSettings, StreetView,
    StreetViewPosition,
};
pub use style::{ControlListener, CustomControl, MapStyle};

/// An ordered option map, emitted in insertion order.
pub type Options = serde_json::Map<String, serde_json::Value>;

/// Strip every non-word character so a name can be used as a script identifier.
///
/// A leading digit gets an underscore prefix. The result is empty when the
/// name has no word characters at all.
pub fn normalize_variable(name: &str) -> String {
    let var: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if var.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", var)
    } else {
        var
    }
}
