//! Markers and the value objects they share.
//!
//! Icons and shapes are compared structurally: two markers carrying equal
//! icons end up referencing one emitted icon definition.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geocode::Geocoder;

use super::{normalize_variable, Coordinate, Location, Options};

/// Where a marker is placed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerPosition {
    /// A fixed coordinate.
    At(Coordinate),
    /// The browser's live location, available only after geolocation succeeds.
    Geolocation,
}

/// A marker image (icon or shadow).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerIcon {
    pub url: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub origin: (i32, i32),
    /// Defaults to the bottom centre of the image.
    #[serde(default)]
    pub anchor: Option<(i32, i32)>,
}

impl MarkerIcon {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            width,
            height,
            origin: (0, 0),
            anchor: None,
        }
    }

    pub fn with_anchor(mut self, x: i32, y: i32) -> Self {
        self.anchor = Some((x, y));
        self
    }

    pub fn with_origin(mut self, x: i32, y: i32) -> Self {
        self.origin = (x, y);
        self
    }

    /// The effective anchor point.
    pub fn anchor_point(&self) -> (i64, i64) {
        match self.anchor {
            Some((x, y)) => (i64::from(x), i64::from(y)),
            None => (i64::from(self.width) / 2, i64::from(self.height)),
        }
    }
}

/// Clickable region type of a marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShapeKind {
    Circle,
    Poly,
    Rect,
}

impl MarkerShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            MarkerShapeKind::Circle => "circle",
            MarkerShapeKind::Poly => "poly",
            MarkerShapeKind::Rect => "rect",
        }
    }
}

/// The clickable region of a marker image.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerShape {
    #[serde(rename = "type")]
    pub kind: MarkerShapeKind,
    pub coords: Vec<i32>,
}

impl MarkerShape {
    pub fn new(kind: MarkerShapeKind, coords: Vec<i32>) -> Self {
        Self { kind, coords }
    }
}

/// A named collection of markers that can be toggled together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MarkerGroup {
    /// Display name.
    pub name: String,
    /// Script-safe key derived from the name.
    pub var_name: String,
}

impl MarkerGroup {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let var_name = normalize_variable(&name);
        Self { name, var_name }
    }
}

/// A map marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: MarkerPosition,
    pub title: Option<String>,
    /// Info window HTML.
    pub content: Option<String>,
    pub icon: Option<MarkerIcon>,
    pub shadow: Option<MarkerIcon>,
    pub shape: Option<MarkerShape>,
    pub groups: Vec<MarkerGroup>,
    /// Remaining widget options (`animation`, `draggable`, ...).
    pub options: Options,
}

impl Marker {
    /// Create a marker at a fixed coordinate.
    pub fn new(position: Coordinate) -> Self {
        Self::with_position(MarkerPosition::At(position))
    }

    /// Create a marker placed at the user's live location.
    pub fn geolocated() -> Self {
        Self::with_position(MarkerPosition::Geolocation)
    }

    /// Create a marker from a coordinate or an address.
    pub fn from_location(location: impl Into<Location>, geocoder: &dyn Geocoder) -> Result<Self> {
        let position = location.into().resolve(geocoder)?;
        Ok(Self::new(position))
    }

    fn with_position(position: MarkerPosition) -> Self {
        Self {
            position,
            title: None,
            content: None,
            icon: None,
            shadow: None,
            shape: None,
            groups: Vec::new(),
            options: Options::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_icon(mut self, icon: MarkerIcon) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_shadow(mut self, shadow: MarkerIcon) -> Self {
        self.shadow = Some(shadow);
        self
    }

    pub fn with_shape(mut self, shape: MarkerShape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Add the marker to a group. Adding to the same group twice is a no-op.
    pub fn add_to_group(&mut self, group: &MarkerGroup) {
        if !self.groups.iter().any(|g| g.var_name == group.var_name) {
            self.groups.push(group.clone());
        }
    }

    pub fn is_geolocated(&self) -> bool {
        matches!(self.position, MarkerPosition::Geolocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_group_var_name() {
        let group = MarkerGroup::new("Coffee Shops!");
        assert_eq!(group.name, "Coffee Shops!");
        assert_eq!(group.var_name, "CoffeeShops");
    }

    #[test]
    fn test_add_to_group_is_idempotent() {
        let group = MarkerGroup::new("parks");
        let mut marker = Marker::new(Coordinate::new(0.0, 0.0).unwrap());
        marker.add_to_group(&group);
        marker.add_to_group(&group);
        assert_eq!(marker.groups.len(), 1);
    }

    #[test]
    fn test_icon_structural_equality() {
        let a = MarkerIcon::new("pin.png", 20, 32);
        let b = MarkerIcon::new("pin.png", 20, 32);
        let c = MarkerIcon::new("pin.png", 20, 32).with_anchor(0, 0);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_icon_default_anchor() {
        let icon = MarkerIcon::new("pin.png", 20, 32);
        assert_eq!(icon.anchor_point(), (10, 32));
        assert_eq!(icon.with_anchor(3, 4).anchor_point(), (3, 4));

        let wide = MarkerIcon::new("banner.png", u32::MAX, u32::MAX);
        assert_eq!(wide.anchor_point(), (2_147_483_647, 4_294_967_295));
    }

    #[test]
    fn test_marker_icon_deserialize() {
        let icon: MarkerIcon =
            serde_yaml::from_str("{ url: a.png, width: 10, height: 12, anchor: [5, 12] }").unwrap();
        assert_eq!(icon.origin, (0, 0));
        assert_eq!(icon.anchor, Some((5, 12)));
    }
}
