//! Vector overlays: circles, rectangles, polygons and polylines.

use serde::Serialize;

use crate::error::Result;
use crate::geocode::Geocoder;

use super::{Coordinate, Location, Options};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub center: Coordinate,
    /// Radius in metres.
    pub radius: f64,
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rectangle {
    pub southwest: Coordinate,
    pub northeast: Coordinate,
    pub options: Options,
}

/// A closed-form shape overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
}

impl Shape {
    pub fn circle(center: Coordinate, radius: f64) -> Self {
        Shape::Circle(Circle {
            center,
            radius,
            options: Options::new(),
        })
    }

    pub fn rectangle(southwest: Coordinate, northeast: Coordinate) -> Self {
        Shape::Rectangle(Rectangle {
            southwest,
            northeast,
            options: Options::new(),
        })
    }

    /// Create a circle centred on a coordinate or address.
    pub fn circle_at(
        location: impl Into<Location>,
        radius: f64,
        geocoder: &dyn Geocoder,
    ) -> Result<Self> {
        Ok(Self::circle(location.into().resolve(geocoder)?, radius))
    }

    pub fn options(&self) -> &Options {
        match self {
            Shape::Circle(c) => &c.options,
            Shape::Rectangle(r) => &r.options,
        }
    }

    pub fn options_mut(&mut self) -> &mut Options {
        match self {
            Shape::Circle(c) => &mut c.options,
            Shape::Rectangle(r) => &mut r.options,
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options_mut().insert(key.into(), value.into());
        self
    }
}

/// A filled polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    pub paths: Vec<Coordinate>,
    pub options: Options,
}

impl Polygon {
    pub fn new(paths: Vec<Coordinate>) -> Self {
        Self {
            paths,
            options: Options::new(),
        }
    }

    pub fn add_point(&mut self, point: Coordinate) {
        self.paths.push(point);
    }

    /// Append a point given as a coordinate or address.
    pub fn add_location(&mut self, location: impl Into<Location>, geocoder: &dyn Geocoder) -> Result<()> {
        let point = location.into().resolve(geocoder)?;
        self.paths.push(point);
        Ok(())
    }

    /// The mean of all path points, or `None` for an empty polygon.
    pub fn center(&self) -> Option<Coordinate> {
        if self.paths.is_empty() {
            return None;
        }
        let n = self.paths.len() as f64;
        let lat = self.paths.iter().map(|p| p.lat()).sum::<f64>() / n;
        let lng = self.paths.iter().map(|p| p.lng()).sum::<f64>() / n;
        Coordinate::new(lat, lng).ok()
    }
}

/// An open line through a sequence of points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    pub path: Vec<Coordinate>,
    pub options: Options,
}

impl Polyline {
    pub fn new(path: Vec<Coordinate>) -> Self {
        Self {
            path,
            options: Options::new(),
        }
    }

    pub fn add_point(&mut self, point: Coordinate) {
        self.path.push(point);
    }
}

/// A point-sequence overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Poly {
    Polygon(Polygon),
    Polyline(Polyline),
}

impl Poly {
    pub fn points(&self) -> &[Coordinate] {
        match self {
            Poly::Polygon(p) => &p.paths,
            Poly::Polyline(p) => &p.path,
        }
    }

    pub fn options(&self) -> &Options {
        match self {
            Poly::Polygon(p) => &p.options,
            Poly::Polyline(p) => &p.options,
        }
    }

    /// Lowercase name used in messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Poly::Polygon(_) => "polygon",
            Poly::Polyline(_) => "polyline",
        }
    }

    /// Minimum number of points for a drawable overlay.
    pub fn min_points(&self) -> usize {
        match self {
            Poly::Polygon(_) => 3,
            Poly::Polyline(_) => 2,
        }
    }
}
