//! Data layers drawn over the base map.

use serde::Serialize;

use super::{Coordinate, Options};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KmlLayer {
    pub url: String,
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionTable {
    /// Numeric or string table identifier.
    pub table_id: serde_json::Value,
    /// Layer options; a `query` string has its double quotes switched to single.
    pub options: Options,
}

/// An image stretched over a geographic bounding box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundOverlay {
    pub url: String,
    pub southwest: Coordinate,
    pub northeast: Coordinate,
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Layer {
    Kml(KmlLayer),
    FusionTable(FusionTable),
    GroundOverlay(GroundOverlay),
}

impl Layer {
    pub fn kml(url: impl Into<String>) -> Self {
        Layer::Kml(KmlLayer {
            url: url.into(),
            options: Options::new(),
        })
    }

    pub fn fusion_table(table_id: impl Into<serde_json::Value>) -> Self {
        Layer::FusionTable(FusionTable {
            table_id: table_id.into(),
            options: Options::new(),
        })
    }

    pub fn ground_overlay(url: impl Into<String>, southwest: Coordinate, northeast: Coordinate) -> Self {
        Layer::GroundOverlay(GroundOverlay {
            url: url.into(),
            southwest,
            northeast,
            options: Options::new(),
        })
    }

    pub fn options_mut(&mut self) -> &mut Options {
        match self {
            Layer::Kml(l) => &mut l.options,
            Layer::FusionTable(l) => &mut l.options,
            Layer::GroundOverlay(l) => &mut l.options,
        }
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options_mut().insert(key.into(), value.into());
        self
    }
}
