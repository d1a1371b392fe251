//! Scene document loading.
//!
//! A scene file is a YAML mapping with three optional sections:
//!
//! ```yaml
//! map:
//!   id: sandiego
//!   center: San Diego, CA
//! places:
//!   San Diego, CA: [32.7157, -117.1611]
//! entities:
//!   - type: marker
//!     position: San Diego, CA
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::{MapError, Result};
use crate::geocode::PlaceTable;
use crate::types::Coordinate;

/// A scene file before locations are resolved and entities decoded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneDocument {
    /// Raw map settings; addresses are still text at this point.
    pub map: serde_yaml::Mapping,
    /// Scene-local place names, consulted before the project table.
    pub places: BTreeMap<String, Coordinate>,
    /// Entity definitions in author order, each tagged with `type:`.
    pub entities: Vec<serde_yaml::Value>,
}

impl SceneDocument {
    /// The scene's own places as a geocoder table.
    pub fn place_table(&self) -> PlaceTable {
        self.places.iter().map(|(name, c)| (name.as_str(), *c)).collect()
    }
}

/// Parse the text of a scene file.
pub fn parse_document(source: &str) -> Result<SceneDocument> {
    let value: serde_yaml::Value = serde_yaml::from_str(source).map_err(|e| MapError::Parse {
        message: format!("Invalid YAML in scene file: {}", e),
        help: None,
    })?;

    match value {
        serde_yaml::Value::Null => Err(MapError::Parse {
            message: "Scene file is empty".to_string(),
            help: Some("Add a `map:` section and an `entities:` list".to_string()),
        }),
        serde_yaml::Value::Mapping(_) => serde_yaml::from_value(value).map_err(|e| MapError::Parse {
            message: format!("Invalid scene file: {}", e),
            help: Some("Top-level keys are `map`, `places` and `entities`".to_string()),
        }),
        _ => Err(MapError::Parse {
            message: "Scene file must be a YAML mapping".to_string(),
            help: Some("Use key: value format".to_string()),
        }),
    }
}
