//! Scene construction from a parsed document.

use serde_yaml::Value;

use crate::error::{MapError, Result};
use crate::geocode::{Geocoder, PlaceTable};
use crate::registry::{RegistrationPolicy, Scene};
use crate::types::MapSettings;

use super::document::{parse_document, SceneDocument};
use super::entity::EntityDecoder;
use super::location::resolve_map_locations;

/// Parse scene file text into a populated scene.
///
/// Addresses are looked up in the scene's own `places:` first, then in
/// `places`.
pub fn parse_scene(source: &str, places: &PlaceTable, policy: RegistrationPolicy) -> Result<Scene> {
    let document = parse_document(source)?;
    let mut table = places.clone();
    table.extend(&document.place_table());
    build_scene(document, &table, policy)
}

/// Build a scene from a parsed document with any geocoder.
pub fn build_scene(
    document: SceneDocument,
    geocoder: &dyn Geocoder,
    policy: RegistrationPolicy,
) -> Result<Scene> {
    let SceneDocument { mut map, entities, .. } = document;

    resolve_map_locations(&mut map, geocoder)?;
    let settings: MapSettings =
        serde_yaml::from_value(Value::Mapping(map)).map_err(|e| MapError::Parse {
            message: format!("Invalid map settings: {}", e),
            help: None,
        })?;

    let mut scene = Scene::new(settings);
    let mut decoder = EntityDecoder::new(geocoder);

    for value in &entities {
        let mut name = None;
        let handle = scene.register_raw(value, policy, |mapping| {
            let (entity, id) = decoder.decode(mapping)?;
            name = id;
            Ok(entity)
        })?;
        if let (Some(handle), Some(name)) = (handle, name) {
            decoder.name(name, handle.reference())?;
        }
    }

    Ok(scene)
}
