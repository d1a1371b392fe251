//! Scene registry for map entities.
//!
//! A `Scene` owns every registered entity, grouped by kind. Registration
//! wraps each entity in a `Handle` that carries its index and the id of the
//! owning scene.
//!
//! # Example
//!
//! ```ignore
//! use mapscript::registry::Scene;
//! use mapscript::types::{Coordinate, Marker, MapSettings};
//!
//! let mut scene = Scene::new(MapSettings::default());
//! let marker = scene.register(Marker::new(Coordinate::new(32.0, -117.0)?));
//! assert_eq!(marker.index(), 0);
//! ```

pub mod types;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::extract::{MarkerCache, MarkerData};
use crate::types::{
    normalize_variable, Bind, CustomControl, DirectionsRequest, Entity, EventListener, Layer,
    MapSettings, MapStyle, Marker, MarkerGroup, Poly, Shape,
};

pub use types::{EntityKind, EntityRef, Handle, SceneId};

/// How dynamic registration treats input it cannot turn into an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationPolicy {
    /// Skip the item and record it in `Scene::skipped`.
    #[default]
    Permissive,
    /// Fail with the decoding error.
    Strict,
}

/// A dynamic registration that was skipped under the permissive policy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Skipped {
    /// Position of the item among all dynamic registrations.
    pub position: usize,
    /// Error code of the failure (`mapscript::unsupported`, ...).
    pub code: String,
    pub reason: String,
}

/// An earlier definition dropped in favour of a newer one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Replaced {
    pub kind: EntityKind,
    /// Index of the dropped entity.
    pub previous: usize,
    /// Index of the entity that replaced it.
    pub index: usize,
    /// Display name, for named definitions such as map styles.
    pub name: Option<String>,
}

/// Anything `Scene::register` accepts: a bare entity or an existing handle.
#[derive(Debug, Clone)]
pub enum Registrable {
    Entity(Entity),
    Handle(Handle),
}

impl From<Entity> for Registrable {
    fn from(entity: Entity) -> Self {
        Registrable::Entity(entity)
    }
}

impl From<Handle> for Registrable {
    fn from(handle: Handle) -> Self {
        Registrable::Handle(handle)
    }
}

macro_rules! impl_registrable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Registrable {
                fn from(value: $ty) -> Self {
                    Registrable::Entity(Entity::from(value))
                }
            }
        )*
    };
}

impl_registrable!(
    Marker,
    MarkerGroup,
    Shape,
    Poly,
    Layer,
    EventListener,
    DirectionsRequest,
    MapStyle,
    Bind,
    CustomControl,
);

/// Per-kind storage. `next` only ever grows.
#[derive(Debug, Default)]
struct Arena {
    next: usize,
    handles: BTreeMap<usize, Handle>,
}

/// The aggregate of registered entities for one generated script.
#[derive(Debug)]
pub struct Scene {
    id: SceneId,
    settings: MapSettings,
    arenas: BTreeMap<EntityKind, Arena>,
    raw_seen: usize,
    skipped: Vec<Skipped>,
    replaced: Vec<Replaced>,
    marker_cache: MarkerCache,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(MapSettings::default())
    }
}

impl Scene {
    /// Create an empty scene. The map id is reduced to word characters.
    pub fn new(mut settings: MapSettings) -> Self {
        settings.id = normalize_variable(&settings.id);
        if settings.id.is_empty() {
            settings.id = "map".to_string();
        }
        Self {
            id: SceneId::next(),
            settings,
            arenas: BTreeMap::new(),
            raw_seen: 0,
            skipped: Vec::new(),
            replaced: Vec::new(),
            marker_cache: MarkerCache::default(),
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }

    /// The script identifier of this map.
    pub fn map_id(&self) -> &str {
        &self.settings.id
    }

    pub fn settings(&self) -> &MapSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut MapSettings {
        &mut self.settings
    }

    /// Register an entity, or look up an existing handle.
    ///
    /// A handle owned by this scene is returned unchanged without consuming
    /// an index. A handle owned by another scene is unwrapped and its entity
    /// registered here as new.
    pub fn register(&mut self, item: impl Into<Registrable>) -> Handle {
        match item.into() {
            Registrable::Entity(entity) => self.insert(entity),
            Registrable::Handle(handle) => {
                if handle.owner() == self.id {
                    if let Some(existing) = self.get(handle.reference()) {
                        return existing.clone();
                    }
                }
                self.insert(handle.into_entity())
            }
        }
    }

    /// Register several items in order.
    pub fn register_many<I, T>(&mut self, items: I) -> Vec<Handle>
    where
        I: IntoIterator<Item = T>,
        T: Into<Registrable>,
    {
        items.into_iter().map(|item| self.register(item)).collect()
    }

    /// Register an entity described by an untyped value.
    ///
    /// Non-mapping values are malformed input. `decode` turns a mapping into
    /// an entity and reports unknown type tags as unsupported. Under the
    /// permissive policy both failures yield `Ok(None)` and are recorded in
    /// `skipped`; every other error propagates.
    pub fn register_raw<F>(
        &mut self,
        value: &serde_yaml::Value,
        policy: RegistrationPolicy,
        decode: F,
    ) -> Result<Option<Handle>>
    where
        F: FnOnce(&serde_yaml::Mapping) -> Result<Entity>,
    {
        let position = self.raw_seen;
        self.raw_seen += 1;

        let decoded = match value.as_mapping() {
            Some(mapping) => decode(mapping),
            None => Err(MapError::MalformedInput {
                message: format!("entity #{} is {}, not a mapping", position + 1, describe(value)),
                help: Some("each entity must be a mapping with a `type` key".to_string()),
            }),
        };

        match decoded {
            Ok(entity) => Ok(Some(self.register(entity))),
            Err(err @ (MapError::MalformedInput { .. } | MapError::UnsupportedEntity { .. })) => {
                match policy {
                    RegistrationPolicy::Strict => Err(err),
                    RegistrationPolicy::Permissive => {
                        let code = match &err {
                            MapError::UnsupportedEntity { .. } => "mapscript::unsupported",
                            _ => "mapscript::malformed",
                        };
                        self.skipped.push(Skipped {
                            position,
                            code: code.to_string(),
                            reason: err.to_string(),
                        });
                        Ok(None)
                    }
                }
            }
            Err(err) => Err(err),
        }
    }

    fn insert(&mut self, mut entity: Entity) -> Handle {
        if let Entity::Marker(marker) = &mut entity {
            if marker.icon.is_none() {
                marker.icon = self.settings.default_icon.clone();
            }
            if marker.shadow.is_none() {
                marker.shadow = self.settings.default_shadow.clone();
            }
        }

        let kind = entity.kind();
        let arena = self.arenas.entry(kind).or_default();

        // Singletons and named styles replace earlier definitions.
        let (removed, name): (Vec<usize>, Option<String>) = match &entity {
            Entity::Directions(_) => (arena.handles.keys().copied().collect(), None),
            Entity::MapStyle(style) => (
                arena
                    .handles
                    .iter()
                    .filter(|(_, h)| {
                        matches!(h.entity(), Entity::MapStyle(s) if s.var_name == style.var_name)
                    })
                    .map(|(index, _)| *index)
                    .collect(),
                Some(style.name.clone()),
            ),
            _ => (Vec::new(), None),
        };
        for previous in &removed {
            arena.handles.remove(previous);
        }

        let index = arena.next;
        arena.next += 1;
        let handle = Handle::new(self.id, index, entity);
        arena.handles.insert(index, handle.clone());

        self.replaced.extend(removed.into_iter().map(|previous| Replaced {
            kind,
            previous,
            index,
            name: name.clone(),
        }));
        handle
    }

    /// Look up a registered entity. References owned by other scenes never match.
    pub fn get(&self, reference: EntityRef) -> Option<&Handle> {
        if reference.owner != self.id {
            return None;
        }
        self.arenas
            .get(&reference.kind)
            .and_then(|arena| arena.handles.get(&reference.index))
    }

    /// Mutable access to a registered entity. The handle's index is kept.
    pub fn get_mut(&mut self, reference: EntityRef) -> Option<&mut Entity> {
        if reference.owner != self.id {
            return None;
        }
        self.arenas
            .get_mut(&reference.kind)
            .and_then(|arena| arena.handles.get_mut(&reference.index))
            .map(Handle::entity_mut)
    }

    pub fn contains(&self, reference: EntityRef) -> bool {
        self.get(reference).is_some()
    }

    /// All live handles of a kind, in index order.
    pub fn handles(&self, kind: EntityKind) -> impl Iterator<Item = &Handle> {
        self.arenas
            .get(&kind)
            .into_iter()
            .flat_map(|arena| arena.handles.values())
    }

    /// Number of live entities of a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.arenas.get(&kind).map_or(0, |arena| arena.handles.len())
    }

    /// Total number of live entities.
    pub fn len(&self) -> usize {
        self.arenas.values().map(|arena| arena.handles.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Markers with their indices, in index order.
    pub fn markers(&self) -> impl Iterator<Item = (usize, &Marker)> {
        self.handles(EntityKind::Marker)
            .filter_map(|h| match h.entity() {
                Entity::Marker(marker) => Some((h.index(), marker)),
                _ => None,
            })
    }

    /// The current routing request, if any.
    pub fn directions(&self) -> Option<&DirectionsRequest> {
        self.handles(EntityKind::Directions)
            .find_map(|h| match h.entity() {
                Entity::Directions(request) => Some(request),
                _ => None,
            })
    }

    /// Look up a map style by name or script identifier.
    pub fn map_style(&self, name: &str) -> Option<&MapStyle> {
        let var_name = normalize_variable(name);
        self.handles(EntityKind::MapStyle)
            .find_map(|h| match h.entity() {
                Entity::MapStyle(style) if style.var_name == var_name => Some(style),
                _ => None,
            })
    }

    /// Dynamic registrations skipped under the permissive policy.
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    /// Definitions dropped because a later one replaced them.
    pub fn replaced(&self) -> &[Replaced] {
        &self.replaced
    }

    /// Icon, shape and group data extracted from the current marker set.
    ///
    /// Extraction reruns only when the marker set's content hash changed.
    pub fn marker_data(&mut self) -> Result<&MarkerData> {
        let markers: Vec<(usize, &Marker)> = self
            .arenas
            .get(&EntityKind::Marker)
            .into_iter()
            .flat_map(|arena| arena.handles.values())
            .filter_map(|h| match h.entity() {
                Entity::Marker(marker) => Some((h.index(), marker)),
                _ => None,
            })
            .collect();
        self.marker_cache.get(&markers)
    }

    /// Number of full extraction passes run so far.
    pub fn extraction_passes(&self) -> usize {
        self.marker_cache.passes()
    }

    /// The global script variable of a registered entity.
    pub fn js_var(&self, reference: EntityRef) -> Result<String> {
        let handle = self.get(reference).ok_or_else(|| MapError::Render {
            message: format!("{} is not registered in map '{}'", reference, self.map_id()),
            help: Some("register the object in this scene before referencing it".to_string()),
        })?;

        let id = self.map_id();
        if let Some(collection) = reference.kind.collection() {
            return Ok(format!("{}.{}[{}]", id, collection, reference.index));
        }
        match handle.entity() {
            Entity::MarkerGroup(group) => {
                Ok(format!("{}.marker_groups[\"{}\"]", id, group.var_name))
            }
            Entity::Directions(_) => Ok(format!("{}.directions.renderer", id)),
            _ => Err(MapError::render(format!(
                "a {} has no script variable",
                reference.kind
            ))),
        }
    }
}

fn describe(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a list",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinate, MarkerIcon, TravelMode};

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn test_register_assigns_indices_per_kind() {
        let mut scene = Scene::default();
        let m0 = scene.register(Marker::new(coord(1.0, 1.0)));
        let s0 = scene.register(Shape::circle(coord(1.0, 1.0), 5.0));
        let m1 = scene.register(Marker::new(coord(2.0, 2.0)));

        assert_eq!(m0.index(), 0);
        assert_eq!(s0.index(), 0);
        assert_eq!(m1.index(), 1);
        assert_eq!(m1.owner(), scene.id());
    }

    #[test]
    fn test_register_handle_is_idempotent() {
        let mut scene = Scene::default();
        let first = scene.register(Marker::new(coord(1.0, 1.0)));
        let again = scene.register(first.clone());

        assert_eq!(first, again);
        assert_eq!(scene.count(EntityKind::Marker), 1);

        let next = scene.register(Marker::new(coord(2.0, 2.0)));
        assert_eq!(next.index(), 1);
    }

    #[test]
    fn test_register_foreign_handle_unwraps() {
        let mut a = Scene::default();
        let mut b = Scene::default();
        b.register(Marker::new(coord(0.0, 0.0)));

        let handle = a.register(Marker::new(coord(1.0, 1.0)));
        let moved = b.register(handle.clone());

        assert_eq!(moved.owner(), b.id());
        assert_eq!(moved.index(), 1);
        assert_eq!(moved.entity(), handle.entity());
    }

    #[test]
    fn test_replaced_directions_do_not_reuse_indices() {
        let mut scene = Scene::default();
        let first = scene.register(DirectionsRequest::new(
            coord(0.0, 0.0),
            coord(1.0, 1.0),
            TravelMode::Driving,
        ));
        let second = scene.register(DirectionsRequest::new(
            coord(2.0, 2.0),
            coord(3.0, 3.0),
            TravelMode::Walking,
        ));

        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(scene.count(EntityKind::Directions), 1);
        assert!(!scene.contains(first.reference()));
        assert_eq!(scene.directions().unwrap().travel_mode, TravelMode::Walking);
    }

    #[test]
    fn test_map_style_redefinition_wins() {
        let mut scene = Scene::default();
        scene.register(MapStyle::new("Night", serde_json::json!([{"a": 1}])));
        scene.register(MapStyle::new("Night", serde_json::json!([{"a": 2}])));

        assert_eq!(scene.count(EntityKind::MapStyle), 1);
        assert_eq!(
            scene.map_style("Night").unwrap().style,
            serde_json::json!([{"a": 2}])
        );
        assert_eq!(
            scene.replaced(),
            &[Replaced {
                kind: EntityKind::MapStyle,
                previous: 0,
                index: 1,
                name: Some("Night".to_string()),
            }]
        );
    }

    #[test]
    fn test_default_icon_applied_at_registration() {
        let settings = MapSettings {
            default_icon: Some(MarkerIcon::new("pin.png", 20, 32)),
            ..Default::default()
        };
        let mut scene = Scene::new(settings);
        let plain = scene.register(Marker::new(coord(1.0, 1.0)));
        let custom = scene.register(
            Marker::new(coord(1.0, 1.0)).with_icon(MarkerIcon::new("star.png", 16, 16)),
        );

        let icon_url = |h: &Handle| match h.entity() {
            Entity::Marker(m) => m.icon.as_ref().map(|i| i.url.clone()),
            _ => None,
        };
        assert_eq!(icon_url(&plain).as_deref(), Some("pin.png"));
        assert_eq!(icon_url(&custom).as_deref(), Some("star.png"));
    }

    #[test]
    fn test_register_raw_permissive_skips() {
        let mut scene = Scene::default();
        let value: serde_yaml::Value = serde_yaml::from_str("just a string").unwrap();
        let result = scene
            .register_raw(&value, RegistrationPolicy::Permissive, |_| {
                unreachable!("non-mappings are never decoded")
            })
            .unwrap();

        assert!(result.is_none());
        assert_eq!(scene.skipped().len(), 1);
        assert_eq!(scene.skipped()[0].code, "mapscript::malformed");
    }

    #[test]
    fn test_register_raw_strict_fails() {
        let mut scene = Scene::default();
        let value: serde_yaml::Value = serde_yaml::from_str("type: teapot").unwrap();
        let result = scene.register_raw(&value, RegistrationPolicy::Strict, |_| {
            Err(MapError::UnsupportedEntity {
                kind: "teapot".to_string(),
                help: None,
            })
        });

        assert!(matches!(result, Err(MapError::UnsupportedEntity { .. })));
        assert!(scene.skipped().is_empty());
    }

    #[test]
    fn test_register_raw_propagates_other_errors() {
        let mut scene = Scene::default();
        let value: serde_yaml::Value = serde_yaml::from_str("type: marker").unwrap();
        let result = scene.register_raw(&value, RegistrationPolicy::Permissive, |_| {
            Err(MapError::Resolution {
                address: "Atlantis".to_string(),
                reason: "not found".to_string(),
            })
        });
        assert!(matches!(result, Err(MapError::Resolution { .. })));
    }

    #[test]
    fn test_js_var() {
        let mut scene = Scene::new(MapSettings {
            id: "my-map".to_string(),
            ..Default::default()
        });
        let marker = scene.register(Marker::new(coord(1.0, 1.0)));
        let group = scene.register(MarkerGroup::new("Coffee Shops"));

        assert_eq!(scene.map_id(), "mymap");
        assert_eq!(scene.js_var(marker.reference()).unwrap(), "mymap.markers[0]");
        assert_eq!(
            scene.js_var(group.reference()).unwrap(),
            "mymap.marker_groups[\"CoffeeShops\"]"
        );

        let other = Scene::default();
        assert!(other.js_var(marker.reference()).is_err());
    }
}
