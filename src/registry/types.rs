//! Identifier and handle types for the scene registry.
//!
//! Every registered entity is addressed by its kind, its index within that
//! kind and the scene that owns it. Indices are assigned in insertion order
//! and never reused.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::types::Entity;

/// Identity of one scene, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SceneId(u64);

impl SceneId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        SceneId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

/// The kind of a registered entity. Each kind has its own index sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Marker,
    MarkerGroup,
    Shape,
    Poly,
    KmlLayer,
    FusionTable,
    GroundOverlay,
    EventListener,
    Directions,
    MapStyle,
    Bind,
    Control,
}

impl EntityKind {
    pub const ALL: [EntityKind; 12] = [
        EntityKind::Marker,
        EntityKind::MarkerGroup,
        EntityKind::Shape,
        EntityKind::Poly,
        EntityKind::KmlLayer,
        EntityKind::FusionTable,
        EntityKind::GroundOverlay,
        EntityKind::EventListener,
        EntityKind::Directions,
        EntityKind::MapStyle,
        EntityKind::Bind,
        EntityKind::Control,
    ];

    /// Get the short name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Marker => "marker",
            EntityKind::MarkerGroup => "marker_group",
            EntityKind::Shape => "shape",
            EntityKind::Poly => "poly",
            EntityKind::KmlLayer => "kml_layer",
            EntityKind::FusionTable => "fusion_table",
            EntityKind::GroundOverlay => "ground_overlay",
            EntityKind::EventListener => "event_listener",
            EntityKind::Directions => "directions",
            EntityKind::MapStyle => "map_style",
            EntityKind::Bind => "bind",
            EntityKind::Control => "control",
        }
    }

    /// The script array holding objects of this kind, if they are indexed.
    pub fn collection(&self) -> Option<&'static str> {
        match self {
            EntityKind::Marker => Some("markers"),
            EntityKind::Shape => Some("shapes"),
            EntityKind::Poly => Some("polys"),
            EntityKind::KmlLayer => Some("kml_layers"),
            EntityKind::FusionTable => Some("fusion_tables"),
            EntityKind::GroundOverlay => Some("ground_overlays"),
            EntityKind::EventListener => Some("event_listeners"),
            EntityKind::Control => Some("custom_controls"),
            EntityKind::MarkerGroup
            | EntityKind::Directions
            | EntityKind::MapStyle
            | EntityKind::Bind => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A lightweight reference to a registered entity.
///
/// Used wherever one entity points at another (binds, listeners).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntityRef {
    pub owner: SceneId,
    pub kind: EntityKind,
    pub index: usize,
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] of {}", self.kind, self.index, self.owner)
    }
}

/// A registered entity: the entity itself plus its index and owning scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handle {
    owner: SceneId,
    index: usize,
    entity: Entity,
}

impl Handle {
    pub(crate) fn new(owner: SceneId, index: usize, entity: Entity) -> Self {
        Self {
            owner,
            index,
            entity,
        }
    }

    pub fn owner(&self) -> SceneId {
        self.owner
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> EntityKind {
        self.entity.kind()
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub(crate) fn entity_mut(&mut self) -> &mut Entity {
        &mut self.entity
    }

    /// Release the wrapped entity, discarding index and owner.
    pub fn into_entity(self) -> Entity {
        self.entity
    }

    pub fn reference(&self) -> EntityRef {
        EntityRef {
            owner: self.owner,
            kind: self.kind(),
            index: self.index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_ids_are_unique() {
        let a = SceneId::next();
        let b = SceneId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_kind_collection() {
        assert_eq!(EntityKind::Marker.collection(), Some("markers"));
        assert_eq!(EntityKind::GroundOverlay.collection(), Some("ground_overlays"));
        assert_eq!(EntityKind::Bind.collection(), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EntityKind::KmlLayer.to_string(), "kml_layer");
    }
}
