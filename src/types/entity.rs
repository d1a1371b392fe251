//! The entity sum type accepted by the scene registry.

use serde::Serialize;

use crate::registry::EntityKind;

use super::{
    Bind, CustomControl, DirectionsRequest, EventListener, Layer, MapStyle, Marker, MarkerGroup,
    Poly, Shape,
};

/// One configured map feature prior to registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entity {
    Marker(Marker),
    MarkerGroup(MarkerGroup),
    Shape(Shape),
    Poly(Poly),
    Layer(Layer),
    EventListener(EventListener),
    Directions(DirectionsRequest),
    MapStyle(MapStyle),
    Bind(Bind),
    Control(CustomControl),
}

impl Entity {
    /// The arena this entity is indexed in.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Marker(_) => EntityKind::Marker,
            Entity::MarkerGroup(_) => EntityKind::MarkerGroup,
            Entity::Shape(_) => EntityKind::Shape,
            Entity::Poly(_) => EntityKind::Poly,
            Entity::Layer(Layer::Kml(_)) => EntityKind::KmlLayer,
            Entity::Layer(Layer::FusionTable(_)) => EntityKind::FusionTable,
            Entity::Layer(Layer::GroundOverlay(_)) => EntityKind::GroundOverlay,
            Entity::EventListener(_) => EntityKind::EventListener,
            Entity::Directions(_) => EntityKind::Directions,
            Entity::MapStyle(_) => EntityKind::MapStyle,
            Entity::Bind(_) => EntityKind::Bind,
            Entity::Control(_) => EntityKind::Control,
        }
    }
}

macro_rules! impl_from_entity {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Entity {
                fn from(value: $ty) -> Self {
                    Entity::$variant(value)
                }
            }
        )*
    };
}

impl_from_entity! {
    Marker => Marker,
    MarkerGroup => MarkerGroup,
    Shape => Shape,
    Poly => Poly,
    Layer => Layer,
    EventListener => EventListener,
    DirectionsRequest => Directions,
    MapStyle => MapStyle,
    Bind => Bind,
    CustomControl => Control,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;

    #[test]
    fn test_entity_kind_dispatch() {
        let origin = Coordinate::new(0.0, 0.0).unwrap();
        assert_eq!(Entity::from(Marker::new(origin)).kind(), EntityKind::Marker);
        assert_eq!(Entity::from(Layer::kml("a.kml")).kind(), EntityKind::KmlLayer);
        assert_eq!(Entity::from(Layer::fusion_table(123)).kind(), EntityKind::FusionTable);
        assert_eq!(
            Entity::from(Layer::ground_overlay("a.png", origin, origin)).kind(),
            EntityKind::GroundOverlay
        );
        assert_eq!(Entity::from(Shape::circle(origin, 10.0)).kind(), EntityKind::Shape);
    }
}
