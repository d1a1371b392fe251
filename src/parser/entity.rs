//! Entity decoding.
//!
//! Each item of a scene's `entities:` list is a mapping with a `type:` tag
//! and an optional `id:` that later entities use to refer to it:
//!
//! ```yaml
//! - type: marker
//!   id: office
//!   position: [32.7, -117.1]
//! - type: event_listener
//!   object: office
//!   event: click
//!   function: "function() { alert('hi'); }"
//! ```
//!
//! Names must be declared before they are referenced.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::{MapError, Result};
use crate::geocode::Geocoder;
use crate::registry::EntityRef;
use crate::types::{
    Bind, Coordinate, CustomControl, DirectionsRequest, Entity, EventListener, Layer,
    ListenerTarget, Location, MapStyle, Marker, MarkerGroup, MarkerIcon, MarkerShape, Options,
    Poly, Polygon, Polyline, Shape, TravelMode, Units,
};

use super::location::is_live_location;

/// Every recognized `type:` tag.
pub const ENTITY_TAGS: &[&str] = &[
    "marker",
    "marker_group",
    "circle",
    "rectangle",
    "polygon",
    "polyline",
    "kml_layer",
    "fusion_table",
    "ground_overlay",
    "event_listener",
    "directions",
    "map_style",
    "bind",
    "control",
];

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct MarkerDef {
    position: Location,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    icon: Option<MarkerIcon>,
    #[serde(default)]
    shadow: Option<MarkerIcon>,
    #[serde(default)]
    shape: Option<MarkerShape>,
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GroupDef {
    name: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CircleDef {
    center: Location,
    radius: f64,
    #[serde(default)]
    options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BoundsDef {
    southwest: Location,
    northeast: Location,
    #[serde(default)]
    options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PolygonDef {
    paths: Vec<Location>,
    #[serde(default)]
    options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PolylineDef {
    path: Vec<Location>,
    #[serde(default)]
    options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KmlDef {
    url: String,
    #[serde(default)]
    options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FusionTableDef {
    table_id: serde_json::Value,
    #[serde(default)]
    options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct GroundOverlayDef {
    url: String,
    southwest: Location,
    northeast: Location,
    #[serde(default)]
    options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListenerDef {
    event: String,
    function: String,
    /// DOM element id.
    #[serde(default)]
    element: Option<String>,
    /// Name of a previously declared entity.
    #[serde(default)]
    object: Option<String>,
    #[serde(default)]
    once: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WaypointDef {
    Stop {
        location: Location,
        #[serde(default = "default_stopover")]
        stopover: bool,
    },
    At(Location),
}

fn default_stopover() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectionsDef {
    origin: Location,
    destination: Location,
    #[serde(default)]
    waypoints: Vec<WaypointDef>,
    #[serde(default)]
    travel_mode: TravelMode,
    #[serde(default)]
    units: Option<Units>,
    #[serde(default)]
    request_options: Options,
    #[serde(default)]
    renderer_options: Options,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StyleDef {
    name: String,
    style: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BindDef {
    binder: String,
    binder_property: String,
    bindee: String,
    bindee_property: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ControlListenerDef {
    event: String,
    function: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ControlDef {
    #[serde(default)]
    outer: Options,
    #[serde(default)]
    inner: Options,
    position: String,
    #[serde(default)]
    listeners: Vec<ControlListenerDef>,
}

/// Turns raw entity mappings into typed entities.
///
/// Keeps the `id:` names seen so far so binds and listeners can refer to
/// earlier entities.
pub struct EntityDecoder<'a> {
    geocoder: &'a dyn Geocoder,
    names: HashMap<String, EntityRef>,
}

impl<'a> EntityDecoder<'a> {
    pub fn new(geocoder: &'a dyn Geocoder) -> Self {
        Self {
            geocoder,
            names: HashMap::new(),
        }
    }

    /// Decode one mapping into an entity and its optional `id:` name.
    ///
    /// A missing or non-string `type` is malformed input and an unknown tag
    /// is an unsupported entity; both are subject to the registration
    /// policy. Bad fields and unresolvable addresses are hard errors.
    pub fn decode(&self, mapping: &Mapping) -> Result<(Entity, Option<String>)> {
        let tag = match mapping.get("type") {
            Some(Value::String(tag)) => tag.as_str(),
            Some(_) => {
                return Err(MapError::MalformedInput {
                    message: "entity `type` must be a string".to_string(),
                    help: Some(format!("expected one of: {}", ENTITY_TAGS.join(", "))),
                })
            }
            None => {
                return Err(MapError::MalformedInput {
                    message: "entity has no `type`".to_string(),
                    help: Some(format!("expected one of: {}", ENTITY_TAGS.join(", "))),
                })
            }
        };

        let mut fields = mapping.clone();
        fields.remove("type");
        let name = match fields.remove("id") {
            None => None,
            Some(Value::String(name)) => Some(name),
            Some(_) => {
                return Err(MapError::Parse {
                    message: format!("{} `id` must be a string", tag),
                    help: None,
                })
            }
        };
        let body = Value::Mapping(fields);

        let entity = match tag {
            "marker" => self.marker(body)?,
            "marker_group" => {
                let def: GroupDef = fields_of(tag, body)?;
                Entity::MarkerGroup(MarkerGroup::new(def.name))
            }
            "circle" => {
                let def: CircleDef = fields_of(tag, body)?;
                let mut shape = Shape::circle(self.resolve(&def.center)?, def.radius);
                shape.options_mut().extend(def.options);
                Entity::Shape(shape)
            }
            "rectangle" => {
                let def: BoundsDef = fields_of(tag, body)?;
                let mut shape =
                    Shape::rectangle(self.resolve(&def.southwest)?, self.resolve(&def.northeast)?);
                shape.options_mut().extend(def.options);
                Entity::Shape(shape)
            }
            "polygon" => {
                let def: PolygonDef = fields_of(tag, body)?;
                let mut polygon = Polygon::new(self.resolve_all(&def.paths)?);
                polygon.options = def.options;
                Entity::Poly(Poly::Polygon(polygon))
            }
            "polyline" => {
                let def: PolylineDef = fields_of(tag, body)?;
                let mut polyline = Polyline::new(self.resolve_all(&def.path)?);
                polyline.options = def.options;
                Entity::Poly(Poly::Polyline(polyline))
            }
            "kml_layer" => {
                let def: KmlDef = fields_of(tag, body)?;
                let mut layer = Layer::kml(def.url);
                layer.options_mut().extend(def.options);
                Entity::Layer(layer)
            }
            "fusion_table" => {
                let def: FusionTableDef = fields_of(tag, body)?;
                let mut layer = Layer::fusion_table(def.table_id);
                layer.options_mut().extend(def.options);
                Entity::Layer(layer)
            }
            "ground_overlay" => {
                let def: GroundOverlayDef = fields_of(tag, body)?;
                let mut layer = Layer::ground_overlay(
                    def.url,
                    self.resolve(&def.southwest)?,
                    self.resolve(&def.northeast)?,
                );
                layer.options_mut().extend(def.options);
                Entity::Layer(layer)
            }
            "event_listener" => self.listener(body)?,
            "directions" => self.directions(body)?,
            "map_style" => {
                let def: StyleDef = fields_of(tag, body)?;
                Entity::MapStyle(MapStyle::new(def.name, def.style))
            }
            "bind" => {
                let def: BindDef = fields_of(tag, body)?;
                Entity::Bind(Bind::new(
                    self.lookup(&def.binder)?,
                    def.binder_property,
                    self.lookup(&def.bindee)?,
                    def.bindee_property,
                ))
            }
            "control" => {
                let def: ControlDef = fields_of(tag, body)?;
                let mut control = CustomControl::new(def.outer, def.inner, def.position);
                for listener in def.listeners {
                    control.add_listener(listener.event, listener.function);
                }
                Entity::Control(control)
            }
            other => {
                return Err(MapError::UnsupportedEntity {
                    kind: other.to_string(),
                    help: Some(format!("expected one of: {}", ENTITY_TAGS.join(", "))),
                })
            }
        };

        Ok((entity, name))
    }

    /// Record the name of a registered entity.
    pub fn name(&mut self, name: String, reference: EntityRef) -> Result<()> {
        if self.names.contains_key(&name) {
            return Err(MapError::Parse {
                message: format!("Duplicate entity id '{}'", name),
                help: Some("Entity ids must be unique within a scene".to_string()),
            });
        }
        self.names.insert(name, reference);
        Ok(())
    }

    /// Look up a previously named entity.
    pub fn lookup(&self, name: &str) -> Result<EntityRef> {
        self.names.get(name).copied().ok_or_else(|| MapError::Parse {
            message: format!("Unknown entity id '{}'", name),
            help: Some("Declare the entity with `id:` before referring to it".to_string()),
        })
    }

    fn resolve(&self, location: &Location) -> Result<Coordinate> {
        location.resolve(self.geocoder)
    }

    fn resolve_all(&self, locations: &[Location]) -> Result<Vec<Coordinate>> {
        locations.iter().map(|l| self.resolve(l)).collect()
    }

    fn marker(&self, body: Value) -> Result<Entity> {
        let def: MarkerDef = fields_of("marker", body)?;
        let mut marker = if is_live_location(&def.position) {
            Marker::geolocated()
        } else {
            Marker::new(self.resolve(&def.position)?)
        };
        marker.title = def.title;
        marker.content = def.content;
        marker.icon = def.icon;
        marker.shadow = def.shadow;
        marker.shape = def.shape;
        marker.options = def.options;
        for group in def.groups {
            marker.add_to_group(&MarkerGroup::new(group));
        }
        Ok(Entity::Marker(marker))
    }

    fn listener(&self, body: Value) -> Result<Entity> {
        let def: ListenerDef = fields_of("event_listener", body)?;
        let target = match (def.element, def.object) {
            (None, None) => ListenerTarget::Map,
            (Some(element), None) => ListenerTarget::Element(element),
            (None, Some(object)) => ListenerTarget::Object(self.lookup(&object)?),
            (Some(_), Some(_)) => {
                return Err(MapError::Parse {
                    message: "listener sets both `element` and `object`".to_string(),
                    help: Some("A listener has a single target; omit both to listen on the map".to_string()),
                })
            }
        };
        Ok(Entity::EventListener(EventListener {
            target,
            event: def.event,
            function: def.function,
            once: def.once,
        }))
    }

    fn directions(&self, body: Value) -> Result<Entity> {
        let def: DirectionsDef = fields_of("directions", body)?;
        let mut request = DirectionsRequest::new(
            self.resolve(&def.origin)?,
            self.resolve(&def.destination)?,
            def.travel_mode,
        );
        for waypoint in &def.waypoints {
            match waypoint {
                WaypointDef::Stop { location, stopover } => {
                    request.add_waypoint(self.resolve(location)?, *stopover)
                }
                WaypointDef::At(location) => request.add_waypoint(self.resolve(location)?, true),
            }
        }
        request.units = def.units;
        request.request_options = def.request_options;
        request.renderer_options = def.renderer_options;
        Ok(Entity::Directions(request))
    }
}

fn fields_of<T: DeserializeOwned>(tag: &str, body: Value) -> Result<T> {
    serde_yaml::from_value(body).map_err(|e| MapError::Parse {
        message: format!("Invalid {}: {}", tag, e),
        help: None,
    })
}
