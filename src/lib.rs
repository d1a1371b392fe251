//! mapscript - Map scene to browser script generator
//!
//! A library for turning declarative map scenes (markers, overlays, layers,
//! directions, styles and event wiring) into a self-contained script that
//! builds the map in the browser.

pub mod cli;
pub mod discovery;
pub mod emit;
pub mod error;
pub mod extract;
pub mod geocode;
pub mod options;
pub mod output;
pub mod page;
pub mod parser;
pub mod registry;
pub mod types;
pub mod validation;

pub use discovery::{discover, discover_paths, DiscoveryResult, LoadOptions, LoadedScene, Manifest, ScanResult};
pub use emit::{emit, EmitOptions, Script};
pub use error::{MapError, Result};
pub use extract::{MarkerData, MarkerRefs};
pub use geocode::{Geocoder, NoGeocoder, PlaceTable};
pub use parser::{build_scene, parse_scene};
pub use registry::{EntityKind, EntityRef, Handle, RegistrationPolicy, Scene, SceneId};
pub use types::{
    Bind, Circle, Coordinate, CustomControl, DirectionsRequest, Entity, EventListener, Layer,
    Location, MapSettings, MapStyle, Marker, MarkerGroup, MarkerIcon, Poly, Polygon, Polyline,
    Rectangle, Shape,
};
pub use validation::{validate_scene, Diagnostic, Severity, ValidationResult};
