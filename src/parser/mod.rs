//! Parser for `*.map.yaml` scene files.
//!
//! A scene file holds one map: its settings, a local table of place names
//! and an ordered list of entities.
//!
//! # Document Structure
//!
//! - `map:` map-level settings; `center`, `geolocation.backup` and
//!   `street_view.position` may be addresses
//! - `places:` optional name to `[lat, lng]` table
//! - `entities:` list of mappings tagged with `type:`
//!
//! # Usage
//!
//! ```ignore
//! use mapscript::parser::parse_scene;
//!
//! let source = std::fs::read_to_string("maps/harbor.map.yaml")?;
//! let scene = parse_scene(&source, &PlaceTable::new(), RegistrationPolicy::Permissive)?;
//! println!("{} markers", scene.count(EntityKind::Marker));
//! ```

mod document;
mod entity;
mod location;
mod scene;

pub use document::{parse_document, SceneDocument};
pub use entity::{EntityDecoder, ENTITY_TAGS};
pub use location::resolve_map_locations;
pub use scene::{build_scene, parse_scene};
