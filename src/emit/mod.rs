//! Script emission.
//!
//! Emission runs in two phases: `build` turns a scene into a structured
//! [`Script`] (ordered sections of statement nodes), and `serialize` writes
//! that out as text, optionally compressed, with trailing commas cleaned up.
//!
//! Emission fails fast on scenes that would produce broken script: polys
//! with too few points, references to objects outside the scene, empty
//! layer URLs, or a map with nothing to center on.

mod bootstrap;
pub mod ir;
mod sections;
mod serialize;
mod text;

use crate::error::Result;
use crate::registry::{EntityKind, Scene};

pub use bootstrap::geolocation_required;
pub use ir::{Field, FieldValue, Node, Script, Section, SectionKind};
pub use serialize::{serialize, write_script};
pub use text::{compress, strip_trailing_commas};

use bootstrap::bootstrap_section;
use sections::SectionBuilder;

/// Emission settings that may override the scene's own.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitOptions {
    /// Compress whitespace; falls back to the map's `compress_output`.
    pub compress: Option<bool>,
}

impl EmitOptions {
    pub fn compressed() -> Self {
        Self {
            compress: Some(true),
        }
    }
}

/// Build the structured script for a scene.
///
/// Marker data is extracted (or taken from the cache) first; the scene is
/// otherwise left unchanged.
pub fn build(scene: &mut Scene) -> Result<Script> {
    let data = scene.marker_data()?.clone();
    let scene: &Scene = scene;

    let mut sections = SectionBuilder::new(scene, &data).build()?;
    sections.push(bootstrap_section(scene, geolocation_required(scene)));
    sections.retain(|section| !section.is_empty());

    Ok(Script {
        map_id: scene.map_id().to_string(),
        sections,
    })
}

/// Emit the complete script text for a scene.
pub fn emit(scene: &mut Scene, options: &EmitOptions) -> Result<String> {
    let compress_output = options
        .compress
        .unwrap_or(scene.settings().compress_output);
    let script = build(scene)?;
    Ok(serialize(&script, compress_output))
}

/// Whether something in the scene positions the viewport.
pub fn has_viewport(scene: &Scene) -> bool {
    let settings = scene.settings();
    settings.center.is_some()
        || settings.center_on_user
        || (settings.auto_encompass && scene.count(EntityKind::Marker) > 0)
        || scene.directions().is_some()
        || scene.count(EntityKind::KmlLayer) > 0
}
