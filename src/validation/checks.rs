//! Validation checks for a scene.
//!
//! Each check takes a `&Scene` and returns a `ValidationResult`.

use std::collections::HashSet;

use crate::emit::has_viewport;
use crate::registry::{EntityKind, EntityRef, Scene};
use crate::types::{Entity, Layer, ListenerTarget};

use super::warning::{Diagnostic, ValidationResult};

/// Map types every map offers without a registered style.
const BUILTIN_MAP_TYPES: &[&str] = &["roadmap", "satellite", "hybrid", "terrain"];

/// Check that polygons and polylines have enough points to draw.
pub fn check_poly_points(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    for handle in scene.handles(EntityKind::Poly) {
        if let Entity::Poly(poly) = handle.entity() {
            let points = poly.points().len();
            if points < poly.min_points() {
                result.push(
                    Diagnostic::error(
                        "mapscript::validate::poly-points",
                        format!(
                            "{} #{} has {} point(s), needs at least {}",
                            poly.kind_name(),
                            handle.index(),
                            points,
                            poly.min_points()
                        ),
                    )
                    .with_help("Add points to the path or remove the entity"),
                );
            }
        }
    }

    result
}

/// Check that binds and object listeners point at live entities of this scene.
pub fn check_references(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    for handle in scene.handles(EntityKind::Bind) {
        if let Entity::Bind(bind) = handle.entity() {
            let what = format!("bind #{}", handle.index());
            check_reference(scene, &what, bind.binder, &mut result);
            check_reference(scene, &what, bind.bindee, &mut result);
        }
    }

    for handle in scene.handles(EntityKind::EventListener) {
        if let Entity::EventListener(listener) = handle.entity() {
            if let ListenerTarget::Object(target) = &listener.target {
                let what = format!("event listener #{}", handle.index());
                check_reference(scene, &what, *target, &mut result);
            }
        }
    }

    result
}

fn check_reference(scene: &Scene, what: &str, target: EntityRef, result: &mut ValidationResult) {
    if target.owner != scene.id() {
        result.push(
            Diagnostic::error(
                "mapscript::validate::foreign-ref",
                format!("{} refers to {}, which belongs to another map", what, target),
            )
            .with_help("Register the object in this map first and refer to the new handle"),
        );
    } else if !scene.contains(target) {
        result.push(
            Diagnostic::error(
                "mapscript::validate::missing-ref",
                format!("{} refers to {}, which is no longer registered", what, target),
            )
            .with_help("A later definition may have replaced it"),
        );
    } else if scene.js_var(target).is_err() {
        result.push(Diagnostic::error(
            "mapscript::validate::no-variable",
            format!("{} refers to a {}, which has no script object", what, target.kind),
        ));
    }
}

/// Warn about declared marker groups that no marker joins.
pub fn check_empty_groups(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    let joined: HashSet<&str> = scene
        .markers()
        .flat_map(|(_, marker)| marker.groups.iter().map(|g| g.var_name.as_str()))
        .collect();

    for handle in scene.handles(EntityKind::MarkerGroup) {
        if let Entity::MarkerGroup(group) = handle.entity() {
            if !joined.contains(group.var_name.as_str()) {
                result.push(
                    Diagnostic::warning(
                        "mapscript::validate::empty-group",
                        format!("Marker group '{}' has no markers", group.name),
                    )
                    .with_help("List the group under a marker's `groups`"),
                );
            }
        }
    }

    result
}

/// Warn about definitions that replaced earlier ones.
pub fn check_replaced(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    for replaced in scene.replaced() {
        let message = match (&replaced.kind, &replaced.name) {
            (EntityKind::MapStyle, Some(name)) => {
                format!("Map style '{}' is defined more than once; the last one wins", name)
            }
            _ => format!(
                "{} #{} replaces #{}; only one is allowed",
                replaced.kind, replaced.index, replaced.previous
            ),
        };
        result.warning("mapscript::validate::duplicate", message);
    }

    result
}

/// Report entities skipped under the permissive policy.
pub fn check_skipped(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    for skipped in scene.skipped() {
        result.push(
            Diagnostic::warning(
                skipped.code.clone(),
                format!("entity #{} skipped: {}", skipped.position + 1, skipped.reason),
            )
            .with_help("Use `policy: strict` to make this an error"),
        );
    }

    result
}

/// Check that something positions the viewport.
pub fn check_viewport(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    if !has_viewport(scene) {
        result.push(
            Diagnostic::error(
                "mapscript::validate::no-center",
                format!("Map '{}' has nothing to center on", scene.map_id()),
            )
            .with_help("Set `center`, enable `center_on_user`, or add markers with `auto_encompass`"),
        );
    }

    result
}

/// Warn when staggered markers are referenced before they exist.
///
/// Staggered markers are plain option objects until their timeout fires, so
/// binds and listeners attached to them at initialization see no marker.
pub fn check_stagger_refs(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    if scene.settings().stagger_interval().is_none() {
        return result;
    }

    let bound = scene.handles(EntityKind::Bind).any(|h| match h.entity() {
        Entity::Bind(bind) => {
            bind.binder.kind == EntityKind::Marker || bind.bindee.kind == EntityKind::Marker
        }
        _ => false,
    });
    let listened = scene.handles(EntityKind::EventListener).any(|h| {
        matches!(
            h.entity(),
            Entity::EventListener(l) if matches!(l.target, ListenerTarget::Object(r) if r.kind == EntityKind::Marker)
        )
    });

    if bound || listened {
        result.push(
            Diagnostic::warning(
                "mapscript::validate::stagger-refs",
                "Markers are staggered but binds or listeners refer to them",
            )
            .with_help("Disable `stagger_markers` or attach behaviour after the markers appear"),
        );
    }

    result
}

/// Warn about selectable map types that are neither built in nor styled.
pub fn check_map_types(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    for name in &scene.settings().map_types {
        let builtin = BUILTIN_MAP_TYPES.contains(&name.to_lowercase().as_str());
        if !builtin && scene.map_style(name).is_none() {
            result.push(
                Diagnostic::warning(
                    "mapscript::validate::unknown-map-type",
                    format!("Map type '{}' is not built in and no map style has that name", name),
                )
                .with_help("Define a `map_style` entity with this name"),
            );
        }
    }

    result
}

/// Check that layers loaded from a URL have one.
pub fn check_layer_urls(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    for kind in [EntityKind::KmlLayer, EntityKind::GroundOverlay] {
        for handle in scene.handles(kind) {
            let url = match handle.entity() {
                Entity::Layer(Layer::Kml(layer)) => &layer.url,
                Entity::Layer(Layer::GroundOverlay(overlay)) => &overlay.url,
                _ => continue,
            };
            if url.trim().is_empty() {
                result.error(
                    "mapscript::validate::empty-url",
                    format!("{} #{} has an empty url", kind, handle.index()),
                );
            }
        }
    }

    result
}
