//! Validation system for scenes.
//!
//! Runs a suite of checks against a loaded scene and reports errors and
//! warnings. Used by both `mapscript validate` and `mapscript build`.

mod checks;
mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use crate::output::{plural, Printer};
use crate::registry::Scene;

/// Run all validation checks against a scene.
///
/// Diagnostics are tagged with the scene's map id.
pub fn validate_scene(scene: &Scene) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.merge(checks::check_skipped(scene));
    result.merge(checks::check_poly_points(scene));
    result.merge(checks::check_references(scene));
    result.merge(checks::check_layer_urls(scene));
    result.merge(checks::check_viewport(scene));
    result.merge(checks::check_empty_groups(scene));
    result.merge(checks::check_replaced(scene));
    result.merge(checks::check_map_types(scene));
    result.merge(checks::check_stagger_refs(scene));

    result.for_map(scene.map_id())
}

/// Print diagnostics to stderr, followed by a summary line.
pub fn print_diagnostics(result: &ValidationResult, printer: &Printer) {
    for d in result.iter() {
        printer.diagnostic(d);
    }

    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        printer.error(
            "Failed",
            &format!(
                "{}, {}",
                plural(errors, "error", "errors"),
                plural(warnings, "warning", "warnings")
            ),
        );
    } else if warnings > 0 {
        printer.warning("Passed", &plural(warnings, "warning", "warnings"));
    } else {
        printer.success("Passed", "no problems found");
    }
}
