//! Validate command implementation.
//!
//! Loads scenes and runs the validation suite without writing scripts.

use std::path::PathBuf;

use clap::Args;

use crate::discovery::{discover, discover_paths};
use crate::error::{MapError, Result};
use crate::output::{display_path, plural, Printer};
use crate::validation::{print_diagnostics, validate_scene, ValidationResult};

use super::build::load;

/// Validate scene files without generating scripts
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Scene files or directories (default: current directory)
    pub files: Vec<PathBuf>,

    /// Fail on entities that cannot be decoded instead of skipping them
    #[arg(long)]
    pub strict: bool,

    /// Print diagnostics as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ValidateArgs, printer: &Printer) -> Result<()> {
    let discovery = if args.files.is_empty() {
        discover(".")?
    } else {
        discover_paths(&args.files)?
    };

    if discovery.scan.is_empty() {
        printer.warning("Warning", "no scene files found");
        return Ok(());
    }

    let scenes = load(&discovery, args.strict)?;

    let mut result = ValidationResult::new();
    for loaded in &scenes {
        printer.status(
            "Checking",
            &format!(
                "{} {}",
                loaded.scene.map_id(),
                printer.dim(&format!("({})", display_path(&loaded.path)))
            ),
        );
        result.merge(validate_scene(&loaded.scene));
    }

    if args.json {
        let json = serde_json::to_string_pretty(&result).map_err(|e| MapError::Validation {
            message: format!("Failed to serialize diagnostics: {}", e),
            help: None,
        })?;
        println!("{}", json);
    } else {
        print_diagnostics(&result, printer);
    }

    if result.has_errors() {
        return Err(MapError::Validation {
            message: format!(
                "{} in {}",
                plural(result.error_count(), "error", "errors"),
                plural(scenes.len(), "map", "maps")
            ),
            help: None,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn args(files: Vec<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            files,
            strict: false,
            json: false,
        }
    }

    #[test]
    fn test_validate_valid_scene() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("harbor.map.yaml");
        fs::write(
            &path,
            "map:\n  id: harbor\nentities:\n  - type: marker\n    position: [32.7, -117.1]\n",
        )
        .unwrap();

        run(args(vec![path]), &Printer::new()).unwrap();
    }

    #[test]
    fn test_validate_reports_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.map.yaml");
        fs::write(
            &path,
            "map:\n  center: [0, 0]\nentities:\n  - type: polygon\n    paths: [[0, 0], [1, 1]]\n",
        )
        .unwrap();

        let err = run(args(vec![path]), &Printer::new()).unwrap_err();
        assert!(matches!(err, MapError::Validation { .. }));
    }

    #[test]
    fn test_validate_warnings_pass() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("groups.map.yaml");
        fs::write(
            &path,
            "map:\n  center: [0, 0]\nentities:\n  - type: marker_group\n    name: Unused\n",
        )
        .unwrap();

        run(args(vec![path]), &Printer::new()).unwrap();
    }

    #[test]
    fn test_validate_strict_rejects_unknown_entities() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("odd.map.yaml");
        fs::write(&path, "map:\n  center: [0, 0]\nentities:\n  - type: heatmap\n").unwrap();

        run(args(vec![path.clone()]), &Printer::new()).unwrap();

        let mut strict = args(vec![path]);
        strict.strict = true;
        assert!(run(strict, &Printer::new()).is_err());
    }
}
