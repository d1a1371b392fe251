//! Init command implementation.
//!
//! Generates a `mapscript.yaml` manifest from discovered scene files.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::discovery::{discover, DiscoveryResult, MANIFEST_FILENAME};
use crate::error::{MapError, Result};
use crate::output::{display_path, plural, Printer};

/// Initialize a mapscript project by generating a mapscript.yaml manifest
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Directory to scan (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing mapscript.yaml
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, printer: &Printer) -> Result<()> {
    let manifest_path = args.path.join(MANIFEST_FILENAME);

    if manifest_path.exists() && !args.force {
        return Err(MapError::Build {
            message: format!("{} already exists", MANIFEST_FILENAME),
            help: Some("Use --force to overwrite".to_string()),
        });
    }

    printer.status("Scanning", &display_path(&args.path));
    let discovery = discover(&args.path)?;
    let sources = source_dirs(&discovery);

    fs::write(&manifest_path, manifest_text(&sources)).map_err(|e| MapError::Io {
        path: manifest_path.clone(),
        message: format!("Failed to write manifest: {}", e),
    })?;

    if !sources.is_empty() {
        let dirs: Vec<&str> = sources.iter().map(String::as_str).collect();
        printer.info("Discovered", &dirs.join(", "));
    }
    printer.success(
        "Created",
        &format!(
            "{} ({} found)",
            MANIFEST_FILENAME,
            plural(discovery.scan.total(), "scene", "scenes")
        ),
    );

    Ok(())
}

/// Directories holding scene files, relative to the project root.
fn source_dirs(discovery: &DiscoveryResult) -> BTreeSet<String> {
    discovery
        .scan
        .scenes
        .iter()
        .filter_map(|file| file.parent())
        .map(|parent| {
            let relative = parent.strip_prefix(&discovery.root).unwrap_or(parent);
            if relative.as_os_str().is_empty() {
                ".".to_string()
            } else {
                format!("{}/", relative.display())
            }
        })
        .collect()
}

/// Starter manifest. `sources` is left out when everything sits at the root.
fn manifest_text(sources: &BTreeSet<String>) -> String {
    let mut yaml = String::new();
    if sources.iter().any(|dir| dir != ".") {
        yaml.push_str("sources:\n");
        for dir in sources {
            yaml.push_str(&format!("  - \"{}\"\n", dir));
        }
    }
    yaml.push_str("output: dist\n");
    yaml.push_str("# compress: true\n");
    yaml.push_str("# policy: strict\n");
    yaml.push_str("# places:\n#   Harbor: [32.71, -117.17]\n");
    yaml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::Manifest;
    use tempfile::tempdir;

    const SCENE: &str = "map:\n  center: [0, 0]\n";

    #[test]
    fn test_init_creates_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("harbor.map.yaml"), SCENE).unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };
        run(args, &Printer::new()).unwrap();

        let content = fs::read_to_string(dir.path().join("mapscript.yaml")).unwrap();
        assert!(content.contains("output: dist"));
        assert!(!content.contains("sources:"));
    }

    #[test]
    fn test_init_errors_if_manifest_exists() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mapscript.yaml"), "output: build").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };
        assert!(run(args, &Printer::new()).is_err());
    }

    #[test]
    fn test_init_force_overwrites() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mapscript.yaml"), "output: build").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: true,
        };
        run(args, &Printer::new()).unwrap();

        let content = fs::read_to_string(dir.path().join("mapscript.yaml")).unwrap();
        assert!(content.contains("output: dist"));
    }

    #[test]
    fn test_init_discovers_source_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("maps")).unwrap();
        fs::create_dir_all(dir.path().join("tours/old")).unwrap();
        fs::write(dir.path().join("maps/harbor.map.yaml"), SCENE).unwrap();
        fs::write(dir.path().join("tours/old/walk.map.yml"), SCENE).unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            force: false,
        };
        run(args, &Printer::new()).unwrap();

        let content = fs::read_to_string(dir.path().join("mapscript.yaml")).unwrap();
        let manifest = Manifest::parse(&content).unwrap();
        assert_eq!(manifest.sources, vec!["maps/", "tours/old/"]);
        assert_eq!(manifest.output, PathBuf::from("dist"));
    }

    #[test]
    fn test_manifest_text_without_sources() {
        let text = manifest_text(&BTreeSet::new());
        assert!(!text.contains("sources:"));
        assert_eq!(Manifest::parse(&text).unwrap().output, PathBuf::from("dist"));

        let root_only: BTreeSet<String> = [".".to_string()].into_iter().collect();
        assert!(!manifest_text(&root_only).contains("sources:"));
    }

    #[test]
    fn test_manifest_text_keeps_root_with_subdirs() {
        let dirs: BTreeSet<String> = [".".to_string(), "maps/".to_string()].into_iter().collect();
        let manifest = Manifest::parse(&manifest_text(&dirs)).unwrap();
        assert_eq!(manifest.sources, vec![".", "maps/"]);
    }
}
