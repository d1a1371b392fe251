//! File discovery and scene loading for mapscript projects.
//!
//! This module handles finding and loading all scene files from a project
//! directory, either using convention-based discovery or a `mapscript.yaml`
//! manifest.
//!
//! # Example
//!
//! ```ignore
//! use mapscript::discovery::discover;
//!
//! let result = discover("./my-site")?;
//! println!("Found {} scenes", result.scan.total());
//!
//! let scenes = result.load()?;
//! ```

mod loader;
mod manifest;
mod scanner;

use std::path::{Path, PathBuf};

use crate::error::Result;

pub use loader::{load_scene_file, load_scenes, LoadOptions, LoadedScene};
pub use manifest::Manifest;
pub use scanner::{is_scene_file, scan_directory, scan_sources, ScanResult, SCENE_SUFFIXES};

/// The name of the manifest file.
pub const MANIFEST_FILENAME: &str = "mapscript.yaml";

/// Result of discovering scenes in a project.
#[derive(Debug)]
pub struct DiscoveryResult {
    /// The project root directory.
    pub root: PathBuf,

    /// The loaded manifest (may be default if no mapscript.yaml found).
    pub manifest: Manifest,

    /// Whether a mapscript.yaml manifest was found.
    pub has_manifest: bool,

    /// Scan results with discovered files.
    pub scan: ScanResult,
}

impl DiscoveryResult {
    /// Load all discovered scenes with options from the manifest.
    pub fn load(&self) -> Result<Vec<LoadedScene>> {
        self.load_with_options(&LoadOptions::from_manifest(&self.manifest))
    }

    /// Load all discovered scenes with custom options.
    pub fn load_with_options(&self, options: &LoadOptions) -> Result<Vec<LoadedScene>> {
        load_scenes(&self.scan, options)
    }

    /// The output directory, relative to the project root.
    pub fn output_dir(&self) -> PathBuf {
        if self.manifest.output.is_absolute() {
            self.manifest.output.clone()
        } else {
            self.root.join(&self.manifest.output)
        }
    }
}

/// Discover scenes in a project directory.
///
/// Looks for a `mapscript.yaml` manifest in the root directory. If found,
/// uses the manifest's source paths. Otherwise, scans the entire directory
/// for scene files.
pub fn discover(root: impl AsRef<Path>) -> Result<DiscoveryResult> {
    let root = root.as_ref().to_path_buf();
    let (manifest, has_manifest) = find_manifest(&root)?;

    let sources = manifest.effective_sources();
    let scan = scan_sources(&sources, &root, &manifest);

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest,
        scan,
    })
}

/// Discover scenes from specific paths.
///
/// Directories are scanned; files are taken as given when they look like
/// scene files. A manifest next to the first path still supplies places,
/// policy and output settings.
pub fn discover_paths(paths: &[PathBuf]) -> Result<DiscoveryResult> {
    let root = match paths.first() {
        Some(path) if path.is_dir() => path.clone(),
        Some(path) => path.parent().map(Path::to_path_buf).unwrap_or_default(),
        None => PathBuf::from("."),
    };
    let (manifest, has_manifest) = find_manifest(&root)?;

    let mut scan = ScanResult::new();
    for path in paths {
        if path.is_dir() {
            scan.merge(scan_directory(path, &manifest));
        } else if path.is_file() && is_scene_file(path) {
            scan.merge(ScanResult {
                scenes: vec![path.clone()],
            });
        }
    }

    Ok(DiscoveryResult {
        root,
        manifest,
        has_manifest,
        scan,
    })
}

/// Load `mapscript.yaml` from a directory, or fall back to defaults.
fn find_manifest(root: &Path) -> Result<(Manifest, bool)> {
    let manifest_path = root.join(MANIFEST_FILENAME);
    if manifest_path.exists() {
        Ok((Manifest::load(&manifest_path)?, true))
    } else {
        Ok((Manifest::default(), false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SCENE: &str = "map:\n  id: harbor\n  center: [32.7, -117.1]\n";

    #[test]
    fn test_discover_empty_directory() {
        let dir = tempdir().unwrap();

        let result = discover(dir.path()).unwrap();

        assert!(!result.has_manifest);
        assert!(result.scan.is_empty());
    }

    #[test]
    fn test_discover_without_manifest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("harbor.map.yaml"), SCENE).unwrap();

        let result = discover(dir.path()).unwrap();

        assert!(!result.has_manifest);
        assert_eq!(result.scan.scenes.len(), 1);
        assert_eq!(result.output_dir(), dir.path().join("dist"));
    }

    #[test]
    fn test_discover_with_manifest() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("mapscript.yaml"),
            "sources:\n  - maps/\noutput: public\ncompress: true\n",
        )
        .unwrap();
        fs::create_dir_all(dir.path().join("maps")).unwrap();
        fs::write(dir.path().join("maps/harbor.map.yaml"), SCENE).unwrap();
        fs::write(dir.path().join("ignored.map.yaml"), SCENE).unwrap();

        let result = discover(dir.path()).unwrap();

        assert!(result.has_manifest);
        assert!(result.manifest.compress);
        assert_eq!(result.manifest.output, PathBuf::from("public"));
        assert_eq!(result.scan.scenes.len(), 1);
    }

    #[test]
    fn test_discover_with_excludes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mapscript.yaml"), "excludes:\n  - \"**/drafts/*\"\n").unwrap();
        fs::write(dir.path().join("harbor.map.yaml"), SCENE).unwrap();
        fs::create_dir_all(dir.path().join("drafts")).unwrap();
        fs::write(dir.path().join("drafts/old.map.yaml"), SCENE).unwrap();

        let result = discover(dir.path()).unwrap();

        assert_eq!(result.scan.scenes.len(), 1);
        assert!(result.scan.scenes[0].to_string_lossy().contains("harbor"));
    }

    #[test]
    fn test_discover_and_load() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("mapscript.yaml"), "places:\n  Pier: [32.71, -117.17]\n").unwrap();
        fs::write(
            dir.path().join("pier.map.yaml"),
            "map:\n  id: pier\n  center: Pier\n",
        )
        .unwrap();

        let scenes = discover(dir.path()).unwrap().load().unwrap();

        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].scene.map_id(), "pier");
        assert!(scenes[0].scene.settings().center.is_some());
    }

    #[test]
    fn test_discover_paths_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("harbor.map.yaml");
        fs::write(&path, SCENE).unwrap();
        fs::write(dir.path().join("readme.txt"), "hi").unwrap();

        let result = discover_paths(&[path, dir.path().join("readme.txt")]).unwrap();

        assert_eq!(result.scan.scenes.len(), 1);
        assert_eq!(result.root, dir.path());
    }

    #[test]
    fn test_discover_paths_directories() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("harbor.map.yaml"), SCENE).unwrap();

        let result = discover_paths(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(result.scan.scenes.len(), 1);
    }
}
