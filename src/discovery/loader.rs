//! Scene loader - parses discovered files into scenes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{MapError, Result};
use crate::geocode::PlaceTable;
use crate::parser::parse_scene;
use crate::registry::{RegistrationPolicy, Scene};

use super::manifest::Manifest;
use super::scanner::ScanResult;

/// Options for loading scenes.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// How undecodable entities are treated.
    pub policy: RegistrationPolicy,
    /// Project-wide places, overlaid by each scene's own.
    pub places: PlaceTable,
}

impl LoadOptions {
    /// Options taken from a project manifest.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            policy: manifest.policy,
            places: manifest.place_table(),
        }
    }
}

/// A scene together with the file it came from.
#[derive(Debug)]
pub struct LoadedScene {
    pub path: PathBuf,
    pub scene: Scene,
}

/// Load every scanned scene file.
///
/// All files are attempted; failures are collected and reported together.
/// Two files declaring the same map id are an error, since their outputs
/// would overwrite each other.
pub fn load_scenes(scan: &ScanResult, options: &LoadOptions) -> Result<Vec<LoadedScene>> {
    let mut scenes = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();

    for path in &scan.scenes {
        match load_scene_file(path, options) {
            Ok(scene) => {
                if let Some(first) = seen.get(scene.map_id()) {
                    errors.push(format!(
                        "{}: map id '{}' is already used by {}",
                        path.display(),
                        scene.map_id(),
                        first.display()
                    ));
                    continue;
                }
                seen.insert(scene.map_id().to_string(), path.clone());
                scenes.push(LoadedScene {
                    path: path.clone(),
                    scene,
                });
            }
            Err(e) => {
                errors.push(format!("{}: {}", path.display(), e));
            }
        }
    }

    if !errors.is_empty() {
        return Err(MapError::Build {
            message: format!("Failed to load {} file(s):\n  {}", errors.len(), errors.join("\n  ")),
            help: Some("Fix the errors above and try again".to_string()),
        });
    }

    Ok(scenes)
}

/// Read and parse a single scene file.
pub fn load_scene_file(path: &Path, options: &LoadOptions) -> Result<Scene> {
    let content = fs::read_to_string(path).map_err(|e| MapError::Io {
        path: path.to_path_buf(),
        message: format!("Failed to read scene: {}", e),
    })?;
    parse_scene(&content, &options.places, options.policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::EntityKind;
    use crate::types::Coordinate;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_empty_scan() {
        let scenes = load_scenes(&ScanResult::default(), &LoadOptions::default()).unwrap();
        assert!(scenes.is_empty());
    }

    #[test]
    fn test_load_scene_file_with_project_places() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tour.map.yaml");
        fs::write(
            &path,
            "map:\n  id: tour\nentities:\n  - type: marker\n    position: Harbor\n",
        )
        .unwrap();

        let options = LoadOptions {
            places: [("Harbor", Coordinate::new(32.71, -117.17).unwrap())]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let scan = ScanResult {
            scenes: vec![path.clone()],
        };
        let scenes = load_scenes(&scan, &options).unwrap();

        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].path, path);
        assert_eq!(scenes[0].scene.count(EntityKind::Marker), 1);
    }

    #[test]
    fn test_load_collects_errors() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.map.yaml");
        let bad = dir.path().join("bad.map.yaml");
        let missing = dir.path().join("missing.map.yaml");
        fs::write(&good, "map:\n  id: good\n").unwrap();
        fs::write(&bad, "map: [not, a, mapping]\n").unwrap();

        let scan = ScanResult {
            scenes: vec![good, bad, missing],
        };
        let err = load_scenes(&scan, &LoadOptions::default()).unwrap_err();

        let MapError::Build { message, .. } = err else {
            panic!("expected a build error");
        };
        assert!(message.starts_with("Failed to load 2 file(s)"));
        assert!(message.contains("bad.map.yaml"));
        assert!(message.contains("missing.map.yaml"));
    }

    #[test]
    fn test_duplicate_map_ids() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.map.yaml");
        let b = dir.path().join("b.map.yaml");
        fs::write(&a, "map:\n  id: same\n").unwrap();
        fs::write(&b, "map:\n  id: same\n").unwrap();

        let scan = ScanResult { scenes: vec![a, b] };
        let err = load_scenes(&scan, &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("Failed to load 1 file(s)"));
    }

    #[test]
    fn test_strict_policy_from_manifest() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.map.yaml");
        fs::write(&path, "entities:\n  - type: heatmap\n").unwrap();

        let manifest = Manifest {
            policy: RegistrationPolicy::Strict,
            ..Default::default()
        };
        let options = LoadOptions::from_manifest(&manifest);
        assert!(load_scene_file(&path, &options).is_err());

        let scene = load_scene_file(&path, &LoadOptions::default()).unwrap();
        assert_eq!(scene.skipped().len(), 1);
    }
}
