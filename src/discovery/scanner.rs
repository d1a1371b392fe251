//! File system scanner for discovering scene files.
//!
//! Recursively scans directories to find all `*.map.yaml` (or `*.map.yml`)
//! scene definitions.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::manifest::Manifest;

/// File name suffixes that mark a scene file.
pub const SCENE_SUFFIXES: &[&str] = &[".map.yaml", ".map.yml"];

/// Result of scanning for scene files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Discovered scene files, in walk order.
    pub scenes: Vec<PathBuf>,
}

impl ScanResult {
    /// Create a new empty scan result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of discovered files.
    pub fn total(&self) -> usize {
        self.scenes.len()
    }

    /// Check if no files were discovered.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Merge another scan result into this one, skipping paths already seen.
    pub fn merge(&mut self, other: ScanResult) {
        for path in other.scenes {
            if !self.scenes.contains(&path) {
                self.scenes.push(path);
            }
        }
    }
}

/// Whether a path names a scene file.
pub fn is_scene_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SCENE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)))
}

/// Scan a directory for scene files.
///
/// Entries are visited in file name order so output is stable across
/// platforms.
pub fn scan_directory(root: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    if !root.exists() {
        return result;
    }

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if path.is_dir() || manifest.is_excluded(path) {
            continue;
        }

        if is_scene_file(path) {
            result.scenes.push(path.to_path_buf());
        }
    }

    result
}

/// Scan multiple source paths.
pub fn scan_sources(sources: &[String], base_path: &Path, manifest: &Manifest) -> ScanResult {
    let mut result = ScanResult::new();

    for source in sources {
        let source_path = if Path::new(source).is_absolute() {
            PathBuf::from(source)
        } else {
            base_path.join(source)
        };

        result.merge(scan_directory(&source_path, manifest));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_scene_file() {
        assert!(is_scene_file(Path::new("maps/harbor.map.yaml")));
        assert!(is_scene_file(Path::new("harbor.map.yml")));
        assert!(!is_scene_file(Path::new("mapscript.yaml")));
        assert!(!is_scene_file(Path::new("harbor.yaml")));
    }

    #[test]
    fn test_scan_directory_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.map.yaml"), "map: {}").unwrap();
        fs::write(dir.path().join("a.map.yaml"), "map: {}").unwrap();
        fs::write(dir.path().join("nested/c.map.yml"), "map: {}").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();

        let result = scan_directory(dir.path(), &Manifest::default());

        let names: Vec<_> = result
            .scenes
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.map.yaml", "b.map.yaml", "c.map.yml"]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let result = scan_directory(Path::new("/definitely/not/here"), &Manifest::default());
        assert!(result.is_empty());
    }

    #[test]
    fn test_merge_skips_duplicates() {
        let mut a = ScanResult {
            scenes: vec![PathBuf::from("x.map.yaml")],
        };
        a.merge(ScanResult {
            scenes: vec![PathBuf::from("x.map.yaml"), PathBuf::from("y.map.yaml")],
        });
        assert_eq!(a.total(), 2);
    }
}
