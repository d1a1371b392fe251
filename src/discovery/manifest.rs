//! Project manifest (mapscript.yaml) parsing.
//!
//! The manifest defines project configuration including source paths,
//! output settings, the registration policy and a shared table of places.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geocode::PlaceTable;
use crate::registry::RegistrationPolicy;
use crate::types::Coordinate;

/// Project manifest loaded from mapscript.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Source directories to scan for scene files.
    /// Defaults to current directory if empty.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Output directory for generated scripts.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Compress generated scripts.
    #[serde(default)]
    pub compress: bool,

    /// Also write a standalone HTML page per map.
    #[serde(default)]
    pub html: bool,

    /// How scene entities that cannot be decoded are treated.
    #[serde(default)]
    pub policy: RegistrationPolicy,

    /// Place names shared by every scene in the project.
    #[serde(default)]
    pub places: BTreeMap<String, Coordinate>,

    /// Patterns to exclude from discovery.
    #[serde(default)]
    pub excludes: Vec<String>,
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            sources: vec![],
            output: default_output(),
            compress: false,
            html: false,
            policy: RegistrationPolicy::default(),
            places: BTreeMap::new(),
            excludes: vec![],
        }
    }
}

impl Manifest {
    /// Load manifest from a mapscript.yaml file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MapError::Io {
            path: path.to_path_buf(),
            message: format!("Failed to read manifest: {}", e),
        })?;

        Self::parse(&content)
    }

    /// Parse manifest from YAML string.
    pub fn parse(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| MapError::Parse {
            message: format!("Invalid manifest: {}", e),
            help: Some("Check mapscript.yaml syntax".to_string()),
        })
    }

    /// Check if a path should be excluded based on exclude patterns.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.excludes
            .iter()
            .any(|pattern| Self::matches_pattern(&path_str, pattern))
    }

    /// Simple glob pattern matching.
    fn matches_pattern(path: &str, pattern: &str) -> bool {
        if let Some(suffix) = pattern.strip_prefix("**/") {
            // **/dir/* matches anything inside dir anywhere in the path
            if let Some(dir) = suffix.strip_suffix("/*") {
                return path.contains(&format!("/{}/", dir)) || path.starts_with(&format!("{}/", dir));
            }
            return path.contains(suffix);
        }

        if let Some(suffix) = pattern.strip_prefix('*') {
            if !pattern.contains('/') {
                return path.ends_with(suffix);
            }
        }

        if let Some(prefix) = pattern.strip_suffix("/*") {
            return path.starts_with(&format!("{}/", prefix))
                || path.contains(&format!("/{}/", prefix));
        }

        path.contains(pattern)
    }

    /// Get effective source paths, defaulting to current directory.
    pub fn effective_sources(&self) -> Vec<String> {
        if self.sources.is_empty() {
            vec![".".to_string()]
        } else {
            self.sources.clone()
        }
    }

    /// The shared places as a geocoder table.
    pub fn place_table(&self) -> PlaceTable {
        self.places.iter().map(|(name, c)| (name.as_str(), *c)).collect()
    }
}
