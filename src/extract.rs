//! Marker data extraction.
//!
//! Walks the marker set once, in index order, collapsing structurally equal
//! icons, shadows and shapes into shared definition lists and collecting
//! group memberships. Results are cached by a content hash of the marker
//! set, so repeated emission of an unchanged scene does no extra work.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{MapError, Result};
use crate::types::{Marker, MarkerIcon, MarkerShape};

/// Definition-list indices resolved for one marker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MarkerRefs {
    pub icon: Option<usize>,
    pub shadow: Option<usize>,
    pub shape: Option<usize>,
    /// Group indices, in the marker's membership order.
    pub groups: Vec<usize>,
}

/// A marker group as first seen during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupEntry {
    pub var_name: String,
    pub name: String,
    pub index: usize,
    /// Member marker indices, in marker order.
    pub members: Vec<usize>,
}

/// The deduplicated marker resources of a scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarkerData {
    /// Icons and shadows share one list.
    pub icons: Vec<MarkerIcon>,
    pub shapes: Vec<MarkerShape>,
    pub groups: Vec<GroupEntry>,
    /// Keyed by marker index.
    pub markers: BTreeMap<usize, MarkerRefs>,
}

impl MarkerData {
    pub fn refs(&self, marker_index: usize) -> Option<&MarkerRefs> {
        self.markers.get(&marker_index)
    }

    pub fn group(&self, var_name: &str) -> Option<&GroupEntry> {
        self.groups.iter().find(|g| g.var_name == var_name)
    }
}

/// Append-or-find list keyed by structural equality.
struct Dedup<T> {
    items: Vec<T>,
    positions: HashMap<T, usize>,
}

impl<T: Clone + Eq + std::hash::Hash> Dedup<T> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn intern(&mut self, item: &T) -> usize {
        if let Some(&index) = self.positions.get(item) {
            return index;
        }
        let index = self.items.len();
        self.items.push(item.clone());
        self.positions.insert(item.clone(), index);
        index
    }
}

/// Extract icons, shapes and groups from a marker snapshot.
pub fn extract(markers: &[(usize, &Marker)]) -> MarkerData {
    let mut icons = Dedup::new();
    let mut shapes = Dedup::new();
    let mut groups: Vec<GroupEntry> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut refs = BTreeMap::new();

    for &(marker_index, marker) in markers {
        let mut entry = MarkerRefs {
            icon: marker.icon.as_ref().map(|icon| icons.intern(icon)),
            shadow: marker.shadow.as_ref().map(|shadow| icons.intern(shadow)),
            shape: marker.shape.as_ref().map(|shape| shapes.intern(shape)),
            groups: Vec::with_capacity(marker.groups.len()),
        };

        for group in &marker.groups {
            let index = *group_index.entry(group.var_name.clone()).or_insert_with(|| {
                groups.push(GroupEntry {
                    var_name: group.var_name.clone(),
                    name: group.name.clone(),
                    index: groups.len(),
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[index].members.push(marker_index);
            entry.groups.push(index);
        }

        refs.insert(marker_index, entry);
    }

    MarkerData {
        icons: icons.items,
        shapes: shapes.items,
        groups,
        markers: refs,
    }
}

/// SHA-256 hex digest of the JSON form of a marker snapshot.
pub fn content_hash(markers: &[(usize, &Marker)]) -> Result<String> {
    let bytes = serde_json::to_vec(markers)
        .map_err(|e| MapError::render(format!("failed to hash marker set: {}", e)))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Extraction result memoized on the marker set's content hash.
#[derive(Debug, Default)]
pub struct MarkerCache {
    hash: Option<String>,
    data: MarkerData,
    passes: usize,
}

impl MarkerCache {
    /// Return cached data, re-extracting only when the snapshot changed.
    pub fn get(&mut self, markers: &[(usize, &Marker)]) -> Result<&MarkerData> {
        let hash = content_hash(markers)?;
        if self.hash.as_deref() != Some(hash.as_str()) {
            self.data = extract(markers);
            self.hash = Some(hash);
            self.passes += 1;
        }
        Ok(&self.data)
    }

    /// Number of full extraction passes.
    pub fn passes(&self) -> usize {
        self.passes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinate, MarkerGroup, MarkerShapeKind};

    fn marker(lat: f64) -> Marker {
        Marker::new(Coordinate::new(lat, 0.0).unwrap())
    }

    #[test]
    fn test_equal_icons_collapse() {
        let a = marker(1.0).with_icon(MarkerIcon::new("pin.png", 20, 32));
        let b = marker(2.0).with_icon(MarkerIcon::new("pin.png", 20, 32));
        let c = marker(3.0).with_icon(MarkerIcon::new("star.png", 20, 32));

        let data = extract(&[(0, &a), (1, &b), (2, &c)]);

        assert_eq!(data.icons.len(), 2);
        assert_eq!(data.refs(0).unwrap().icon, Some(0));
        assert_eq!(data.refs(1).unwrap().icon, Some(0));
        assert_eq!(data.refs(2).unwrap().icon, Some(1));
    }

    #[test]
    fn test_shadows_share_icon_list() {
        let shadow = MarkerIcon::new("shadow.png", 30, 32);
        let a = marker(1.0)
            .with_icon(MarkerIcon::new("pin.png", 20, 32))
            .with_shadow(shadow.clone());
        let b = marker(2.0).with_icon(shadow);

        let data = extract(&[(0, &a), (1, &b)]);

        assert_eq!(data.icons.len(), 2);
        assert_eq!(data.refs(0).unwrap().shadow, Some(1));
        assert_eq!(data.refs(1).unwrap().icon, Some(1));
    }

    #[test]
    fn test_shapes_have_own_list() {
        let shape = MarkerShape::new(MarkerShapeKind::Circle, vec![10, 10, 10]);
        let a = marker(1.0)
            .with_icon(MarkerIcon::new("pin.png", 20, 32))
            .with_shape(shape.clone());
        let b = marker(2.0).with_shape(shape);

        let data = extract(&[(0, &a), (1, &b)]);

        assert_eq!(data.shapes.len(), 1);
        assert_eq!(data.refs(0).unwrap().shape, Some(0));
        assert_eq!(data.refs(1).unwrap().shape, Some(0));
        assert_eq!(data.refs(1).unwrap().icon, None);
    }

    #[test]
    fn test_groups_created_on_first_sighting() {
        let parks = MarkerGroup::new("Parks");
        let cafes = MarkerGroup::new("Cafes");
        let mut a = marker(1.0);
        a.add_to_group(&cafes);
        let mut b = marker(2.0);
        b.add_to_group(&parks);
        b.add_to_group(&cafes);

        let data = extract(&[(0, &a), (1, &b)]);

        assert_eq!(data.groups.len(), 2);
        assert_eq!(data.groups[0].var_name, "Cafes");
        assert_eq!(data.groups[0].members, vec![0, 1]);
        assert_eq!(data.groups[1].var_name, "Parks");
        assert_eq!(data.groups[1].members, vec![1]);
        assert_eq!(data.refs(1).unwrap().groups, vec![1, 0]);
    }

    #[test]
    fn test_cache_skips_unchanged_snapshot() {
        let a = marker(1.0).with_icon(MarkerIcon::new("pin.png", 20, 32));
        let mut cache = MarkerCache::default();

        cache.get(&[(0, &a)]).unwrap();
        cache.get(&[(0, &a)]).unwrap();
        assert_eq!(cache.passes(), 1);

        let b = marker(2.0);
        let data = cache.get(&[(0, &a), (1, &b)]).unwrap();
        assert_eq!(data.markers.len(), 2);
        assert_eq!(cache.passes(), 2);
    }

    #[test]
    fn test_content_hash_is_order_sensitive() {
        let a = marker(1.0);
        let b = marker(2.0);
        let ab = content_hash(&[(0, &a), (1, &b)]).unwrap();
        let ba = content_hash(&[(0, &b), (1, &a)]).unwrap();
        assert_ne!(ab, ba);
        assert_eq!(ab.len(), 64);
    }
}
