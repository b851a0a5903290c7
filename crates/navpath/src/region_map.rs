//! Mapping from externally assigned region identifiers to polygon indices

use std::collections::{BTreeMap, HashMap};

use navpath_common::{Error, Result};

use super::{NavSurface, PolyRef};

/// Maps region identifiers assigned by the baking tool to polygons.
///
/// The map does not need to be total. Negative polygon indices are kept as
/// "no polygon" sentinels, the same as an absent identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RegionIndexMap {
    entries: BTreeMap<i32, i32>,
}

impl RegionIndexMap {
    /// Creates an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(region_id, poly_index)` pairs
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        Self {
            entries: pairs.into_iter().collect(),
        }
    }

    /// Inserts a mapping, returning the previous polygon index for the id
    pub fn insert(&mut self, region_id: i32, poly_index: i32) -> Option<i32> {
        self.entries.insert(region_id, poly_index)
    }

    /// Resolves a region identifier to a polygon.
    ///
    /// Returns `None` for unmapped identifiers and negative sentinels.
    pub fn resolve(&self, region_id: i32) -> Option<PolyRef> {
        self.entries
            .get(&region_id)
            .filter(|&&index| index >= 0)
            .map(|&index| PolyRef::new(index as u32))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(region_id, poly_index)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.entries.iter().map(|(&id, &index)| (id, index))
    }

    /// Checks that every non-sentinel entry points at a polygon of `surface`
    pub fn validate_against(&self, surface: &NavSurface) -> Result<()> {
        for (id, index) in self.iter() {
            if index >= 0 && !surface.is_valid_poly_ref(PolyRef::new(index as u32)) {
                return Err(Error::InvalidMesh(format!(
                    "region {} maps to polygon {} but the surface has {} polygons",
                    id,
                    index,
                    surface.poly_count()
                )));
            }
        }
        Ok(())
    }
}

impl From<HashMap<i32, i32>> for RegionIndexMap {
    fn from(map: HashMap<i32, i32>) -> Self {
        Self::from_pairs(map)
    }
}

impl FromIterator<(i32, i32)> for RegionIndexMap {
    fn from_iter<I: IntoIterator<Item = (i32, i32)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
