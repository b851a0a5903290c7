//! Pathfinding over static, pre-baked navigation surfaces
//!
//! Given a read-only [`NavSurface`] (vertices, convex polygons and their
//! adjacency), this crate finds a polygon corridor between two polygons with
//! an A* search and pulls it taut into a short list of waypoints with the
//! funnel algorithm. The [`PathService`] facade ties both steps to the region
//! identifiers assigned by the baking tool.
//!
//! # Example
//!
//! ```rust
//! use navpath::{NavSurfaceBuilder, PathService, RegionIndexMap};
//! use navpath_common::Vec3;
//!
//! let mut builder = NavSurfaceBuilder::new();
//! let v: Vec<u32> = [
//!     (0.0, 0.0), (1.0, 0.0), (2.0, 0.0),
//!     (2.0, 1.0), (1.0, 1.0), (0.0, 1.0),
//! ]
//! .iter()
//! .map(|&(x, z)| builder.add_vertex(x, 0.0, z))
//! .collect();
//! builder.add_poly(&[v[0], v[1], v[4], v[5]]);
//! builder.add_poly(&[v[1], v[2], v[3], v[4]]);
//! let surface = builder.build()?;
//!
//! let regions = RegionIndexMap::from_pairs([(10, 0), (20, 1)]);
//! let service = PathService::new(&surface, regions)?;
//!
//! let path = service
//!     .compute_path(Vec3::new(0.5, 0.0, 0.5), Vec3::new(1.5, 0.0, 0.5), 10, 20)?
//!     .expect("both squares are connected");
//! assert_eq!(path.len(), 2);
//! # Ok::<(), navpath_common::Error>(())
//! ```

mod config;
mod nav_surface;
mod nav_surface_builder;
mod nav_surface_query;
mod node_pool;
mod path_service;
mod region_map;
mod status;
mod straight_path;

#[cfg(test)]
mod test_mesh_helpers;

#[cfg(test)]
mod path_edge_cases_tests;

pub use config::PathfinderConfig;
pub use nav_surface::{NavPoly, NavSurface, NavVertex};
#[cfg(feature = "serialization")]
pub use nav_surface::SurfaceAsset;
pub use nav_surface_builder::NavSurfaceBuilder;
pub use nav_surface_query::NavSurfaceQuery;
pub use node_pool::{NodeFlags, NodeIndex, NodePool, NodeQueue, SearchNode, NULL_NODE_IDX};
pub use path_service::PathService;
pub use region_map::RegionIndexMap;
pub use status::Status;
pub use straight_path::StraightPathPoint;

/// Reference to a polygon of a [`NavSurface`] (its index in the polygon list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PolyRef(u32);

impl PolyRef {
    /// Creates a new polygon reference
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Gets the raw polygon id
    pub const fn id(&self) -> u32 {
        self.0
    }

    /// Gets the polygon index into [`NavSurface::polys`]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for PolyRef {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PolyRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "poly#{}", self.0)
    }
}
