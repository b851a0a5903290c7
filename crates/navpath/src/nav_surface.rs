//! Navigable surface data
//!
//! The navigable surface is the static, read-only description of a baked
//! navigation mesh: vertices, convex polygons and the adjacency between them.
//! Searching happens on the flattened representation (`y`), while `real_y`
//! keeps the true elevation used when emitting waypoints.

use navpath_common::{
    barycentric_2d, dist_point_segment_sqr_2d, left, lerp_3d, point_in_convex_poly_2d, Error,
    Result,
};

use super::PolyRef;

/// Tolerance used when testing whether a point lies on a polygon footprint
const CONTAINMENT_EPS: f32 = 1.0e-4;

/// Vertex of the navigation surface
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavVertex {
    pub x: f32,
    /// Flattened height used by the search
    pub y: f32,
    pub z: f32,
    /// True surface elevation at this vertex
    pub real_y: f32,
}

impl NavVertex {
    /// Creates a vertex whose true elevation equals its search height
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, real_y: y }
    }

    /// Creates a vertex with a separate true elevation
    pub fn with_elevation(x: f32, y: f32, z: f32, real_y: f32) -> Self {
        Self { x, y, z, real_y }
    }

    /// Position in the flattened search space
    #[inline]
    pub fn pos(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Position with the true elevation restored
    #[inline]
    pub fn real_pos(&self) -> [f32; 3] {
        [self.x, self.real_y, self.z]
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.real_y.is_finite()
    }
}

/// Polygon in the navigation surface
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavPoly {
    /// Vertex indices, in winding order
    pub verts: Vec<u32>,
    /// Neighbor across each edge; edge `i` runs from `verts[i]` to `verts[i + 1]`
    pub neighbors: Vec<Option<PolyRef>>,
    /// Traversal cost multiplier for entering this polygon
    pub cost: f32,
}

impl NavPoly {
    /// Creates a new polygon with no neighbors and unit cost
    pub fn new(verts: Vec<u32>) -> Self {
        let neighbors = vec![None; verts.len()];
        Self {
            verts,
            neighbors,
            cost: 1.0,
        }
    }

    /// Number of vertices (and edges) of the polygon
    #[inline]
    pub fn vert_count(&self) -> usize {
        self.verts.len()
    }

    /// Vertex indices of edge `edge`
    #[inline]
    pub fn edge(&self, edge: usize) -> (u32, u32) {
        let n = self.verts.len();
        (self.verts[edge], self.verts[(edge + 1) % n])
    }

    /// Index of the edge shared with `other`, if any
    pub fn edge_to(&self, other: PolyRef) -> Option<usize> {
        self.neighbors.iter().position(|n| *n == Some(other))
    }

    /// Iterates over all neighboring polygons in edge order
    pub fn neighbor_refs(&self) -> impl Iterator<Item = PolyRef> + '_ {
        self.neighbors.iter().flatten().copied()
    }
}

/// Immutable navigable surface
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NavSurface {
    vertices: Vec<NavVertex>,
    polys: Vec<NavPoly>,
}

impl NavSurface {
    /// Creates a surface from pre-built vertices and polygons.
    ///
    /// The adjacency stored in the polygons must already be complete; use
    /// [`crate::NavSurfaceBuilder`] to derive it from shared edges instead.
    pub fn new(vertices: Vec<NavVertex>, polys: Vec<NavPoly>) -> Result<Self> {
        let surface = Self { vertices, polys };
        surface.validate()?;
        Ok(surface)
    }

    /// Checks the structural invariants of the surface
    pub fn validate(&self) -> Result<()> {
        if let Some(i) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidMesh(format!(
                "vertex {} has a non-finite coordinate",
                i
            )));
        }

        let vert_count = self.vertices.len();
        let poly_count = self.polys.len();

        for (i, poly) in self.polys.iter().enumerate() {
            if poly.verts.len() < 3 {
                return Err(Error::InvalidMesh(format!(
                    "polygon {} has {} vertices, need at least 3",
                    i,
                    poly.verts.len()
                )));
            }
            if poly.neighbors.len() != poly.verts.len() {
                return Err(Error::InvalidMesh(format!(
                    "polygon {} has {} neighbor slots for {} edges",
                    i,
                    poly.neighbors.len(),
                    poly.verts.len()
                )));
            }
            if let Some(&v) = poly.verts.iter().find(|&&v| v as usize >= vert_count) {
                return Err(Error::InvalidMesh(format!(
                    "polygon {} references vertex {} of {}",
                    i, v, vert_count
                )));
            }
            if !poly.cost.is_finite() || poly.cost <= 0.0 {
                return Err(Error::InvalidMesh(format!(
                    "polygon {} has invalid cost {}",
                    i, poly.cost
                )));
            }
        }

        for (i, poly) in self.polys.iter().enumerate() {
            let this = PolyRef::new(i as u32);

            for (edge, neighbor) in poly.neighbors.iter().enumerate() {
                let Some(neighbor) = *neighbor else {
                    continue;
                };

                if neighbor.index() >= poly_count {
                    return Err(Error::InvalidMesh(format!(
                        "polygon {} links to missing polygon {}",
                        i,
                        neighbor.id()
                    )));
                }
                if neighbor == this {
                    return Err(Error::InvalidMesh(format!(
                        "polygon {} links to itself",
                        i
                    )));
                }
                if poly.neighbor_refs().filter(|&n| n == neighbor).count() > 1 {
                    return Err(Error::InvalidMesh(format!(
                        "polygon {} links to {} across more than one edge",
                        i,
                        neighbor.id()
                    )));
                }

                let other = &self.polys[neighbor.index()];
                let Some(back_edge) = other.edge_to(this) else {
                    return Err(Error::InvalidMesh(format!(
                        "adjacency is not symmetric: {} -> {} has no reverse link",
                        i,
                        neighbor.id()
                    )));
                };

                let (a0, a1) = poly.edge(edge);
                let (b0, b1) = other.edge(back_edge);
                if !((a0 == b0 && a1 == b1) || (a0 == b1 && a1 == b0)) {
                    return Err(Error::InvalidMesh(format!(
                        "polygons {} and {} are linked but do not share an edge",
                        i,
                        neighbor.id()
                    )));
                }
            }
        }

        Ok(())
    }

    /// All vertices of the surface
    pub fn vertices(&self) -> &[NavVertex] {
        &self.vertices
    }

    /// All polygons of the surface
    pub fn polys(&self) -> &[NavPoly] {
        &self.polys
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn poly_count(&self) -> usize {
        self.polys.len()
    }

    /// Checks whether `poly_ref` indexes a polygon of this surface
    pub fn is_valid_poly_ref(&self, poly_ref: PolyRef) -> bool {
        poly_ref.index() < self.polys.len()
    }

    /// Gets a polygon by reference.
    ///
    /// # Panics
    ///
    /// Panics if `poly_ref` is out of range. References are only produced by
    /// validated construction or a validated region map.
    #[inline]
    pub fn poly(&self, poly_ref: PolyRef) -> &NavPoly {
        &self.polys[poly_ref.index()]
    }

    /// Gets a vertex by index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn vertex(&self, index: u32) -> &NavVertex {
        &self.vertices[index as usize]
    }

    /// Iterates over the neighbors of a polygon in edge order
    pub fn neighbors(&self, poly_ref: PolyRef) -> impl Iterator<Item = PolyRef> + '_ {
        self.poly(poly_ref).neighbor_refs()
    }

    /// Flattened positions of a polygon's vertices
    pub fn poly_verts(&self, poly_ref: PolyRef) -> Vec<[f32; 3]> {
        self.poly(poly_ref)
            .verts
            .iter()
            .map(|&v| self.vertex(v).pos())
            .collect()
    }

    /// Gets the center of a polygon (average of its vertices)
    pub fn poly_center(&self, poly_ref: PolyRef) -> [f32; 3] {
        let poly = self.poly(poly_ref);
        let mut center = [0.0; 3];

        for &v in &poly.verts {
            let pos = self.vertex(v).pos();
            center[0] += pos[0];
            center[1] += pos[1];
            center[2] += pos[2];
        }

        let scale = 1.0 / poly.verts.len() as f32;
        center[0] *= scale;
        center[1] *= scale;
        center[2] *= scale;
        center
    }

    /// Gets the portal (shared edge) between two adjacent polygons.
    ///
    /// Returns the `(left, right)` end points as seen when travelling from
    /// `from_ref` into `to_ref`, or `None` if the polygons are not linked.
    pub fn portal_points(&self, from_ref: PolyRef, to_ref: PolyRef) -> Option<([f32; 3], [f32; 3])> {
        let from_poly = self.poly(from_ref);
        let edge = from_poly.edge_to(to_ref)?;
        let (va, vb) = from_poly.edge(edge);
        let a = self.vertex(va).pos();
        let b = self.vertex(vb).pos();

        // Seen from inside `from_ref`, `b` left of `center -> a` means the
        // edge runs right to left.
        let center = self.poly_center(from_ref);
        if left(&center, &a, &b) {
            Some((b, a))
        } else {
            Some((a, b))
        }
    }

    /// Checks whether the point lies on the XZ footprint of the polygon
    pub fn contains_point_2d(&self, poly_ref: PolyRef, pos: &[f32; 3]) -> bool {
        point_in_convex_poly_2d(pos, &self.poly_verts(poly_ref), CONTAINMENT_EPS)
    }

    /// Finds the polygon whose footprint contains the point.
    ///
    /// Points on a shared edge resolve to the lowest polygon index.
    pub fn find_poly_containing(&self, pos: &[f32; 3]) -> Option<PolyRef> {
        (0..self.polys.len() as u32)
            .map(PolyRef::new)
            .find(|&r| self.contains_point_2d(r, pos))
    }

    /// Samples the true surface elevation of a polygon at the XZ location of
    /// `pos`.
    ///
    /// The polygon is fan-triangulated and `real_y` is interpolated over the
    /// triangle containing the point. Points slightly off the footprint are
    /// clamped to the nearest polygon edge.
    pub fn real_height_at(&self, poly_ref: PolyRef, pos: &[f32; 3]) -> f32 {
        let poly = self.poly(poly_ref);
        let verts: Vec<[f32; 3]> = poly
            .verts
            .iter()
            .map(|&v| self.vertex(v).real_pos())
            .collect();

        let v0 = &verts[0];
        for i in 1..verts.len() - 1 {
            let v1 = &verts[i];
            let v2 = &verts[i + 1];
            if let Some((u, v, w)) = barycentric_2d(pos, v0, v1, v2) {
                if u >= -CONTAINMENT_EPS && v >= -CONTAINMENT_EPS && w >= -CONTAINMENT_EPS {
                    return u * v0[1] + v * v1[1] + w * v2[1];
                }
            }
        }

        // Off the footprint: use the closest point on the boundary.
        let n = verts.len();
        let mut best_dist = f32::MAX;
        let mut best_height = v0[1];
        for i in 0..n {
            let a = &verts[i];
            let b = &verts[(i + 1) % n];
            let (d, t) = dist_point_segment_sqr_2d(pos, a, b);
            if d < best_dist {
                best_dist = d;
                best_height = lerp_3d(a, b, t)[1];
            }
        }
        best_height
    }
}

#[cfg(feature = "serialization")]
impl NavSurface {
    /// Parses and validates a surface from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let surface: NavSurface =
            serde_json::from_str(json).map_err(|e| Error::InvalidMesh(e.to_string()))?;
        surface.validate()?;
        Ok(surface)
    }

    /// Serializes the surface to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidMesh(e.to_string()))
    }
}

/// A surface bundled with the region map produced by the same bake
#[cfg(feature = "serialization")]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SurfaceAsset {
    pub surface: NavSurface,
    #[serde(default)]
    pub regions: crate::RegionIndexMap,
}

#[cfg(feature = "serialization")]
impl SurfaceAsset {
    /// Parses and validates an asset from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let asset: SurfaceAsset =
            serde_json::from_str(json).map_err(|e| Error::InvalidMesh(e.to_string()))?;
        asset.surface.validate()?;
        asset.regions.validate_against(&asset.surface)?;
        Ok(asset)
    }

    /// Loads an asset from a JSON file
    pub fn load_from_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Saves the asset to a JSON file
    pub fn save_to_json<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| Error::InvalidMesh(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
