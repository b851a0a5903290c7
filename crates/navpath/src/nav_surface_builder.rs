//! Builder that derives polygon adjacency from shared edges

use std::collections::HashMap;

use log::debug;
use navpath_common::{Error, Result};

use super::{NavPoly, NavSurface, NavVertex, PolyRef};

/// Builder for creating a [`NavSurface`] from raw vertices and polygons
///
/// Two polygons that share an undirected edge (the same pair of vertex
/// indices) become neighbors across that edge.
#[derive(Debug, Default, Clone)]
pub struct NavSurfaceBuilder {
    vertices: Vec<NavVertex>,
    polys: Vec<NavPoly>,
}

impl NavSurfaceBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a vertex whose true elevation equals its search height
    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) -> u32 {
        self.push_vertex(NavVertex::new(x, y, z))
    }

    /// Adds a vertex with a separate true elevation
    pub fn add_vertex_with_elevation(&mut self, x: f32, y: f32, z: f32, real_y: f32) -> u32 {
        self.push_vertex(NavVertex::with_elevation(x, y, z, real_y))
    }

    /// Adds a polygon with unit traversal cost
    pub fn add_poly(&mut self, verts: &[u32]) -> PolyRef {
        self.add_poly_with_cost(verts, 1.0)
    }

    /// Adds a polygon with a traversal cost multiplier
    pub fn add_poly_with_cost(&mut self, verts: &[u32], cost: f32) -> PolyRef {
        let poly_ref = PolyRef::new(self.polys.len() as u32);
        let mut poly = NavPoly::new(verts.to_vec());
        poly.cost = cost;
        self.polys.push(poly);
        poly_ref
    }

    /// Links polygons across shared edges and validates the result
    pub fn build(mut self) -> Result<NavSurface> {
        self.build_internal_links()?;

        debug!(
            "Built navigation surface: {} vertices, {} polygons",
            self.vertices.len(),
            self.polys.len()
        );

        NavSurface::new(self.vertices, self.polys)
    }

    fn push_vertex(&mut self, vertex: NavVertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    fn build_internal_links(&mut self) -> Result<()> {
        // Undirected edge -> (poly index, edge index) of every owner
        let mut edges: HashMap<(u32, u32), Vec<(usize, usize)>> = HashMap::new();

        for (poly_idx, poly) in self.polys.iter().enumerate() {
            if poly.vert_count() < 3 {
                return Err(Error::InvalidMesh(format!(
                    "polygon {} has {} vertices, need at least 3",
                    poly_idx,
                    poly.vert_count()
                )));
            }

            for edge in 0..poly.vert_count() {
                let (a, b) = poly.edge(edge);
                if a == b {
                    return Err(Error::InvalidMesh(format!(
                        "polygon {} has a zero-length edge at vertex {}",
                        poly_idx, a
                    )));
                }
                edges
                    .entry((a.min(b), a.max(b)))
                    .or_default()
                    .push((poly_idx, edge));
            }
        }

        let mut links = 0;
        for ((a, b), owners) in &edges {
            match owners.as_slice() {
                [_] => {}
                [(p0, e0), (p1, e1)] => {
                    if p0 == p1 {
                        return Err(Error::InvalidMesh(format!(
                            "polygon {} uses edge {}-{} twice",
                            p0, a, b
                        )));
                    }
                    self.polys[*p0].neighbors[*e0] = Some(PolyRef::new(*p1 as u32));
                    self.polys[*p1].neighbors[*e1] = Some(PolyRef::new(*p0 as u32));
                    links += 1;
                }
                _ => {
                    return Err(Error::InvalidMesh(format!(
                        "edge {}-{} is shared by {} polygons",
                        a,
                        b,
                        owners.len()
                    )));
                }
            }
        }

        debug!("Linked {} shared edges", links);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_symmetric_links() -> Result<()> {
        let mut builder = NavSurfaceBuilder::new();
        let v0 = builder.add_vertex(0.0, 0.0, 0.0);
        let v1 = builder.add_vertex(1.0, 0.0, 0.0);
        let v2 = builder.add_vertex(1.0, 0.0, 1.0);
        let v3 = builder.add_vertex(0.0, 0.0, 1.0);
        let a = builder.add_poly(&[v0, v1, v2]);
        let b = builder.add_poly(&[v0, v2, v3]);

        let surface = builder.build()?;
        assert_eq!(surface.neighbors(a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(surface.neighbors(b).collect::<Vec<_>>(), vec![a]);
        // a: edge 2 is v2-v0, b: edge 0 is v0-v2
        assert_eq!(surface.poly(a).neighbors[2], Some(b));
        assert_eq!(surface.poly(b).neighbors[0], Some(a));
        Ok(())
    }

    #[test]
    fn test_cost_is_kept() -> Result<()> {
        let mut builder = NavSurfaceBuilder::new();
        let v0 = builder.add_vertex(0.0, 0.0, 0.0);
        let v1 = builder.add_vertex(1.0, 0.0, 0.0);
        let v2 = builder.add_vertex(1.0, 0.0, 1.0);
        let p = builder.add_poly_with_cost(&[v0, v1, v2], 4.0);

        let surface = builder.build()?;
        assert_eq!(surface.poly(p).cost, 4.0);
        Ok(())
    }

    #[test]
    fn test_elevation_is_kept() -> Result<()> {
        let mut builder = NavSurfaceBuilder::new();
        let v0 = builder.add_vertex_with_elevation(0.0, 0.0, 0.0, 3.0);
        let v1 = builder.add_vertex(1.0, 0.0, 0.0);
        let v2 = builder.add_vertex(1.0, 0.0, 1.0);
        builder.add_poly(&[v0, v1, v2]);

        let surface = builder.build()?;
        assert_eq!(surface.vertex(v0).real_y, 3.0);
        assert_eq!(surface.vertex(v1).real_y, 0.0);
        Ok(())
    }

    #[test]
    fn test_rejects_non_manifold_edge() {
        let mut builder = NavSurfaceBuilder::new();
        let v0 = builder.add_vertex(0.0, 0.0, 0.0);
        let v1 = builder.add_vertex(1.0, 0.0, 0.0);
        let v2 = builder.add_vertex(0.5, 0.0, 1.0);
        let v3 = builder.add_vertex(0.5, 0.0, -1.0);
        let v4 = builder.add_vertex(0.5, 1.0, 1.0);
        builder.add_poly(&[v0, v1, v2]);
        builder.add_poly(&[v1, v0, v3]);
        builder.add_poly(&[v0, v1, v4]);

        let err = builder.build().unwrap_err();
        assert!(err.to_string().contains("shared by 3 polygons"));
    }

    #[test]
    fn test_rejects_degenerate_polys() {
        let mut builder = NavSurfaceBuilder::new();
        let v0 = builder.add_vertex(0.0, 0.0, 0.0);
        let v1 = builder.add_vertex(1.0, 0.0, 0.0);
        builder.add_poly(&[v0, v1]);
        assert!(builder.build().is_err());

        let mut builder = NavSurfaceBuilder::new();
        let v0 = builder.add_vertex(0.0, 0.0, 0.0);
        let v1 = builder.add_vertex(1.0, 0.0, 0.0);
        let v2 = builder.add_vertex(1.0, 0.0, 1.0);
        builder.add_poly(&[v0, v1, v1, v2]);
        assert!(builder.build().is_err());
    }
}
