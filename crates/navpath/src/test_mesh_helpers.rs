//! Test surface creation helpers
//!
//! Small hand-laid surfaces shared by the unit and scenario tests. All of
//! them sit on the XZ plane with unit-sized cells.

use crate::{NavSurface, NavSurfaceBuilder, PolyRef};
use navpath_common::Result;

/// Two unit squares side by side along +X, sharing the edge x = 1.
///
/// Polygon 0 covers [0,1]x[0,1] and polygon 1 covers [1,2]x[0,1].
pub fn create_two_square_surface() -> Result<NavSurface> {
    let mut builder = NavSurfaceBuilder::new();
    let v = add_strip_vertices(&mut builder, 2, |_| 0.0);
    builder.add_poly(&[v[0], v[1], v[4], v[5]]);
    builder.add_poly(&[v[1], v[2], v[3], v[4]]);
    builder.build()
}

/// Same layout as [`create_two_square_surface`], but the true elevation
/// rises with X (`real_y = x`) while the search height stays flat.
pub fn create_ramp_surface() -> Result<NavSurface> {
    let mut builder = NavSurfaceBuilder::new();
    let v = add_strip_vertices(&mut builder, 2, |x| x);
    builder.add_poly(&[v[0], v[1], v[4], v[5]]);
    builder.add_poly(&[v[1], v[2], v[3], v[4]]);
    builder.build()
}

/// Two connected squares plus an unreachable island square (polygon 2)
/// covering [5,6]x[0,1].
pub fn create_disconnected_surface() -> Result<NavSurface> {
    let mut builder = NavSurfaceBuilder::new();
    let v = add_strip_vertices(&mut builder, 2, |_| 0.0);
    builder.add_poly(&[v[0], v[1], v[4], v[5]]);
    builder.add_poly(&[v[1], v[2], v[3], v[4]]);

    let i0 = builder.add_vertex(5.0, 0.0, 0.0);
    let i1 = builder.add_vertex(6.0, 0.0, 0.0);
    let i2 = builder.add_vertex(6.0, 0.0, 1.0);
    let i3 = builder.add_vertex(5.0, 0.0, 1.0);
    builder.add_poly(&[i0, i1, i2, i3]);
    builder.build()
}

/// Grid of `width` x `height` unit cells; cell (x, z) is polygon
/// `z * width + x`.
pub fn create_grid_surface(width: u32, height: u32) -> Result<NavSurface> {
    create_weighted_grid_surface(width, height, |_, _| 1.0)
}

/// Grid surface whose per-cell traversal cost comes from `cost(x, z)`
pub fn create_weighted_grid_surface<F>(width: u32, height: u32, cost: F) -> Result<NavSurface>
where
    F: Fn(u32, u32) -> f32,
{
    let mut builder = NavSurfaceBuilder::new();

    for z in 0..=height {
        for x in 0..=width {
            builder.add_vertex(x as f32, 0.0, z as f32);
        }
    }

    let stride = width + 1;
    for z in 0..height {
        for x in 0..width {
            let base = z * stride + x;
            builder.add_poly_with_cost(&[base, base + 1, base + stride + 1, base + stride], cost(x, z));
        }
    }

    builder.build()
}

/// U-shaped corridor of seven unit cells around a blocked center.
///
/// Polygons are numbered along the U: down the left column from (0,2) to
/// (0,0), across the bottom to (2,0) and up the right column to (2,2).
/// Walking from the top of one arm to the other must wrap around the inner
/// corners (1,1) and (2,1).
pub fn create_u_shaped_surface() -> Result<NavSurface> {
    let mut builder = NavSurfaceBuilder::new();

    // 4x4 lattice of vertices, index = z * 4 + x
    for z in 0..4 {
        for x in 0..4 {
            builder.add_vertex(x as f32, 0.0, z as f32);
        }
    }

    for (x, z) in [(0, 2), (0, 1), (0, 0), (1, 0), (2, 0), (2, 1), (2, 2)] {
        let base = z * 4 + x;
        builder.add_poly(&[base, base + 1, base + 5, base + 4]);
    }

    builder.build()
}

/// The only corridor through [`create_u_shaped_surface`]
pub fn u_shaped_corridor() -> Vec<PolyRef> {
    (0..7).map(PolyRef::new).collect()
}

/// Adds a `cells` x 1 strip of vertices: the bottom row left to right, then
/// the top row right to left. `real_y` is computed from X.
fn add_strip_vertices<F>(builder: &mut NavSurfaceBuilder, cells: u32, real_y: F) -> Vec<u32>
where
    F: Fn(f32) -> f32,
{
    let bottom = (0..=cells).map(|x| (x as f32, 0.0));
    let top = (0..=cells).rev().map(|x| (x as f32, 1.0));

    bottom
        .chain(top)
        .map(|(x, z)| builder.add_vertex_with_elevation(x, 0.0, z, real_y(x)))
        .collect()
}
