//! 2D geometry operations for navpath
//!
//! Searching and funnelling happen on the projected surface, so every helper
//! here works on the XZ plane (Y-up coordinate system) and ignores the Y
//! component of its inputs.

/// Calculate twice the signed area of a 2D triangle on the XZ plane.
///
/// The sign indicates on which side of the ray `a -> b` the point `c` lies:
/// - Negative: `c` is left of the ray
/// - Positive: `c` is right of the ray
/// - Zero: degenerate (collinear points)
#[inline]
pub fn tri_area_2d(a: &[f32; 3], b: &[f32; 3], c: &[f32; 3]) -> f32 {
    let abx = b[0] - a[0];
    let abz = b[2] - a[2];
    let acx = c[0] - a[0];
    let acz = c[2] - a[2];
    acx * abz - abx * acz
}

/// Check if point c is left of the line from a to b (on XZ plane).
#[inline]
pub fn left(a: &[f32; 3], b: &[f32; 3], c: &[f32; 3]) -> bool {
    tri_area_2d(a, b, c) < 0.0
}

/// Calculate squared distance between two points on the XZ plane.
#[inline]
pub fn dist_sqr_2d(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = b[0] - a[0];
    let dz = b[2] - a[2];
    dx * dx + dz * dz
}

/// Checks if two positions are equal on the XZ plane within `eps_sqr`.
#[inline]
pub fn v_equal_2d(a: &[f32; 3], b: &[f32; 3], eps_sqr: f32) -> bool {
    dist_sqr_2d(a, b) < eps_sqr
}

/// Full 3D distance between two points.
#[inline]
pub fn dist_3d(a: &[f32; 3], b: &[f32; 3]) -> f32 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Squared XZ distance from `p` to the segment `a..b`, plus the parameter `t`
/// of the closest point along the segment.
pub fn dist_point_segment_sqr_2d(p: &[f32; 3], a: &[f32; 3], b: &[f32; 3]) -> (f32, f32) {
    let dx = b[0] - a[0];
    let dz = b[2] - a[2];
    let px = p[0] - a[0];
    let pz = p[2] - a[2];

    let d = dx * dx + dz * dz;
    let t = if d > f32::EPSILON {
        ((px * dx + pz * dz) / d).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let ex = a[0] + t * dx - p[0];
    let ez = a[2] + t * dz - p[2];
    (ex * ex + ez * ez, t)
}

/// Linear interpolation between two points.
#[inline]
pub fn lerp_3d(a: &[f32; 3], b: &[f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Twice the signed area of a polygon on the XZ plane, using the same sign
/// convention as [`tri_area_2d`].
pub fn poly_area_2d(verts: &[[f32; 3]]) -> f32 {
    if verts.len() < 3 {
        return 0.0;
    }
    let a = &verts[0];
    verts
        .windows(2)
        .skip(1)
        .map(|w| tri_area_2d(a, &w[0], &w[1]))
        .sum()
}

/// Determines if the point lies inside (or within `eps` of the boundary of)
/// a convex polygon on the XZ plane. Either winding is accepted.
pub fn point_in_convex_poly_2d(p: &[f32; 3], verts: &[[f32; 3]], eps: f32) -> bool {
    let n = verts.len();
    if n < 3 {
        return false;
    }

    let winding = if poly_area_2d(verts) < 0.0 { -1.0 } else { 1.0 };
    let eps_sqr = eps * eps;

    for i in 0..n {
        let a = &verts[i];
        let b = &verts[(i + 1) % n];
        let side = tri_area_2d(a, b, p) * winding;
        if side < 0.0 {
            // Outside this edge; still accept points hugging the edge.
            let (d, _) = dist_point_segment_sqr_2d(p, a, b);
            if d > eps_sqr {
                return false;
            }
        }
    }

    true
}

/// Barycentric weights of `p` with respect to triangle `a, b, c` on the XZ
/// plane. Returns `None` for degenerate triangles.
pub fn barycentric_2d(
    p: &[f32; 3],
    a: &[f32; 3],
    b: &[f32; 3],
    c: &[f32; 3],
) -> Option<(f32, f32, f32)> {
    let v0x = b[0] - a[0];
    let v0z = b[2] - a[2];
    let v1x = c[0] - a[0];
    let v1z = c[2] - a[2];
    let v2x = p[0] - a[0];
    let v2z = p[2] - a[2];

    let denom = v0x * v1z - v1x * v0z;
    if denom.abs() < f32::EPSILON {
        return None;
    }

    let v = (v2x * v1z - v1x * v2z) / denom;
    let w = (v0x * v2z - v2x * v0z) / denom;
    Some((1.0 - v - w, v, w))
}
