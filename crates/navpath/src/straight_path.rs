//! Funnel (string pulling) over a polygon corridor

use log::trace;
use navpath_common::{dist_point_segment_sqr_2d, tri_area_2d, v_equal_2d};

use super::nav_surface_query::NavSurfaceQuery;
use super::PolyRef;

/// Point of a straight path, together with the polygon it lies on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StraightPathPoint {
    /// Position in the flattened search space
    pub pos: [f32; 3],
    /// Polygon used to sample the true elevation of the point
    pub poly: PolyRef,
}

/// Squared distance below which the start point counts as lying on the
/// first portal
const START_ON_PORTAL_EPS_SQR: f32 = 0.001 * 0.001;

impl NavSurfaceQuery<'_> {
    /// Pulls a corridor taut and returns the waypoints with their true
    /// elevation restored.
    ///
    /// The first point is `start_pos` and the last is `end_pos` (in XZ),
    /// and every point in between is a portal corner where the path turns.
    pub fn extract_waypoints(
        &self,
        start_pos: &[f32; 3],
        end_pos: &[f32; 3],
        corridor: &[PolyRef],
    ) -> Vec<[f32; 3]> {
        let surface = self.surface();
        self.find_straight_path(start_pos, end_pos, corridor)
            .into_iter()
            .map(|point| {
                let y = surface.real_height_at(point.poly, &point.pos);
                [point.pos[0], y, point.pos[2]]
            })
            .collect()
    }

    /// Runs the funnel algorithm over `corridor`.
    ///
    /// Points stay in the flattened search space. Consecutive points closer
    /// than the portal epsilon are merged.
    ///
    /// # Panics
    ///
    /// Panics if the corridor is empty or two consecutive polygons are not
    /// adjacent.
    pub fn find_straight_path(
        &self,
        start_pos: &[f32; 3],
        end_pos: &[f32; 3],
        corridor: &[PolyRef],
    ) -> Vec<StraightPathPoint> {
        assert!(!corridor.is_empty(), "straight path needs a non-empty corridor");

        let surface = self.surface();
        let eps = self.portal_epsilon;
        let last = corridor.len() - 1;

        let mut path = Vec::with_capacity(corridor.len() + 1);
        append_point(&mut path, *start_pos, corridor[0], eps);

        if corridor.len() > 1 {
            let mut apex = *start_pos;
            let mut left = apex;
            let mut right = apex;
            let mut left_index = 0;
            let mut right_index = 0;
            let mut apex_poly = corridor[0];
            let mut left_poly = apex_poly;
            let mut right_poly = apex_poly;

            let mut i = 0;
            while i < corridor.len() {
                let (portal_left, portal_right, portal_poly) = if i < last {
                    let (l, r) = surface
                        .portal_points(corridor[i], corridor[i + 1])
                        .unwrap_or_else(|| {
                            panic!(
                                "corridor polygons {} and {} are not adjacent",
                                corridor[i],
                                corridor[i + 1]
                            )
                        });
                    (l, r, corridor[i + 1])
                } else {
                    (*end_pos, *end_pos, corridor[last])
                };

                if i == 0 {
                    // Start point sits on the first portal
                    let (dist_sqr, _) = dist_point_segment_sqr_2d(&apex, &portal_left, &portal_right);
                    if dist_sqr < START_ON_PORTAL_EPS_SQR {
                        i += 1;
                        continue;
                    }
                }

                // Right vertex
                if tri_area_2d(&apex, &right, &portal_right) <= 0.0 {
                    if v_equal_2d(&apex, &right, eps) || tri_area_2d(&apex, &left, &portal_right) > 0.0 {
                        right = portal_right;
                        right_poly = portal_poly;
                        right_index = i;
                    } else {
                        // Right crossed over left: the left corner is a waypoint
                        trace!("Funnel apex moves to left corner {:?} at portal {}", left, left_index);
                        append_point(&mut path, left, left_poly, eps);

                        apex = left;
                        apex_poly = left_poly;
                        let apex_index = left_index;
                        left = apex;
                        right = apex;
                        left_poly = apex_poly;
                        right_poly = apex_poly;
                        left_index = apex_index;
                        right_index = apex_index;

                        i = apex_index + 1;
                        continue;
                    }
                }

                // Left vertex
                if tri_area_2d(&apex, &left, &portal_left) >= 0.0 {
                    if v_equal_2d(&apex, &left, eps) || tri_area_2d(&apex, &right, &portal_left) < 0.0 {
                        left = portal_left;
                        left_poly = portal_poly;
                        left_index = i;
                    } else {
                        trace!("Funnel apex moves to right corner {:?} at portal {}", right, right_index);
                        append_point(&mut path, right, right_poly, eps);

                        apex = right;
                        apex_poly = right_poly;
                        let apex_index = right_index;
                        left = apex;
                        right = apex;
                        left_poly = apex_poly;
                        right_poly = apex_poly;
                        left_index = apex_index;
                        right_index = apex_index;

                        i = apex_index + 1;
                        continue;
                    }
                }

                i += 1;
            }
        }

        // The end point replaces a coincident corner instead of being dropped,
        // unless that would overwrite the start.
        let n = path.len();
        if n > 1 && v_equal_2d(&path[n - 1].pos, end_pos, eps) {
            path[n - 1] = StraightPathPoint {
                pos: *end_pos,
                poly: corridor[last],
            };
        } else {
            append_point(&mut path, *end_pos, corridor[last], eps);
        }

        path
    }
}

/// Appends a point unless it coincides with the previous one
fn append_point(path: &mut Vec<StraightPathPoint>, pos: [f32; 3], poly: PolyRef, eps: f32) {
    if let Some(prev) = path.last() {
        if v_equal_2d(&prev.pos, &pos, eps) {
            return;
        }
    }
    path.push(StraightPathPoint { pos, poly });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_mesh_helpers::*;
    use navpath_common::Result;

    fn corridor(ids: &[u32]) -> Vec<PolyRef> {
        ids.iter().copied().map(PolyRef::new).collect()
    }

    fn assert_near(actual: [f32; 3], expected: [f32; 3]) {
        for k in 0..3 {
            assert!(
                (actual[k] - expected[k]).abs() < 1e-4,
                "expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_single_polygon() -> Result<()> {
        let surface = create_two_square_surface()?;
        let query = NavSurfaceQuery::new(&surface, 16);

        let path = query.extract_waypoints(&[0.2, 0.0, 0.2], &[0.8, 0.0, 0.7], &corridor(&[0]));
        assert_eq!(path, vec![[0.2, 0.0, 0.2], [0.8, 0.0, 0.7]]);
        Ok(())
    }

    #[test]
    fn test_coincident_start_and_end() -> Result<()> {
        let surface = create_two_square_surface()?;
        let query = NavSurfaceQuery::new(&surface, 16);

        let path = query.extract_waypoints(&[0.5, 0.0, 0.5], &[0.5, 0.0, 0.5], &corridor(&[0]));
        assert_eq!(path, vec![[0.5, 0.0, 0.5]]);
        Ok(())
    }

    #[test]
    fn test_visible_end_gives_direct_line() -> Result<()> {
        let surface = create_two_square_surface()?;
        let query = NavSurfaceQuery::new(&surface, 16);

        let path = query.extract_waypoints(&[0.5, 0.0, 0.5], &[1.5, 0.0, 0.5], &corridor(&[0, 1]));
        assert_eq!(path.len(), 2);
        assert_near(path[0], [0.5, 0.0, 0.5]);
        assert_near(path[1], [1.5, 0.0, 0.5]);
        Ok(())
    }

    #[test]
    fn test_long_straight_corridor() -> Result<()> {
        let surface = create_grid_surface(4, 1)?;
        let query = NavSurfaceQuery::new(&surface, 16);

        let path = query.extract_waypoints(&[0.5, 0.0, 0.5], &[3.5, 0.0, 0.5], &corridor(&[0, 1, 2, 3]));
        assert_eq!(path.len(), 2);
        assert_near(path[1], [3.5, 0.0, 0.5]);
        Ok(())
    }

    #[test]
    fn test_u_turn_wraps_inner_corners() -> Result<()> {
        let surface = create_u_shaped_surface()?;
        let query = NavSurfaceQuery::new(&surface, 16);

        let path = query.extract_waypoints(&[0.5, 0.0, 2.5], &[2.5, 0.0, 2.5], &u_shaped_corridor());
        assert_eq!(path.len(), 4, "path {:?}", path);
        assert_near(path[0], [0.5, 0.0, 2.5]);
        assert_near(path[1], [1.0, 0.0, 1.0]);
        assert_near(path[2], [2.0, 0.0, 1.0]);
        assert_near(path[3], [2.5, 0.0, 2.5]);
        Ok(())
    }

    #[test]
    fn test_start_on_first_portal() -> Result<()> {
        let surface = create_grid_surface(3, 1)?;
        let query = NavSurfaceQuery::new(&surface, 16);

        let path = query.find_straight_path(&[1.0, 0.0, 0.5], &[2.5, 0.0, 0.5], &corridor(&[0, 1, 2]));
        assert_eq!(path.len(), 2);
        assert_eq!(path[0].poly, PolyRef::new(0));
        assert_eq!(path[1].poly, PolyRef::new(2));
        Ok(())
    }

    #[test]
    fn test_points_carry_their_polygon() -> Result<()> {
        let surface = create_u_shaped_surface()?;
        let query = NavSurfaceQuery::new(&surface, 16);
        let corridor = u_shaped_corridor();

        let path = query.find_straight_path(&[0.5, 0.0, 2.5], &[2.5, 0.0, 2.5], &corridor);
        for point in &path {
            assert!(corridor.contains(&point.poly));
            assert!(surface.contains_point_2d(point.poly, &point.pos));
        }
        Ok(())
    }

    #[test]
    fn test_elevation_follows_ramp() -> Result<()> {
        let surface = create_ramp_surface()?;
        let query = NavSurfaceQuery::new(&surface, 16);

        let path = query.extract_waypoints(&[0.25, 0.0, 0.5], &[1.75, 0.0, 0.5], &corridor(&[0, 1]));
        assert_eq!(path.len(), 2);
        assert_near(path[0], [0.25, 0.25, 0.5]);
        assert_near(path[1], [1.75, 1.75, 0.5]);
        Ok(())
    }

    #[test]
    #[should_panic(expected = "not adjacent")]
    fn test_non_adjacent_corridor_panics() {
        let surface = create_disconnected_surface().unwrap();
        let query = NavSurfaceQuery::new(&surface, 16);
        query.find_straight_path(&[0.5, 0.0, 0.5], &[5.5, 0.0, 0.5], &corridor(&[0, 2]));
    }
}
