//! Edge case tests for corridor search and waypoint extraction

use crate::test_mesh_helpers::*;
use crate::{NavSurface, NavSurfaceBuilder, NavSurfaceQuery, PathService, PathfinderConfig, PolyRef, RegionIndexMap};
use navpath_common::{Result, Vec3};

fn assert_point_near(actual: [f32; 3], expected: [f32; 3]) {
    let d = (0..3).map(|k| (actual[k] - expected[k]).abs()).fold(0.0, f32::max);
    assert!(d < 1e-4, "expected {:?}, got {:?}", expected, actual);
}

/// Three unit cells forming an L: (0,0), (1,0) and (1,1)
fn create_l_shaped_surface() -> Result<NavSurface> {
    let mut builder = NavSurfaceBuilder::new();
    for z in 0..3 {
        for x in 0..3 {
            builder.add_vertex(x as f32, 0.0, z as f32);
        }
    }
    builder.add_poly(&[0, 1, 4, 3]);
    builder.add_poly(&[1, 2, 5, 4]);
    builder.add_poly(&[4, 5, 8, 7]);
    builder.build()
}

/// Unit square split along its diagonal into two triangles
fn create_split_square_surface() -> Result<NavSurface> {
    let mut builder = NavSurfaceBuilder::new();
    let v0 = builder.add_vertex(0.0, 0.0, 0.0);
    let v1 = builder.add_vertex(1.0, 0.0, 0.0);
    let v2 = builder.add_vertex(1.0, 0.0, 1.0);
    let v3 = builder.add_vertex(0.0, 0.0, 1.0);
    builder.add_poly(&[v0, v1, v2]);
    builder.add_poly(&[v0, v2, v3]);
    builder.build()
}

#[test]
fn test_l_turn_commits_inner_corner() -> Result<()> {
    let surface = create_l_shaped_surface()?;
    let mut query = NavSurfaceQuery::new(&surface, 16);

    let start = [0.5, 0.0, 0.5];
    let end = [1.2, 0.0, 1.8];
    let corridor = query
        .find_polygon_corridor(PolyRef::new(0), PolyRef::new(2), &end, 0.3)
        .unwrap();
    assert_eq!(corridor, vec![PolyRef::new(0), PolyRef::new(1), PolyRef::new(2)]);

    let path = query.extract_waypoints(&start, &end, &corridor);
    assert_eq!(path.len(), 3, "path {:?}", path);
    assert_point_near(path[0], start);
    assert_point_near(path[1], [1.0, 0.0, 1.0]);
    assert_point_near(path[2], end);
    Ok(())
}

#[test]
fn test_triangle_portal_on_diagonal() -> Result<()> {
    let surface = create_split_square_surface()?;
    assert_eq!(surface.find_poly_containing(&[0.8, 0.0, 0.2]), Some(PolyRef::new(0)));
    assert_eq!(surface.find_poly_containing(&[0.2, 0.0, 0.8]), Some(PolyRef::new(1)));

    let service = PathService::new(&surface, RegionIndexMap::new())?;
    let path = service
        .compute_path_by_position(Vec3::new(0.8, 0.0, 0.2), Vec3::new(0.2, 0.0, 0.8))?
        .unwrap();
    assert_eq!(path.len(), 2);
    Ok(())
}

#[test]
fn test_start_on_shared_edge() -> Result<()> {
    let surface = create_two_square_surface()?;
    let service = PathService::new(&surface, RegionIndexMap::from_pairs([(10, 0), (20, 1)]))?;

    let path = service
        .compute_path(Vec3::new(1.0, 0.0, 0.5), Vec3::new(1.5, 0.0, 0.5), 10, 20)?
        .unwrap();
    assert_eq!(path.len(), 2);
    assert_point_near(path[0].to_array(), [1.0, 0.0, 0.5]);
    assert_point_near(path[1].to_array(), [1.5, 0.0, 0.5]);
    Ok(())
}

#[test]
fn test_expensive_cell_forces_detour() -> Result<()> {
    let surface = create_weighted_grid_surface(3, 3, |x, z| if (x, z) == (1, 1) { 50.0 } else { 1.0 })?;
    let regions = RegionIndexMap::from_pairs([(1, 3), (2, 5)]);
    let service = PathService::new(&surface, regions)?;

    let start = Vec3::new(0.5, 0.0, 1.5);
    let end = Vec3::new(2.5, 0.0, 1.5);
    let path = service.compute_path(start, end, 1, 2)?.unwrap();

    // Going around the center means turning at two corners of it
    assert_eq!(path.len(), 4, "path {:?}", path);
    assert!((path[1].x - 1.0).abs() < 1e-4);
    assert!((path[2].x - 2.0).abs() < 1e-4);
    assert!((path[1].z - path[2].z).abs() < 1e-4);
    assert!((path[1].z - 1.0).abs() < 1e-4 || (path[1].z - 2.0).abs() < 1e-4);

    // With uniform costs the straight line through the center wins
    let flat = create_grid_surface(3, 3)?;
    let service = PathService::new(&flat, RegionIndexMap::from_pairs([(1, 3), (2, 5)]))?;
    assert_eq!(service.compute_path(start, end, 1, 2)?.unwrap().len(), 2);
    Ok(())
}

#[test]
fn test_heuristic_weight_extremes_still_reach_goal() -> Result<()> {
    let surface = create_grid_surface(10, 10)?;
    let regions = RegionIndexMap::from_pairs([(1, 0), (2, 99)]);
    let start = Vec3::new(0.5, 0.0, 0.5);
    let end = Vec3::new(9.5, 0.0, 9.5);

    for weight in [0.0, 0.3, 1.0, 25.0] {
        let config = PathfinderConfig::new().with_heuristic_weight(weight);
        let service = PathService::with_config(&surface, regions.clone(), config)?;
        let path = service.compute_path(start, end, 1, 2)?;
        let path = path.unwrap_or_else(|| panic!("no path with weight {}", weight));
        assert_point_near(path[0].to_array(), start.to_array());
        assert_point_near(path[path.len() - 1].to_array(), end.to_array());
    }
    Ok(())
}

#[test]
fn test_waypoints_have_no_consecutive_duplicates() -> Result<()> {
    let surface = create_u_shaped_surface()?;
    let query = NavSurfaceQuery::new(&surface, 16);

    // End exactly on an inner corner
    let path = query.extract_waypoints(&[0.5, 0.0, 2.5], &[2.0, 0.0, 1.0], &u_shaped_corridor()[..5]);
    for pair in path.windows(2) {
        assert!(pair[0] != pair[1], "duplicate waypoint in {:?}", path);
    }
    assert_point_near(path[path.len() - 1], [2.0, 0.0, 1.0]);
    Ok(())
}

#[test]
fn test_ramp_heights_along_long_path() -> Result<()> {
    let surface = create_ramp_surface()?;
    let service = PathService::new(&surface, RegionIndexMap::from_pairs([(10, 0), (20, 1)]))?;

    let path = service
        .compute_path(Vec3::new(0.1, 0.0, 0.9), Vec3::new(1.9, 0.0, 0.1), 10, 20)?
        .unwrap();
    for point in &path {
        // real_y = x everywhere on the ramp
        assert!((point.y - point.x).abs() < 1e-4, "{}", point);
    }
    Ok(())
}
