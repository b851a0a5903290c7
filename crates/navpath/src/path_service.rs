//! Path service facade
//!
//! [`PathService`] is the single entry point game code talks to: it resolves
//! region identifiers to polygons, runs the corridor search and pulls the
//! corridor into waypoints, converting between the caller's [`Vec3`] and the
//! internal `[f32; 3]` representation.

use log::debug;
use navpath_common::{Error, Result, Vec3};

use super::nav_surface_query::NavSurfaceQuery;
use super::{NavSurface, PathfinderConfig, PolyRef, RegionIndexMap};

/// Pathfinding session over a borrowed navigation surface
///
/// The surface is owned by whatever asset system loaded it; the service only
/// holds a shared reference, so any number of services (and threads) may
/// query the same surface. Each query allocates its own search state.
#[derive(Debug, Clone)]
pub struct PathService<'a> {
    surface: Option<&'a NavSurface>,
    region_map: Option<RegionIndexMap>,
    config: PathfinderConfig,
}

impl<'a> PathService<'a> {
    /// Creates a service with the default configuration.
    ///
    /// Fails if the region map points at polygons the surface does not have.
    pub fn new(surface: &'a NavSurface, region_map: RegionIndexMap) -> Result<Self> {
        Self::with_config(surface, region_map, PathfinderConfig::default())
    }

    /// Creates a service with a custom configuration
    pub fn with_config(
        surface: &'a NavSurface,
        region_map: RegionIndexMap,
        config: PathfinderConfig,
    ) -> Result<Self> {
        config.validate()?;
        region_map.validate_against(surface)?;

        debug!(
            "Path service ready: {} polygons, {} regions",
            surface.poly_count(),
            region_map.len()
        );

        Ok(Self {
            surface: Some(surface),
            region_map: Some(region_map),
            config,
        })
    }

    /// Computes a path between two points in the given regions.
    ///
    /// Returns `Ok(None)` when either region has no polygon or no route
    /// exists. The first waypoint is `start` and the last is `end` (in XZ),
    /// with heights taken from the true surface elevation.
    ///
    /// Returns [`Error::Disposed`] after [`Self::teardown`].
    pub fn compute_path(
        &self,
        start: Vec3,
        end: Vec3,
        start_region: i32,
        end_region: i32,
    ) -> Result<Option<Vec<Vec3>>> {
        let (surface, region_map) = self.session()?;

        let Some(start_ref) = region_map.resolve(start_region) else {
            debug!("Start region {} is not mapped to a polygon", start_region);
            return Ok(None);
        };
        let Some(end_ref) = region_map.resolve(end_region) else {
            debug!("End region {} is not mapped to a polygon", end_region);
            return Ok(None);
        };

        Ok(self.compute_between(surface, start, end, start_ref, end_ref))
    }

    /// Computes a path, locating the start and end polygons by the XZ
    /// position of the points instead of region identifiers.
    ///
    /// Returns `Ok(None)` when either point lies off the surface.
    pub fn compute_path_by_position(&self, start: Vec3, end: Vec3) -> Result<Option<Vec<Vec3>>> {
        let (surface, _) = self.session()?;

        let Some(start_ref) = surface.find_poly_containing(&to_nav_point(start)) else {
            debug!("Start {} is off the navigation surface", start);
            return Ok(None);
        };
        let Some(end_ref) = surface.find_poly_containing(&to_nav_point(end)) else {
            debug!("End {} is off the navigation surface", end);
            return Ok(None);
        };

        Ok(self.compute_between(surface, start, end, start_ref, end_ref))
    }

    /// Releases the surface and region map. Calling it again is a no-op.
    pub fn teardown(&mut self) {
        if self.surface.take().is_some() {
            debug!("Path service torn down");
        }
        self.region_map = None;
    }

    pub fn is_torn_down(&self) -> bool {
        self.surface.is_none()
    }

    pub fn config(&self) -> &PathfinderConfig {
        &self.config
    }

    fn session(&self) -> Result<(&'a NavSurface, &RegionIndexMap)> {
        match (self.surface, self.region_map.as_ref()) {
            (Some(surface), Some(region_map)) => Ok((surface, region_map)),
            _ => Err(Error::Disposed),
        }
    }

    fn compute_between(
        &self,
        surface: &NavSurface,
        start: Vec3,
        end: Vec3,
        start_ref: PolyRef,
        end_ref: PolyRef,
    ) -> Option<Vec<Vec3>> {
        let start_pos = to_nav_point(start);
        let end_pos = to_nav_point(end);

        let mut query = NavSurfaceQuery::with_config(surface, &self.config);
        let corridor =
            query.find_polygon_corridor(start_ref, end_ref, &end_pos, self.config.heuristic_weight)?;
        let waypoints = query.extract_waypoints(&start_pos, &end_pos, &corridor);

        debug!(
            "Path {} -> {}: {} polygons, {} waypoints",
            start_ref,
            end_ref,
            corridor.len(),
            waypoints.len()
        );

        Some(waypoints.into_iter().map(Vec3::from_array).collect())
    }
}

#[inline]
fn to_nav_point(v: Vec3) -> [f32; 3] {
    v.to_array()
}
