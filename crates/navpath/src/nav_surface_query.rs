//! Navigation surface query implementation
//!
//! This module contains the NavSurfaceQuery structure, which runs the A*
//! corridor search over the polygon adjacency graph. The funnel-based
//! waypoint extraction lives in `straight_path.rs`.

use log::{debug, warn};
use navpath_common::dist_3d;

use super::node_pool::{NodeFlags, NodeIndex, NodePool, NodeQueue, NULL_NODE_IDX};
use super::status::{self, Status};
use super::{NavSurface, PathfinderConfig, PolyRef};

/// Navigation surface query structure
///
/// A query borrows the surface and owns the transient search state. It is
/// cheap to create; the facade builds a fresh one per request.
#[derive(Debug)]
pub struct NavSurfaceQuery<'a> {
    /// Reference to the navigation surface
    surface: &'a NavSurface,
    /// Node pool for A* search
    node_pool: NodePool,
    /// Open list for A* search
    open_list: NodeQueue,
    /// Squared XZ distance under which funnel points are equal
    pub(crate) portal_epsilon: f32,
}

impl<'a> NavSurfaceQuery<'a> {
    /// Creates a new query with the given search node budget
    pub fn new(surface: &'a NavSurface, max_nodes: usize) -> Self {
        Self {
            surface,
            node_pool: NodePool::new(max_nodes),
            open_list: NodeQueue::new(),
            portal_epsilon: crate::config::DEFAULT_PORTAL_EPSILON,
        }
    }

    /// Creates a new query using the limits of `config`.
    ///
    /// Without an explicit budget the pool holds one node per polygon, which
    /// a search can never exhaust.
    pub fn with_config(surface: &'a NavSurface, config: &PathfinderConfig) -> Self {
        let max_nodes = config.max_search_nodes.unwrap_or(surface.poly_count());
        let mut query = Self::new(surface, max_nodes);
        query.portal_epsilon = config.portal_epsilon;
        query
    }

    /// Gets a reference to the navigation surface
    pub fn surface(&self) -> &'a NavSurface {
        self.surface
    }

    /// Gets the node pool of the last search
    pub fn node_pool(&self) -> &NodePool {
        &self.node_pool
    }

    /// Finds the cheapest polygon corridor from `start_ref` to `end_ref`.
    ///
    /// Returns `None` when the goal is unreachable or the node budget runs
    /// out. See [`Self::try_find_polygon_corridor`] for the reason.
    pub fn find_polygon_corridor(
        &mut self,
        start_ref: PolyRef,
        end_ref: PolyRef,
        end_pos: &[f32; 3],
        tolerance_weight: f32,
    ) -> Option<Vec<PolyRef>> {
        match self.try_find_polygon_corridor(start_ref, end_ref, end_pos, tolerance_weight) {
            Ok(corridor) => Some(corridor),
            Err(status) => {
                debug!("No corridor from {} to {}: {}", start_ref, end_ref, status);
                None
            }
        }
    }

    /// Finds the cheapest polygon corridor, reporting why a search failed.
    ///
    /// `tolerance_weight` scales the straight-line heuristic from each
    /// polygon's center to `end_pos`.
    ///
    /// # Panics
    ///
    /// Panics if either polygon reference is not part of the surface.
    pub fn try_find_polygon_corridor(
        &mut self,
        start_ref: PolyRef,
        end_ref: PolyRef,
        end_pos: &[f32; 3],
        tolerance_weight: f32,
    ) -> status::Result<Vec<PolyRef>> {
        assert!(
            self.surface.is_valid_poly_ref(start_ref) && self.surface.is_valid_poly_ref(end_ref),
            "corridor search between {} and {} on a surface of {} polygons",
            start_ref,
            end_ref,
            self.surface.poly_count()
        );

        // Return early if start and end are the same
        if start_ref == end_ref {
            return Ok(vec![start_ref]);
        }

        self.node_pool.clear();
        self.open_list.clear();

        let start_idx = self.node_pool.get_node(start_ref).ok_or(Status::OutOfNodes)?;
        {
            let start_pos = self.surface.poly_center(start_ref);
            let start_h = Self::heuristic(&start_pos, end_pos, tolerance_weight);
            let start_node = self.node_pool.node_mut(start_idx);
            start_node.pos = start_pos;
            start_node.g = 0.0;
            start_node.h = start_h;
            start_node.f = start_h;
            start_node.flags.insert(NodeFlags::OPEN);
        }
        self.open_list.push(start_idx, self.node_pool.node(start_idx));

        let mut expanded = 0usize;
        while let Some(current_idx) = self.open_list.pop(&self.node_pool) {
            let current_poly = {
                let current = self.node_pool.node_mut(current_idx);
                current.flags.remove(NodeFlags::OPEN);
                current.flags.insert(NodeFlags::CLOSED);
                current.poly
            };
            expanded += 1;

            if current_poly == end_ref {
                let corridor = self.reconstruct_corridor(current_idx);
                debug!(
                    "Corridor {} -> {}: {} polygons, {} expanded, {} touched",
                    start_ref,
                    end_ref,
                    corridor.len(),
                    expanded,
                    self.node_pool.node_count()
                );
                return Ok(corridor);
            }

            self.expand_neighbors(current_idx, end_ref, end_pos, tolerance_weight)?;
        }

        debug!(
            "Open list exhausted after {} expansions without reaching {}",
            expanded, end_ref
        );
        Err(Status::PathNotFound)
    }

    /// Expands the neighbors of a node in the A* search
    fn expand_neighbors(
        &mut self,
        current_idx: NodeIndex,
        goal_ref: PolyRef,
        end_pos: &[f32; 3],
        tolerance_weight: f32,
    ) -> status::Result<()> {
        let surface = self.surface;
        let (current_poly, current_pos, current_g, parent_idx) = {
            let node = self.node_pool.node(current_idx);
            (node.poly, node.pos, node.g, node.parent)
        };
        let parent_poly = (parent_idx != NULL_NODE_IDX).then(|| self.node_pool.node(parent_idx).poly);

        for neighbor_ref in surface.neighbors(current_poly) {
            // Don't expand back to the parent
            if Some(neighbor_ref) == parent_poly {
                continue;
            }

            let Some(neighbor_idx) = self.node_pool.get_node(neighbor_ref) else {
                warn!(
                    "Search node budget of {} exhausted while expanding {}",
                    self.node_pool.max_nodes(),
                    current_poly
                );
                return Err(Status::OutOfNodes);
            };

            let (flags, neighbor_g, neighbor_h, neighbor_pos) = {
                let node = self.node_pool.node(neighbor_idx);
                (node.flags, node.g, node.h, node.pos)
            };

            if flags.contains(NodeFlags::CLOSED) {
                continue;
            }

            let is_new = !flags.contains(NodeFlags::OPEN);
            let neighbor_pos = if is_new {
                surface.poly_center(neighbor_ref)
            } else {
                neighbor_pos
            };

            let new_g = current_g + self.edge_cost(&current_pos, &neighbor_pos, neighbor_ref);
            if !is_new && new_g >= neighbor_g {
                continue;
            }

            let h = if !is_new {
                neighbor_h
            } else if neighbor_ref == goal_ref {
                0.0
            } else {
                Self::heuristic(&neighbor_pos, end_pos, tolerance_weight)
            };

            let node = self.node_pool.node_mut(neighbor_idx);
            node.pos = neighbor_pos;
            node.parent = current_idx;
            node.g = new_g;
            node.h = h;
            node.f = new_g + h;
            node.flags.insert(NodeFlags::OPEN);

            self.open_list.push(neighbor_idx, self.node_pool.node(neighbor_idx));
        }

        Ok(())
    }

    /// Walks parent links back from `end_idx` and returns the corridor in
    /// start-to-end order
    fn reconstruct_corridor(&self, end_idx: NodeIndex) -> Vec<PolyRef> {
        let mut corridor = Vec::new();
        let mut idx = end_idx;

        while idx != NULL_NODE_IDX {
            let node = self.node_pool.node(idx);
            corridor.push(node.poly);
            idx = node.parent;
        }

        corridor.reverse();
        corridor
    }

    /// Cost of moving between two representative points into `to_ref`
    fn edge_cost(&self, from_pos: &[f32; 3], to_pos: &[f32; 3], to_ref: PolyRef) -> f32 {
        dist_3d(from_pos, to_pos) * self.surface.poly(to_ref).cost
    }

    /// Straight-line distance to the goal, scaled by the tolerance weight
    fn heuristic(pos: &[f32; 3], end_pos: &[f32; 3], tolerance_weight: f32) -> f32 {
        dist_3d(pos, end_pos) * tolerance_weight
    }
}
