//! Tuning parameters for corridor search and waypoint extraction

use navpath_common::{Error, Result};

/// Default heuristic weight, matching the tolerance the engine passes at its
/// path request call site
pub const DEFAULT_HEURISTIC_WEIGHT: f32 = 0.3;

/// Default squared XZ distance under which two points are treated as equal
pub const DEFAULT_PORTAL_EPSILON: f32 = 1.0e-6;

/// Configuration for a [`crate::PathService`]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PathfinderConfig {
    /// Scale applied to the straight-line distance heuristic.
    ///
    /// Lower values make the search closer to Dijkstra (more nodes, optimal
    /// corridors); values above the smallest polygon cost weight make it
    /// greedier and may return non-minimal corridors.
    pub heuristic_weight: f32,
    /// Maximum number of distinct polygons a single search may touch.
    ///
    /// `None` sizes the search to the whole surface, so a search only fails
    /// when the goal is unreachable.
    pub max_search_nodes: Option<usize>,
    /// Squared XZ distance under which funnel points are considered equal
    pub portal_epsilon: f32,
}

impl Default for PathfinderConfig {
    fn default() -> Self {
        Self {
            heuristic_weight: DEFAULT_HEURISTIC_WEIGHT,
            max_search_nodes: None,
            portal_epsilon: DEFAULT_PORTAL_EPSILON,
        }
    }
}

impl PathfinderConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the heuristic weight
    pub fn with_heuristic_weight(mut self, weight: f32) -> Self {
        self.heuristic_weight = weight;
        self
    }

    /// Caps the number of polygons a search may touch
    pub fn with_max_search_nodes(mut self, max_nodes: usize) -> Self {
        self.max_search_nodes = Some(max_nodes);
        self
    }

    /// Validates the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.heuristic_weight.is_finite() || self.heuristic_weight < 0.0 {
            return Err(Error::Config(format!(
                "heuristic weight must be finite and non-negative, got {}",
                self.heuristic_weight
            )));
        }

        if self.max_search_nodes == Some(0) {
            return Err(Error::Config(
                "search node budget must be at least 1".to_string(),
            ));
        }

        if !self.portal_epsilon.is_finite() || self.portal_epsilon < 0.0 {
            return Err(Error::Config(format!(
                "portal epsilon must be finite and non-negative, got {}",
                self.portal_epsilon
            )));
        }

        Ok(())
    }
}
