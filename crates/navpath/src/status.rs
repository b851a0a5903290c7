//! Status codes for navpath search operations

use navpath_common::Error;

/// Result type for search operations that report a [`Status`] on failure
pub type Result<T> = std::result::Result<T, Status>;

/// Outcome of a corridor search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The open set emptied before the goal polygon was reached
    PathNotFound,
    /// The search touched more polygons than its node budget allows
    OutOfNodes,
}

impl std::error::Error for Status {}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Status::PathNotFound => "no path between start and goal polygons",
            Status::OutOfNodes => "search node budget exhausted",
        };
        f.write_str(text)
    }
}

impl From<Status> for Error {
    fn from(status: Status) -> Self {
        Error::Pathfinding(status.to_string())
    }
}
