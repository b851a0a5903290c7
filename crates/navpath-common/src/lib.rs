//! Common utilities and data structures shared by the navpath crates

mod geometry;

pub use geometry::*;

/// Caller-facing 3D vector type
pub type Vec3 = glam::Vec3;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid navigation surface: {0}")]
    InvalidMesh(String),

    #[error("pathfinding failed: {0}")]
    Pathfinding(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("path service has been torn down")]
    Disposed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for navpath operations
pub type Result<T> = std::result::Result<T, Error>;
