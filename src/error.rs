//! Error types for the aggregation model.
//!
//! The walk itself cannot fail. Errors come from rejecting settings that
//! could never finish, and from the file formats around a finished run.

use std::path::PathBuf;

/// Settings that would make a run impossible to complete.
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    /// The grid has no interior to grow into.
    #[error("grid must be at least 3x3, got {width}x{height}")]
    GridTooSmall {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// More particles were requested than cells a particle could ever stick to.
    #[error("target of {target} particles exceeds the {capacity} cells reachable with {adjacency} adjacency")]
    TargetExceedsCapacity {
        /// Requested aggregate size.
        target: usize,
        /// Cells available for sticking.
        capacity: usize,
        /// Adjacency policy name.
        adjacency: String,
    },

    /// A result cell lies outside the grid it claims to belong to.
    #[error("cell ({x}, {y}) lies outside {width}x{height} grid")]
    CellOutOfBounds {
        /// Cell column.
        x: usize,
        /// Cell row.
        y: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
}

/// Failures while writing or reading a result set.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The file could not be opened, written or read.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// A coordinate file line did not hold two integers.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with it.
        message: String,
    },

    /// The coordinates do not form a valid result set.
    #[error(transparent)]
    Invalid(#[from] SimulationError),

    /// The PNG encoder rejected the image.
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Failures loading or saving configuration and presets.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}
