//! Error types for the terradat library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when working with terrain grid data.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// The tile file for the queried degree cell could not be opened.
    #[error("terrain tile not found: {path}")]
    MissingTile { path: PathBuf },

    /// Seeking to a block or reading the full 2048-byte record failed.
    #[error("truncated read in {path} at block {block}")]
    TruncatedRead { path: PathBuf, block: u32 },

    /// The configured data directory is missing or not a directory.
    #[error("data directory missing or unreadable: {path}")]
    InvalidDataDir { path: PathBuf },

    /// The requested query kind is not served by the grid tile store.
    #[error("{operation} queries are not supported by the grid tile store")]
    Unsupported { operation: &'static str },

    /// A height index fell outside the 28x32 block grid.
    #[error("height index out of range: ({x}, {y})")]
    GridIndexOutOfRange { x: usize, y: usize },
}

/// Result type alias using [`TerrainError`].
pub type Result<T> = std::result::Result<T, TerrainError>;

/// A batch query that stopped at its first failing coordinate.
///
/// Batches abort on the first error; the altitudes resolved before the
/// failing coordinate are preserved in input order in `partial`.
#[derive(Error, Debug)]
#[error("batch aborted after {} altitudes: {error}", partial.len())]
pub struct BatchAbort {
    /// Altitudes accumulated before the failure, in input order.
    pub partial: Vec<f64>,
    /// The failure that stopped the batch.
    #[source]
    pub error: TerrainError,
}
