//! # terradat - Grid Terrain Tile Library
//!
//! Library for querying ground elevation from block-oriented terrain grid
//! tiles (`.DAT` files), the format used by terrain-following flight stacks.
//!
//! ## Features
//!
//! - **Deterministic addressing**: fixed-point degree arithmetic maps a
//!   coordinate to the same block every time
//! - **Block-oriented IO**: one 2048-byte read per lookup, no handle kept
//!   open between queries
//! - **Offline**: works against a local tile directory, no network involved
//! - **Bounded memory**: decoded blocks are cached behind a size limit
//!
//! ## Quick Start
//!
//! ```ignore
//! use terradat::{tile_filename, Coordinate, TerrainService};
//!
//! // Determine which file serves a coordinate
//! let name = tile_filename(Coordinate::new(47.3, 8.5));
//! assert_eq!(name, "N47E008.DAT");
//!
//! // Build a service over the tile directory and query heights
//! let service = TerrainService::builder("/data/terrain").build()?;
//! let altitudes = service.coordinate_heights(&[Coordinate::new(47.3, 8.5)])?;
//! println!("Elevation: {}m", altitudes[0]);
//! ```
//!
//! ## Tile Format
//!
//! One file covers a 1° × 1° cell and is named after its reference corner,
//! e.g. `N47E008.DAT`. The file is a flat array of 2048-byte grid blocks;
//! block `n` starts at byte `n * 2048`. Each block holds a 28×32 grid of
//! little-endian signed 16-bit heights in meters plus a small header
//! (south-west corner, CRC, version, spacing). Adjacent blocks overlap by
//! one 4×4 sub-grid per axis so any point is covered by a single block.
//!
//! Queries map a coordinate to its block through geodesic distances from
//! the tile corner, divided by the grid spacing; the number of block
//! columns per degree of longitude shrinks toward the poles.

pub mod block;
pub mod error;
pub mod filename;
pub mod geodesy;
pub mod index;
pub mod path;
pub mod service;
pub mod store;

// Re-export main types at crate root for convenience
pub use block::{
    GridBlock, BLOCK_BYTES, BLOCK_SIZE_X, BLOCK_SIZE_Y, BLOCK_SPACING_X, BLOCK_SPACING_Y,
};
pub use error::{BatchAbort, Result, TerrainError};
pub use filename::{filename_to_reference, tile_filename};
pub use geodesy::Coordinate;
pub use index::{BlockIndexer, BlockLocation, DEFAULT_GRID_SPACING};
pub use path::{FixedStepSampler, PathSample, PathSampler};
pub use service::{CacheStats, PathHeights, TerrainService, TerrainServiceBuilder};
pub use store::TileStore;
