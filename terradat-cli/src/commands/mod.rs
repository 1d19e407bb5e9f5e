pub mod batch;
pub mod info;
pub mod list;
pub mod path;
pub mod query;

use anyhow::{Context, Result};
use std::path::PathBuf;
use terradat::{TerrainService, TerrainServiceBuilder};

/// Build the terrain service from CLI options, falling back to the
/// environment when no data directory was given.
pub fn build_service(
    data_dir: Option<PathBuf>,
    cache_size: u64,
    grid_spacing: u32,
) -> Result<TerrainService> {
    let builder = match data_dir {
        Some(dir) => TerrainServiceBuilder::new(dir),
        None => TerrainServiceBuilder::from_env().context(
            "TERRADAT_DATA_DIR environment variable not set. Use --data-dir or set TERRADAT_DATA_DIR",
        )?,
    };

    builder
        .cache_size(cache_size)
        .grid_spacing(grid_spacing)
        .build()
        .context("Failed to create terrain service")
}
