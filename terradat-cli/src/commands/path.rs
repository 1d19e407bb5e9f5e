use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use terradat::{Coordinate, FixedStepSampler, TerrainServiceBuilder};

#[derive(Serialize)]
struct PathResponse {
    from: (f64, f64),
    to: (f64, f64),
    total_distance: f64,
    final_segment_distance: f64,
    altitudes: Vec<f64>,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    data_dir: Option<PathBuf>,
    cache_size: u64,
    grid_spacing: u32,
    from: (f64, f64),
    to: (f64, f64),
    step: Option<f64>,
    json: bool,
) -> Result<()> {
    let builder = match data_dir {
        Some(dir) => TerrainServiceBuilder::new(dir),
        None => TerrainServiceBuilder::from_env().context(
            "TERRADAT_DATA_DIR environment variable not set. Use --data-dir or set TERRADAT_DATA_DIR",
        )?,
    };
    let mut builder = builder.cache_size(cache_size).grid_spacing(grid_spacing);
    if let Some(step) = step {
        builder = builder.path_sampler(FixedStepSampler::new(step));
    }
    let service = builder.build().context("Failed to create terrain service")?;

    let heights = service
        .path_heights(
            Coordinate::new(from.0, from.1),
            Coordinate::new(to.0, to.1),
        )
        .map_err(|abort| anyhow::anyhow!(abort.error))?;

    if json {
        let response = PathResponse {
            from,
            to,
            total_distance: heights.total_distance,
            final_segment_distance: heights.final_segment_distance,
            altitudes: heights.altitudes,
        };
        println!("{}", serde_json::to_string(&response)?);
        return Ok(());
    }

    println!("Samples: {}", heights.altitudes.len());
    println!("Total distance: {:.1}m", heights.total_distance);
    println!(
        "Final segment: {:.1}m",
        heights.final_segment_distance
    );
    for (i, altitude) in heights.altitudes.iter().enumerate() {
        println!("{:>6}  {}m", i, altitude);
    }

    Ok(())
}
