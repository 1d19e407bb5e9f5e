//! Basic example demonstrating terradat library usage.
//!
//! Run with: cargo run --example basic -- /path/to/tile/files

use std::env;

use terradat::{Coordinate, TerrainError, TerrainService};

fn main() -> Result<(), TerrainError> {
    // Get data directory from command line
    let data_dir = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --example basic -- /path/to/tile/files");
        std::process::exit(1);
    });

    let service = TerrainService::builder(&data_dir).cache_size(32).build()?;

    // Query some famous locations
    let locations = [
        ("Zurich, Switzerland", Coordinate::new(47.3769, 8.5417)),
        ("Mount Fuji, Japan", Coordinate::new(35.3606, 138.7274)),
        ("Cape Town, South Africa", Coordinate::new(-33.9249, 18.4241)),
    ];

    println!("Elevation queries:");
    println!("{:-<50}", "");

    for (name, coordinate) in &locations {
        match service.coordinate_heights(&[*coordinate]) {
            Ok(altitudes) => println!("{}: {}m", name, altitudes[0]),
            Err(abort) => println!("{}: {}", name, abort.error),
        }
    }

    // Show block cache statistics
    let stats = service.cache_stats();
    println!("\nCache statistics:");
    println!("  Cached blocks: {}", stats.entry_count);
    println!("  Hits: {}", stats.hit_count);
    println!("  Misses: {}", stats.miss_count);
    println!("  Hit rate: {:.1}%", stats.hit_rate() * 100.0);

    Ok(())
}
