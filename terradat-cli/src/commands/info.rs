use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use terradat::{filename_to_reference, Coordinate, TileStore, BLOCK_BYTES};

pub fn run(data_dir: Option<PathBuf>, tile: String) -> Result<()> {
    // Determine the tile path: a bare name resolves inside the data
    // directory, anything with a separator is taken as a path
    let tile_path = if tile.contains('/') || tile.contains('\\') {
        PathBuf::from(&tile)
    } else {
        let name = if tile.to_uppercase().ends_with(".DAT") {
            tile.clone()
        } else {
            format!("{}.DAT", tile)
        };
        get_data_dir(data_dir)?.join(name)
    };

    if !tile_path.exists() {
        bail!("Tile not found: {}", tile_path.display());
    }

    let filename = tile_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&tile)
        .to_string();

    let dir = tile_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let store = TileStore::new(&dir).context("Failed to open tile directory")?;

    // File metadata
    let metadata = std::fs::metadata(&tile_path)?;
    let file_size = metadata.len();
    let blocks = file_size / BLOCK_BYTES as u64;
    let trailing = file_size % BLOCK_BYTES as u64;

    // Header fields come from the first block
    let first = store
        .read_block(&filename, 0)
        .context("Failed to read first block")?;
    let corner = Coordinate::from_e7(first.lat, first.lon);

    println!("Tile: {}", filename);
    println!("Path: {}", tile_path.display());
    println!();
    if let Some((lat, lon)) = filename_to_reference(&filename) {
        println!("Reference: {}, {}", lat, lon);
    }
    println!("Blocks: {}", blocks);
    println!("File size: {}", format_size(file_size));
    if trailing != 0 {
        println!("Warning: {} trailing bytes are not a full block", trailing);
    }
    println!();
    println!("First block:");
    println!("  Version: {}", first.version);
    println!("  Spacing: {}m", first.spacing);
    println!("  SW corner: {:.7}, {:.7}", corner.lat, corner.lon);
    println!("  Grid index: ({}, {})", first.grid_idx_x, first.grid_idx_y);
    println!("  Bitmap: {:#018x}", first.bitmap);

    Ok(())
}

fn get_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    match data_dir {
        Some(dir) => Ok(dir),
        None => {
            let dir = std::env::var("TERRADAT_DATA_DIR").context(
                "TERRADAT_DATA_DIR environment variable not set. Use --data-dir or set TERRADAT_DATA_DIR",
            )?;
            Ok(PathBuf::from(dir))
        }
    }
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
