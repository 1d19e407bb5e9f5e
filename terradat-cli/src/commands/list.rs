use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use terradat::{filename_to_reference, BLOCK_BYTES};

pub fn run(data_dir: Option<PathBuf>) -> Result<()> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => {
            let dir = std::env::var("TERRADAT_DATA_DIR").context(
                "TERRADAT_DATA_DIR environment variable not set. Use --data-dir or set TERRADAT_DATA_DIR",
            )?;
            PathBuf::from(dir)
        }
    };

    if !dir.exists() {
        anyhow::bail!("Data directory does not exist: {}", dir.display());
    }

    // Collect .DAT files
    let mut tiles: Vec<_> = fs::read_dir(&dir)
        .context("Failed to read data directory")?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .map(|e| e.eq_ignore_ascii_case("DAT"))
                .unwrap_or(false)
        })
        .collect();

    if tiles.is_empty() {
        println!("No .DAT files found in: {}", dir.display());
        return Ok(());
    }

    // Sort by filename
    tiles.sort_by_key(|e| e.file_name());

    let mut total_size: u64 = 0;
    let mut partial_count = 0;

    println!("{:<12} {:>8} {:>24}", "TILE", "BLOCKS", "COVERAGE");
    println!("{}", "-".repeat(48));

    for entry in &tiles {
        let filename = entry.file_name();
        let filename_str = filename.to_string_lossy();
        let path = entry.path();

        let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        total_size += size;

        let blocks = size / BLOCK_BYTES as u64;
        if size % BLOCK_BYTES as u64 != 0 {
            partial_count += 1;
        }

        // Parse coverage from filename
        let coverage = if let Some((lat, lon)) = filename_to_reference(&filename_str) {
            let lat_prefix = if lat >= 0 { "N" } else { "S" };
            let lon_prefix = if lon >= 0 { "E" } else { "W" };
            format!(
                "{}{:02} to {}{:02}, {}{:03} to {}{:03}",
                lat_prefix,
                lat.abs(),
                lat_prefix,
                (lat + 1).abs(),
                lon_prefix,
                lon.abs(),
                lon_prefix,
                (lon + 1).abs()
            )
        } else {
            "Unknown".to_string()
        };

        println!("{:<12} {:>8} {:>24}", filename_str, blocks, coverage);
    }

    // Summary
    println!();
    println!("Summary:");
    println!("  Total tiles: {}", tiles.len());
    if partial_count > 0 {
        println!("  Tiles with a short final block: {}", partial_count);
    }
    println!("  Total size: {}", format_size(total_size));
    println!("  Data directory: {}", dir.display());

    Ok(())
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
