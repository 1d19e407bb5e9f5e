use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

/// Terrain grid tile CLI tool
#[derive(Parser)]
#[command(name = "terradat")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing .DAT tile files
    #[arg(short, long, env = "TERRADAT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Maximum decoded blocks in cache
    #[arg(
        short,
        long,
        env = "TERRADAT_CACHE_SIZE",
        default_value = "64",
        global = true
    )]
    cache_size: u64,

    /// Grid spacing in meters the tiles were generated with
    #[arg(
        short,
        long,
        env = "TERRADAT_GRID_SPACING",
        default_value = "30",
        global = true
    )]
    grid_spacing: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the ground elevation at a single coordinate
    Query {
        /// Latitude in decimal degrees
        #[arg(long)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long)]
        lon: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Sample a path between two coordinates and query every sample
    Path {
        /// Start latitude in decimal degrees
        #[arg(long)]
        from_lat: f64,

        /// Start longitude in decimal degrees
        #[arg(long)]
        from_lon: f64,

        /// End latitude in decimal degrees
        #[arg(long)]
        to_lat: f64,

        /// End longitude in decimal degrees
        #[arg(long)]
        to_lon: f64,

        /// Sample step in meters (defaults to the grid spacing)
        #[arg(short, long)]
        step: Option<f64>,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Process elevations for multiple coordinates from a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (derived from the input name if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lon")]
        lon_col: String,
    },

    /// Display information about a tile file
    Info {
        /// Path to a .DAT file, or tile name (e.g., N47E008)
        tile: String,
    },

    /// List available tiles in the data directory
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { lat, lon, json } => {
            commands::query::run(cli.data_dir, cli.cache_size, cli.grid_spacing, lat, lon, json)
        }
        Commands::Path {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
            step,
            json,
        } => commands::path::run(
            cli.data_dir,
            cli.cache_size,
            cli.grid_spacing,
            (from_lat, from_lon),
            (to_lat, to_lon),
            step,
            json,
        ),
        Commands::Batch {
            input,
            output,
            lat_col,
            lon_col,
        } => commands::batch::run(
            cli.data_dir,
            cli.cache_size,
            cli.grid_spacing,
            input,
            output,
            lat_col,
            lon_col,
        ),
        Commands::Info { tile } => commands::info::run(cli.data_dir, tile),
        Commands::List => commands::list::run(cli.data_dir),
    }
}
