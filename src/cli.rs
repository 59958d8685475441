//! Defines command-line interface options using `clap` for the indicators tool.

use clap::Parser;
use std::path::PathBuf;

/// Computes biomass-weighted distribution indicators for DisMAP regions
#[derive(Parser, Debug)]
#[command(
    name = "dismap-indicators",
    version,
    about = "Center of gravity, range edges and offsets from regional biomass grids"
)]
pub struct Args {
    /// Path to the JSON project file (regions, species dictionary, variable names)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Directory holding one folder per region code
    #[arg(short, long)]
    pub data_dir: PathBuf,

    /// Path of the indicators CSV table
    #[arg(short, long, required_unless_present = "list_inventory")]
    pub output: Option<PathBuf>,

    /// Only process these region codes (repeatable)
    #[arg(short, long = "region")]
    pub regions: Vec<String>,

    /// Merge with the table already at the output path instead of replacing it
    #[arg(long)]
    pub append: bool,

    /// Skip regions without a biomass folder instead of stopping the run
    #[arg(long)]
    pub continue_on_missing: bool,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Print the grids, species and years found for each region and exit
    #[arg(long)]
    pub list_inventory: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
