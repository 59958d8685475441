//! Entry point for the DisMAP indicators tool.
//! Handles CLI parsing, logging setup, and dispatches the inventory listing or the indicator run.

use clap::Parser;
use dismap_indicators::cli::Args;
use dismap_indicators::config::ProjectConfig;
use dismap_indicators::indicators::{run_project, RunOptions};
use dismap_indicators::metadata::{inventory_region, print_inventory};
use dismap_indicators::parallel::{get_parallel_info, ParallelConfig};
use env_logger::{Builder, Env};
use log::{debug, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    ParallelConfig::new(args.threads).setup_global_pool()?;
    let parallel = get_parallel_info();
    debug!(
        "Rayon threads: {}, CPU cores: {}",
        parallel.current_threads, parallel.available_cores
    );

    let config = ProjectConfig::from_path(&args.config)?;
    info!(
        "Loaded project '{}' with {} regions from {}",
        config.project,
        config.regions.len(),
        args.config.display()
    );

    if args.list_inventory {
        let inventories = config
            .select_regions(&args.regions)?
            .into_iter()
            .map(|region| inventory_region(&config, &args.data_dir, region))
            .collect::<Result<Vec<_>, _>>()?;
        print_inventory(&inventories);
        return Ok(());
    }

    let output = args
        .output
        .ok_or("--output is required unless --list-inventory is given")?;
    let options = RunOptions {
        regions: args.regions,
        continue_on_missing: args.continue_on_missing,
        append: args.append,
    };

    let manifest = run_project(&config, &args.data_dir, &output, &options)?;

    println!("✅ Saved {} rows to {}", manifest.rows_written, output.display());
    println!("   Regions completed: {}", manifest.regions_completed.join(", "));
    if let Some(region) = &manifest.halted_region {
        println!("   ⚠ Stopped at {}: no biomass folder", region);
    }

    Ok(())
}
