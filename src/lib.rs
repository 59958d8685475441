//! DisMAP indicators: biomass-weighted distribution statistics
//!
//! Computes, for every species and survey year of a region, where the species'
//! biomass sits along latitude, longitude and depth: the biomass-weighted center of
//! gravity, the 5th and 95th cumulative-biomass percentiles, the shift from the
//! first surveyed year and a standard error. Results form the "Indicators" table
//! published alongside the DisMAP distribution maps.
//!
//! ## Module Organization
//!
//! - [`config`]: JSON project file (regions, species dictionary, variable names)
//! - [`netcdf_io`]: Reading auxiliary and per-year biomass grids from NetCDF
//! - [`metadata`]: Region inventory inspection
//! - [`statistics`]: Weighted centroid, percentiles and grid masking
//! - [`indicators`]: Per-species and per-region computation, project runs
//! - [`table`]: Indicators table CSV, deduplication and run manifest
//! - [`parallel`]: Parallel processing configuration
//! - [`errors`]: Centralized error handling
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use dismap_indicators::prelude::*;
//! use std::path::Path;
//!
//! let config = ProjectConfig::from_path(Path::new("project.json")).unwrap();
//! let manifest = run_project(
//!     &config,
//!     Path::new("data"),
//!     Path::new("indicators.csv"),
//!     &RunOptions::default(),
//! )
//! .unwrap();
//! println!("{} rows", manifest.rows_written);
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod indicators;
pub mod metadata;
pub mod netcdf_io;
pub mod parallel;
pub mod statistics;
pub mod table;

pub use errors::{DisMapError, Result};

// High-level convenience API
pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{ProjectConfig, RegionConfig, SpeciesInfo};
    pub use crate::errors::{DisMapError, Result};
    pub use crate::indicators::{compute_indicators, run_project, RunOptions, RunSummary};
    pub use crate::netcdf_io::AuxiliaryGrids;
    pub use crate::parallel::ParallelConfig;
    pub use crate::statistics::{AuxDimension, DimensionIndicators};
    pub use crate::table::{IndicatorRow, RunManifest};
}
