//! Indicator statistics
//!
//! This module computes the biomass-weighted location indicators of one
//! species-year along latitude, longitude and depth.
//!
//! # Organization
//!
//! This module is organized into submodules:
//! - [`operations`]: Dimensions, result types and coordinate wrapping
//! - [`weighted`]: Centroid, weighted percentiles and standard error on flat slices
//! - [`parallel`]: Grid masking and cross-year reductions using Rayon

pub mod operations;
pub mod parallel;
pub mod weighted;

// Re-export the main types and functions for convenience
pub use operations::{AuxDimension, CentroidSummary, DimensionIndicators};
pub use parallel::{mask_auxiliary, mask_biomass, max_biomass, median_biomass};
pub use weighted::{
    paired_cells, summarize_dimension, weighted_centroid, weighted_percentile,
    weighted_standard_error, MaskedCells,
};
