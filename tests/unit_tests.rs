//! Unit tests for the public API of the indicators crate
//!
//! These tests cover error reporting, the prelude and the statistics entry points
//! the way a downstream consumer uses them.

use dismap_indicators::prelude::*;
use dismap_indicators::statistics::{
    mask_auxiliary, summarize_dimension, weighted_percentile, weighted_standard_error,
};
use dismap_indicators::table::deduplicate;
use ndarray::array;
use std::error::Error;
use std::path::PathBuf;

#[test]
fn test_error_types() {
    let var_err = DisMapError::VariableNotFound {
        var: "wtcpue".to_string(),
        path: PathBuf::from("GMEX_IDW/biomass/Lutjanus_campechanus/Lutjanus_campechanus_2015.nc"),
    };
    assert!(format!("{}", var_err).contains("Variable 'wtcpue' not found"));

    let shape_err = DisMapError::GridShapeMismatch {
        path: PathBuf::from("grid.nc"),
        expected: vec![2, 3],
        found: vec![3, 3],
    };
    assert_eq!(
        format!("{}", shape_err),
        "Grid grid.nc has shape [3, 3], expected [2, 3]"
    );

    let region_err = DisMapError::RegionNotFound {
        region: "SEUS_SPR_IDW".to_string(),
    };
    assert!(format!("{}", region_err).contains("SEUS_SPR_IDW"));

    let io_err: DisMapError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(format!("{}", io_err).starts_with("I/O error"));
    assert!(io_err.source().is_some());

    let config_err = DisMapError::Config("no regions defined".to_string());
    assert!(config_err.source().is_none());
}

#[test]
fn test_default_thread_pool() -> Result<()> {
    // Without a thread count the global pool is left to Rayon's defaults
    ParallelConfig::default().setup_global_pool()?;
    assert!(ParallelConfig::new(None).current_threads() > 0);
    Ok(())
}

#[test]
fn test_aux_dimension_columns() {
    let names: Vec<&str> = AuxDimension::ALL.iter().map(|d| d.as_str()).collect();
    assert_eq!(names, vec!["Latitude", "Longitude", "Depth"]);
}

#[test]
fn test_masked_year_summary() -> Result<()> {
    // Biomass concentrated in the deeper, southern half of a 3 × 3 grid
    let biomass = array![[0.0, 0.0, 0.0], [1.0, 2.0, 1.0], [2.0, 4.0, 2.0]];
    let depth = array![[10.0, 20.0, 30.0], [40.0, 50.0, 60.0], [70.0, 80.0, 90.0]];

    let masked = mask_auxiliary(&biomass, &depth)?;
    assert!(masked.row(0).iter().all(|d| d.is_nan()));

    let b: Vec<f64> = biomass.iter().copied().collect();
    let d: Vec<f64> = masked.iter().copied().collect();
    let summary = summarize_dimension(&b, &d, AuxDimension::Depth)?.expect("biomass present");

    // (40 + 100 + 60 + 140 + 320 + 180) / 12 = 70
    assert!((summary.center_of_gravity - 70.0).abs() < 1e-9);
    // Sorted fractions: 1/12, 3/12, 4/12, 6/12, 10/12, 1
    assert_eq!(summary.minimum, 40.0);
    assert_eq!(summary.maximum, 90.0);
    assert_eq!(summary.cell_count, 6);
    Ok(())
}

#[test]
fn test_weighted_helpers_on_empty_input() {
    assert_eq!(weighted_percentile(&[], 0.0, 0.5), None);
    assert_eq!(weighted_standard_error(&[]), None);
}

#[test]
fn test_null_rows_survive_deduplication_once() {
    let row = IndicatorRow::empty(
        "NEUS_F_IDW",
        "Northeast US Fall",
        "Homarus americanus",
        "American lobster",
        true,
        2020,
    );
    let rows = deduplicate(vec![row.clone(), row.clone()]);
    assert_eq!(rows, vec![row]);
}
