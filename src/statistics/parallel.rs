//! Parallel grid operations
//!
//! Masking and reductions over whole `Array2<f64>` grids. NaN marks a missing cell;
//! a biomass cell that is not strictly positive counts as missing too.

use crate::errors::{DisMapError, Result};
use ndarray::parallel::prelude::*;
use ndarray::{Array2, Zip};
use rayon::slice::ParallelSliceMut;

fn is_present(biomass: f64) -> bool {
    biomass.is_finite() && biomass > 0.0
}

/// Copies `aux`, setting every cell that is missing in `biomass` to NaN
///
/// Auxiliary grids are static while the biomass mask changes every year, so this
/// runs once per year on a fresh copy.
///
/// # Errors
///
/// Returns an error if the grids do not share a shape.
pub fn mask_auxiliary(biomass: &Array2<f64>, aux: &Array2<f64>) -> Result<Array2<f64>> {
    if biomass.shape() != aux.shape() {
        return Err(DisMapError::StatisticsError(format!(
            "biomass grid {:?} and auxiliary grid {:?} differ in shape",
            biomass.shape(),
            aux.shape()
        )));
    }

    Ok(Zip::from(biomass)
        .and(aux)
        .par_map_collect(|&b, &a| if is_present(b) { a } else { f64::NAN }))
}

/// Copies `biomass`, setting zero and negative cells to NaN
pub fn mask_biomass(biomass: &Array2<f64>) -> Array2<f64> {
    biomass.mapv(|b| if is_present(b) { b } else { f64::NAN })
}

/// Largest finite biomass value, `None` for an all-missing grid
pub fn max_biomass(biomass: &Array2<f64>) -> Option<f64> {
    let max = biomass
        .par_iter()
        .copied()
        .filter(|b| b.is_finite())
        .reduce(|| f64::NEG_INFINITY, f64::max);

    if max.is_finite() {
        Some(max)
    } else {
        None
    }
}

/// Median over the strictly positive cells of every grid
///
/// The median of an even count is the mean of the two middle values. `None` when
/// no grid has a positive cell.
pub fn median_biomass(grids: &[&Array2<f64>]) -> Option<f64> {
    let mut values: Vec<f64> = grids
        .par_iter()
        .flat_map_iter(|grid| grid.iter().copied().filter(|&b| is_present(b)))
        .collect();

    if values.is_empty() {
        return None;
    }

    values.par_sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
