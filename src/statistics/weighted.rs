//! Biomass-weighted location statistics
//!
//! Everything here works on flattened, co-registered slices of biomass and one
//! auxiliary coordinate. A biomass cell is present when it is finite and strictly
//! positive. Every present cell counts towards the biomass total that centroids
//! and cumulative fractions are normalized by; only cells that also have a finite
//! coordinate enter the weighted sum, the sorted pairs and the cell count.

use super::operations::{AuxDimension, CentroidSummary, LOWER_QUANTILE, UPPER_QUANTILE};
use crate::errors::{DisMapError, Result};

/// A cell with biomass and a coordinate: `(biomass, coordinate)`
pub type WeightedCell = (f64, f64);

/// Cells of one dimension after masking
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedCells {
    /// Present biomass cells that also have a finite coordinate
    pub cells: Vec<WeightedCell>,
    /// Sum over every present biomass cell, with or without a coordinate
    pub total_biomass: f64,
}

/// Pairs biomass with its coordinate and totals the present biomass
///
/// # Errors
///
/// Returns an error if the two slices are not the same length.
pub fn paired_cells(biomass: &[f64], aux: &[f64]) -> Result<MaskedCells> {
    if biomass.len() != aux.len() {
        return Err(DisMapError::StatisticsError(format!(
            "biomass has {} cells but the auxiliary grid has {}",
            biomass.len(),
            aux.len()
        )));
    }

    let mut cells = Vec::new();
    let mut total_biomass = 0.0;
    for (&b, &a) in biomass.iter().zip(aux) {
        if !(b.is_finite() && b > 0.0) {
            continue;
        }
        total_biomass += b;
        if a.is_finite() {
            cells.push((b, a));
        }
    }

    Ok(MaskedCells {
        cells,
        total_biomass,
    })
}

/// Weighted sum of the coordinate divided by the biomass total
///
/// `None` when there is no biomass or no cell has a coordinate.
pub fn weighted_centroid(cells: &[WeightedCell], total_biomass: f64) -> Option<f64> {
    if total_biomass <= 0.0 || cells.is_empty() {
        return None;
    }
    let sum_weighted: f64 = cells.iter().map(|(b, a)| b * a).sum();
    Some(sum_weighted / total_biomass)
}

/// Coordinate at which the cumulative biomass fraction is nearest to `q`
///
/// Cells are sorted by coordinate, the inclusive running biomass total is divided
/// by `total_biomass`, and the first cell whose fraction is closest to `q` wins.
pub fn weighted_percentile(cells: &[WeightedCell], total_biomass: f64, q: f64) -> Option<f64> {
    if total_biomass <= 0.0 {
        return None;
    }

    let mut sorted = cells.to_vec();
    sorted.sort_by(|x, y| x.1.total_cmp(&y.1));

    let mut cumulative = 0.0;
    let mut best: Option<(f64, f64)> = None;
    for &(b, a) in &sorted {
        cumulative += b;
        let distance = (cumulative / total_biomass - q).abs();
        match best {
            Some((best_distance, _)) if distance >= best_distance => {}
            _ => best = Some((distance, a)),
        }
    }

    best.map(|(_, value)| value)
}

/// As-built standard error of the centroid: `sqrt(var(b * a)) / sqrt(n)`
///
/// The variance is the population variance of the weighted products, not of the
/// coordinate, and the divisor is the cell count rather than the biomass total.
pub fn weighted_standard_error(cells: &[WeightedCell]) -> Option<f64> {
    if cells.is_empty() {
        return None;
    }

    let n = cells.len() as f64;
    let mean = cells.iter().map(|(b, a)| b * a).sum::<f64>() / n;
    let variance = cells
        .iter()
        .map(|(b, a)| (b * a - mean).powi(2))
        .sum::<f64>()
        / n;

    Some(variance.sqrt() / n.sqrt())
}

/// Centroid, 5th/95th percentiles and standard error along one dimension
///
/// Coordinates are moved into the dimension's sort space first; centroid and
/// percentiles are moved back afterwards. Returns `None` when no cell carries
/// both biomass and a coordinate.
///
/// # Errors
///
/// Returns an error if the slices differ in length.
pub fn summarize_dimension(
    biomass: &[f64],
    aux: &[f64],
    dimension: AuxDimension,
) -> Result<Option<CentroidSummary>> {
    let masked = paired_cells(biomass, aux)?;
    let total = masked.total_biomass;
    let cells: Vec<WeightedCell> = masked
        .cells
        .into_iter()
        .map(|(b, a)| (b, dimension.to_sort_space(a)))
        .collect();

    let centroid = match weighted_centroid(&cells, total) {
        Some(value) => value,
        None => return Ok(None),
    };

    let (minimum, maximum, standard_error) = match (
        weighted_percentile(&cells, total, LOWER_QUANTILE),
        weighted_percentile(&cells, total, UPPER_QUANTILE),
        weighted_standard_error(&cells),
    ) {
        (Some(lo), Some(hi), Some(se)) => (lo, hi, se),
        _ => return Ok(None),
    };

    Ok(Some(CentroidSummary {
        dimension,
        center_of_gravity: dimension.from_sort_space(centroid),
        sort_space_centroid: centroid,
        minimum: dimension.from_sort_space(minimum),
        maximum: dimension.from_sort_space(maximum),
        standard_error,
        cell_count: cells.len(),
    }))
}
