//! NetCDF grid input
//!
//! This module reads the co-registered grids of a region: the static auxiliary
//! grids (latitude, longitude, depth) and the per-year biomass grids of each
//! species. Missing cells come back as NaN whatever their on-disk encoding.
//!
//! Region layout on disk:
//!
//! ```text
//! <data-dir>/<REGION>/auxiliary.nc
//! <data-dir>/<REGION>/biomass/<Genus_species>/<Genus_species>_<YEAR>.nc
//! ```

use crate::config::{scientific_name_from_folder, VariableNames};
use crate::errors::{DisMapError, Result};
use crate::statistics::AuxDimension;
use log::debug;
use ndarray::Array2;
use netcdf::{AttributeValue, File, Variable};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under a region holding one folder per species
pub const BIOMASS_DIR: &str = "biomass";

/// Values at or above this magnitude are NetCDF default fill values
const DEFAULT_FILL_THRESHOLD: f64 = 9.0e36;

/// Static coordinate grids of one region
#[derive(Debug, Clone)]
pub struct AuxiliaryGrids {
    pub latitude: Array2<f64>,
    pub longitude: Array2<f64>,
    /// Positive below sea level
    pub depth: Array2<f64>,
}

impl AuxiliaryGrids {
    /// Bundles three grids, checking they share one shape
    pub fn new(latitude: Array2<f64>, longitude: Array2<f64>, depth: Array2<f64>) -> Result<Self> {
        let expected = latitude.shape().to_vec();
        for (name, grid) in [("longitude", &longitude), ("depth", &depth)] {
            if grid.shape() != expected.as_slice() {
                return Err(DisMapError::GridShapeMismatch {
                    path: PathBuf::from(name),
                    expected,
                    found: grid.shape().to_vec(),
                });
            }
        }
        Ok(Self {
            latitude,
            longitude,
            depth,
        })
    }

    /// Shape shared by every grid of the region
    pub fn shape(&self) -> &[usize] {
        self.latitude.shape()
    }

    /// Grid of one dimension
    pub fn grid(&self, dimension: AuxDimension) -> &Array2<f64> {
        match dimension {
            AuxDimension::Latitude => &self.latitude,
            AuxDimension::Longitude => &self.longitude,
            AuxDimension::Depth => &self.depth,
        }
    }
}

/// A biomass grid file for one year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearGrid {
    pub year: i32,
    pub path: PathBuf,
}

/// Directory holding the species folders of a region
pub fn biomass_dir(region_dir: &Path) -> PathBuf {
    region_dir.join(BIOMASS_DIR)
}

fn find_variable<'f>(file: &'f File, path: &Path, var_name: &str) -> Result<Variable<'f>> {
    file.variable(var_name)
        .ok_or_else(|| DisMapError::VariableNotFound {
            var: var_name.to_string(),
            path: path.to_path_buf(),
        })
}

fn numeric_attribute(var: &Variable, name: &str) -> Option<f64> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Double(v) => Some(v),
        AttributeValue::Float(v) => Some(f64::from(v)),
        AttributeValue::Int(v) => Some(f64::from(v)),
        AttributeValue::Short(v) => Some(f64::from(v)),
        AttributeValue::Doubles(vs) => vs.first().copied(),
        AttributeValue::Floats(vs) => vs.first().map(|&v| f64::from(v)),
        _ => None,
    }
}

fn string_attribute(var: &Variable, name: &str) -> Option<String> {
    match var.attribute(name)?.value().ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

/// Reads a 2-D variable as `f64`, turning fill values into NaN
///
/// # Errors
///
/// Returns an error if the variable is missing or is not two-dimensional.
pub fn read_grid(file: &File, path: &Path, var_name: &str) -> Result<Array2<f64>> {
    let var = find_variable(file, path, var_name)?;

    let shape: Vec<usize> = var.dimensions().iter().map(netcdf::Dimension::len).collect();
    if shape.len() != 2 {
        return Err(DisMapError::InvalidGrid {
            path: path.to_path_buf(),
            message: format!(
                "variable '{}' has {} dimensions, expected 2",
                var_name,
                shape.len()
            ),
        });
    }

    let fill_values: Vec<f64> = ["_FillValue", "missing_value"]
        .iter()
        .filter_map(|attr| numeric_attribute(&var, attr))
        .collect();

    let values: Vec<f64> = var
        .get_values::<f64, _>(..)?
        .into_iter()
        .map(|v| {
            if v.abs() >= DEFAULT_FILL_THRESHOLD || fill_values.contains(&v) {
                f64::NAN
            } else {
                v
            }
        })
        .collect();

    Ok(Array2::from_shape_vec((shape[0], shape[1]), values)?)
}

/// Reads the latitude, longitude and depth grids of a region
///
/// Depth stored with the CF attribute `positive = "up"` (elevation) is negated so
/// that the returned depth is positive below sea level.
pub fn read_auxiliary_grids(path: &Path, names: &VariableNames) -> Result<AuxiliaryGrids> {
    let file = netcdf::open(path)?;

    let latitude = read_grid(&file, path, &names.latitude)?;
    let longitude = read_grid(&file, path, &names.longitude)?;
    let mut depth = read_grid(&file, path, &names.depth)?;

    let positive = find_variable(&file, path, &names.depth)
        .ok()
        .and_then(|var| string_attribute(&var, "positive"));
    if positive.as_deref().map(str::trim) == Some("up") {
        debug!("Depth in {} is positive up, negating", path.display());
        depth.mapv_inplace(|d| -d);
    }

    AuxiliaryGrids::new(latitude, longitude, depth).map_err(|e| match e {
        DisMapError::GridShapeMismatch {
            expected, found, ..
        } => DisMapError::GridShapeMismatch {
            path: path.to_path_buf(),
            expected,
            found,
        },
        other => other,
    })
}

/// Reads one year of biomass and checks it against the region's grid shape
pub fn read_biomass_grid(path: &Path, var_name: &str, expected: &[usize]) -> Result<Array2<f64>> {
    let file = netcdf::open(path)?;
    let grid = read_grid(&file, path, var_name)?;

    if grid.shape() != expected {
        return Err(DisMapError::GridShapeMismatch {
            path: path.to_path_buf(),
            expected: expected.to_vec(),
            found: grid.shape().to_vec(),
        });
    }

    Ok(grid)
}

/// Year encoded as the trailing four digits of a file stem, e.g. `Gadus_morhua_2019`
pub fn year_from_stem(stem: &str) -> Option<i32> {
    let digits: String = stem
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect();
    if digits.len() != 4 {
        return None;
    }
    digits.chars().rev().collect::<String>().parse().ok()
}

/// Lists the per-year biomass grids in a species folder, sorted by year
///
/// Files that are not `.nc` or carry no year are skipped.
pub fn discover_year_grids(species_dir: &Path) -> Result<Vec<YearGrid>> {
    let mut grids = Vec::new();

    for entry in fs::read_dir(species_dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("nc") {
            continue;
        }
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        match year_from_stem(stem) {
            Some(year) => grids.push(YearGrid { year, path }),
            None => debug!("Skipping {}: no year in file name", path.display()),
        }
    }

    grids.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.path.cmp(&b.path)));
    Ok(grids)
}

/// Scientific names of the species folders of a region, sorted
pub fn discover_species(region_dir: &Path) -> Result<Vec<String>> {
    let mut species = Vec::new();

    for entry in fs::read_dir(biomass_dir(region_dir))? {
        let path = entry?.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                species.push(scientific_name_from_folder(name));
            }
        }
    }

    species.sort();
    Ok(species)
}
