//! Per-species and per-region indicator computation
//!
//! For every species of a region the yearly biomass grids are summarized along
//! latitude, longitude and depth. A year without biomass still produces a row,
//! with every indicator null, so each region covers the full species × year
//! cross product.

use crate::config::{species_folder_name, ProjectConfig, RegionConfig};
use crate::errors::Result;
use crate::metadata::region_species;
use crate::netcdf_io::{
    biomass_dir, discover_year_grids, read_auxiliary_grids, read_biomass_grid, AuxiliaryGrids,
    YearGrid,
};
use crate::statistics::{
    mask_auxiliary, mask_biomass, max_biomass, median_biomass, summarize_dimension,
    AuxDimension, DimensionIndicators,
};
use crate::table::{manifest_path, merge_rows, read_table, write_table, IndicatorRow, RunManifest};
use log::{debug, info, warn};
use ndarray::Array2;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Identity columns shared by every row of one species
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesIdentity {
    pub oa_region: String,
    pub region: String,
    pub scientific_name: String,
    pub common_name: String,
    pub core_species: bool,
}

impl SpeciesIdentity {
    fn empty_row(&self, year: i32) -> IndicatorRow {
        IndicatorRow::empty(
            &self.oa_region,
            &self.region,
            &self.scientific_name,
            &self.common_name,
            self.core_species,
            year,
        )
    }
}

/// One year of biomass for one species
#[derive(Debug, Clone)]
pub struct YearBiomass {
    pub year: i32,
    pub grid: Array2<f64>,
}

/// Rows of one species plus what the region pass needs to know about it
#[derive(Debug, Clone)]
pub struct SpeciesIndicators {
    pub rows: Vec<IndicatorRow>,
    /// Years with nonzero biomass
    pub years_present: BTreeSet<i32>,
    /// Median of all positive cells over all years
    pub median_biomass: Option<f64>,
}

/// Computes one row per year for a species
///
/// `years` must be sorted by year. The offset of each dimension is measured from
/// the centroid of the first year that has biomass, in the dimension's sort space.
pub fn species_indicators(
    identity: &SpeciesIdentity,
    aux: &AuxiliaryGrids,
    years: &[YearBiomass],
) -> Result<SpeciesIndicators> {
    let mut rows = Vec::with_capacity(years.len());
    let mut years_present = BTreeSet::new();
    let mut first_centroid: [Option<f64>; 3] = [None; 3];

    for year in years {
        let mut row = identity.empty_row(year.year);

        match max_biomass(&year.grid) {
            Some(max) if max > 0.0 => {}
            _ => {
                debug!(
                    "{} {}: no biomass, writing null row",
                    identity.scientific_name, year.year
                );
                rows.push(row);
                continue;
            }
        }
        years_present.insert(year.year);

        let biomass: Vec<f64> = mask_biomass(&year.grid).iter().copied().collect();

        for (index, dimension) in AuxDimension::ALL.into_iter().enumerate() {
            let masked = mask_auxiliary(&year.grid, aux.grid(dimension))?;
            let coordinates: Vec<f64> = masked.iter().copied().collect();

            match summarize_dimension(&biomass, &coordinates, dimension)? {
                Some(summary) => {
                    let first = *first_centroid[index].get_or_insert(summary.sort_space_centroid);
                    let indicators = DimensionIndicators::from_summary(&summary, first);
                    row.set_dimension(dimension, &indicators);
                }
                None => warn!(
                    "{} {}: no cell has both biomass and {}",
                    identity.scientific_name,
                    year.year,
                    dimension.as_str().to_lowercase()
                ),
            }
        }

        rows.push(row);
    }

    let grids: Vec<&Array2<f64>> = years.iter().map(|y| &y.grid).collect();
    let median = median_biomass(&grids);
    if let Some(median) = median {
        debug!("{}: median biomass {:.4}", identity.scientific_name, median);
    }

    Ok(SpeciesIndicators {
        rows,
        years_present,
        median_biomass: median,
    })
}

/// Reads the yearly grids listed for a species
pub fn load_species_years(
    grids: &[YearGrid],
    biomass_var: &str,
    shape: &[usize],
) -> Result<Vec<YearBiomass>> {
    grids
        .iter()
        .map(|g| -> Result<YearBiomass> {
            Ok(YearBiomass {
                year: g.year,
                grid: read_biomass_grid(&g.path, biomass_var, shape)?,
            })
        })
        .collect()
}

/// Result of processing one region
#[derive(Debug, Clone)]
pub enum RegionOutcome {
    Completed(Vec<IndicatorRow>),
    /// The region has no biomass folder; nothing was computed
    MissingBiomass { path: PathBuf },
}

/// Species is core when it has biomass in every survey year of the region
pub fn is_core_species(years_present: &BTreeSet<i32>, region_years: &BTreeSet<i32>) -> bool {
    !region_years.is_empty() && region_years.is_subset(years_present)
}

/// Computes the rows of every species of a region
///
/// Species are processed in parallel; rows come back in species order, then year
/// order. A species listed in the configuration without a folder on disk is
/// skipped with a warning.
pub fn region_indicators(
    config: &ProjectConfig,
    data_dir: &Path,
    region: &RegionConfig,
) -> Result<RegionOutcome> {
    let region_dir = data_dir.join(&region.code);
    let biomass_root = biomass_dir(&region_dir);
    if !biomass_root.is_dir() {
        return Ok(RegionOutcome::MissingBiomass { path: biomass_root });
    }

    let aux = read_auxiliary_grids(&region_dir.join(&config.auxiliary_file), &config.variables)?;

    let mut species = Vec::new();
    for name in region_species(region, &region_dir)? {
        let folder = biomass_root.join(species_folder_name(&name));
        if folder.is_dir() {
            let grids = discover_year_grids(&folder)?;
            species.push((name, grids));
        } else {
            warn!("⚠ {}: no biomass folder for {} at {}", region.code, name, folder.display());
        }
    }

    let region_years: BTreeSet<i32> = species
        .iter()
        .flat_map(|(_, grids)| grids.iter().map(|g| g.year))
        .collect();

    info!(
        "⚡ Computing indicators for {} species in {} across {} CPU cores",
        species.len(),
        region.display_name(),
        rayon::current_num_threads()
    );

    let results: Vec<(Option<bool>, SpeciesIndicators)> = species
        .par_iter()
        .map(|(name, grids)| -> Result<(Option<bool>, SpeciesIndicators)> {
            let info = config.species_info(name);
            let configured_core = info.and_then(|i| i.core_species);
            let identity = SpeciesIdentity {
                oa_region: region.code.clone(),
                region: region.display_name().to_string(),
                scientific_name: name.clone(),
                common_name: info.map(|i| i.common_name.clone()).unwrap_or_default(),
                core_species: configured_core.unwrap_or(false),
            };
            let years = load_species_years(grids, &config.variables.biomass, aux.shape())?;
            Ok((configured_core, species_indicators(&identity, &aux, &years)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (configured_core, mut result) in results {
        if configured_core.is_none() {
            let core = is_core_species(&result.years_present, &region_years);
            for row in &mut result.rows {
                row.core_species = core;
            }
        }
        rows.extend(result.rows);
    }

    info!("✅ {}: {} rows", region.code, rows.len());
    Ok(RegionOutcome::Completed(rows))
}

/// Options of a project run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Region codes to process; empty means all
    pub regions: Vec<String>,
    /// Skip a region without biomass instead of stopping the run
    pub continue_on_missing: bool,
    /// Merge with the table already at the output path
    pub append: bool,
}

/// Rows computed by a run and how far it got
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub rows: Vec<IndicatorRow>,
    pub regions_completed: Vec<String>,
    pub regions_skipped: Vec<String>,
    pub halted_region: Option<String>,
}

/// Processes the selected regions in configuration order
///
/// A region without a biomass folder stops the run: the remaining regions are not
/// processed, rows of regions already completed are kept. With
/// `continue_on_missing` the region is skipped instead.
pub fn compute_indicators(
    config: &ProjectConfig,
    data_dir: &Path,
    options: &RunOptions,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for region in config.select_regions(&options.regions)? {
        match region_indicators(config, data_dir, region)? {
            RegionOutcome::Completed(rows) => {
                summary.rows.extend(rows);
                summary.regions_completed.push(region.code.clone());
            }
            RegionOutcome::MissingBiomass { path } if options.continue_on_missing => {
                warn!("⚠ Skipping {}: no biomass folder at {}", region.code, path.display());
                summary.regions_skipped.push(region.code.clone());
            }
            RegionOutcome::MissingBiomass { path } => {
                warn!(
                    "⚠ No biomass folder for {} at {}; remaining regions are not processed",
                    region.code,
                    path.display()
                );
                summary.halted_region = Some(region.code.clone());
                break;
            }
        }
    }

    Ok(summary)
}

/// Computes indicators and writes the table and its manifest
pub fn run_project(
    config: &ProjectConfig,
    data_dir: &Path,
    output: &Path,
    options: &RunOptions,
) -> Result<RunManifest> {
    let summary = compute_indicators(config, data_dir, options)?;

    let existing = if options.append && output.is_file() {
        read_table(output)?
    } else {
        Vec::new()
    };
    let rows_computed = summary.rows.len();
    let (merged, duplicates_removed) = merge_rows(existing, summary.rows);
    if duplicates_removed > 0 {
        info!("Removed {} duplicate rows", duplicates_removed);
    }
    write_table(output, &merged)?;

    let mut manifest = RunManifest::new(&config.project, output);
    manifest.regions_completed = summary.regions_completed;
    manifest.halted_region = summary.halted_region;
    manifest.rows_computed = rows_computed;
    manifest.rows_written = merged.len();
    manifest.duplicates_removed = duplicates_removed;
    manifest.write(&manifest_path(output))?;

    Ok(manifest)
}
