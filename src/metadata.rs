//! Region inventory inspection
//!
//! This module reports what is on disk for each configured region: the auxiliary
//! grid shape, the species folders and the survey years found in each of them.

use crate::config::{species_folder_name, ProjectConfig, RegionConfig};
use crate::errors::Result;
use crate::netcdf_io::{biomass_dir, discover_species, discover_year_grids};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Years on disk for one species
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesInventory {
    pub scientific_name: String,
    pub folder: PathBuf,
    /// `None` when the species folder does not exist
    pub years: Option<Vec<i32>>,
}

/// Structured inventory of one region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionInventory {
    pub code: String,
    pub name: String,
    pub region_dir: PathBuf,
    /// Shape of the latitude grid, `None` when the auxiliary file is absent or unreadable
    pub grid_shape: Option<Vec<usize>>,
    pub has_biomass_dir: bool,
    pub species: Vec<SpeciesInventory>,
}

impl RegionInventory {
    /// Every year present for at least one species
    pub fn years(&self) -> BTreeSet<i32> {
        self.species
            .iter()
            .filter_map(|s| s.years.as_ref())
            .flatten()
            .copied()
            .collect()
    }

    /// Species listed for the region whose folder is absent
    pub fn missing_species(&self) -> Vec<&str> {
        self.species
            .iter()
            .filter(|s| s.years.is_none())
            .map(|s| s.scientific_name.as_str())
            .collect()
    }
}

/// Species of a region: configured list, or the folders found on disk
pub fn region_species(region: &RegionConfig, region_dir: &Path) -> Result<Vec<String>> {
    if region.species.is_empty() {
        discover_species(region_dir)
    } else {
        Ok(region.species.clone())
    }
}

/// Collects the inventory of one region without reading any biomass values
pub fn inventory_region(
    config: &ProjectConfig,
    data_dir: &Path,
    region: &RegionConfig,
) -> Result<RegionInventory> {
    let region_dir = data_dir.join(&region.code);
    let aux_path = region_dir.join(&config.auxiliary_file);

    let grid_shape = match netcdf::open(&aux_path) {
        Ok(file) => {
            let shape = file.variable(&config.variables.latitude).map(|var| {
                var.dimensions()
                    .iter()
                    .map(netcdf::Dimension::len)
                    .collect::<Vec<usize>>()
            });
            shape
        }
        Err(_) => None,
    };

    let has_biomass_dir = biomass_dir(&region_dir).is_dir();
    let names = if has_biomass_dir || !region.species.is_empty() {
        region_species(region, &region_dir)?
    } else {
        Vec::new()
    };

    let mut species = Vec::with_capacity(names.len());
    for scientific_name in names {
        let folder = biomass_dir(&region_dir).join(species_folder_name(&scientific_name));
        let years = if folder.is_dir() {
            Some(
                discover_year_grids(&folder)?
                    .into_iter()
                    .map(|g| g.year)
                    .collect(),
            )
        } else {
            None
        };
        species.push(SpeciesInventory {
            scientific_name,
            folder,
            years,
        });
    }

    Ok(RegionInventory {
        code: region.code.clone(),
        name: region.display_name().to_string(),
        region_dir,
        grid_shape,
        has_biomass_dir,
        species,
    })
}

/// Prints region inventories in a clean, organized format.
pub fn print_inventory(inventories: &[RegionInventory]) {
    for inventory in inventories {
        println!("\n {} ({})", inventory.name, inventory.code);
        println!("{}", "=".repeat(inventory.name.len() + inventory.code.len() + 4));

        match &inventory.grid_shape {
            Some(shape) => println!("    Grid shape: ({})", join(shape, " × ")),
            None => println!("    Grid shape: (auxiliary grids not found)"),
        }

        if !inventory.has_biomass_dir {
            println!(
                "    ⚠ No biomass folder at {}",
                biomass_dir(&inventory.region_dir).display()
            );
            continue;
        }

        let years = inventory.years();
        match (years.iter().next(), years.iter().next_back()) {
            (Some(first), Some(last)) => {
                println!("    Years: {}-{} ({} distinct)", first, last, years.len())
            }
            _ => println!("    Years: (none)"),
        }

        println!("    Species: {}", inventory.species.len());
        for species in &inventory.species {
            match &species.years {
                Some(years) => println!(
                    "      {} [{} year{}]",
                    species.scientific_name,
                    years.len(),
                    if years.len() == 1 { "" } else { "s" }
                ),
                None => println!("      {} (folder missing)", species.scientific_name),
            }
        }
    }
}

fn join<T: ToString>(values: &[T], separator: &str) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
