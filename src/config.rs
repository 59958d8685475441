//! Project configuration
//!
//! The project file is JSON. It names the regions to process, the species of each
//! region, the side dictionary of common names and core-species flags, and the
//! NetCDF variable names the grids are stored under.

use crate::errors::{DisMapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Name of the NetCDF variables holding each layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableNames {
    pub biomass: String,
    pub latitude: String,
    pub longitude: String,
    pub depth: String,
}

impl Default for VariableNames {
    fn default() -> Self {
        Self {
            biomass: "wtcpue".to_string(),
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            depth: "depth".to_string(),
        }
    }
}

/// One survey region/season
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Directory name under the data directory, e.g. `GMEX_IDW`
    pub code: String,
    /// Human readable name, e.g. `Gulf of Mexico`
    #[serde(default)]
    pub name: String,
    /// Scientific names; discovered from the biomass folders when empty
    #[serde(default)]
    pub species: Vec<String>,
}

impl RegionConfig {
    /// The label written to the `Region` column
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.code
        } else {
            &self.name
        }
    }
}

/// Entry of the species side dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesInfo {
    #[serde(default)]
    pub common_name: String,
    /// When absent the flag is derived from the years the species is observed in
    #[serde(default)]
    pub core_species: Option<bool>,
}

/// Complete project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_auxiliary_file")]
    pub auxiliary_file: String,
    #[serde(default)]
    pub variables: VariableNames,
    pub regions: Vec<RegionConfig>,
    #[serde(default)]
    pub species: BTreeMap<String, SpeciesInfo>,
}

fn default_project() -> String {
    "DisMAP".to_string()
}

fn default_auxiliary_file() -> String {
    "auxiliary.nc".to_string()
}

impl ProjectConfig {
    /// Reads and validates a project file
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DisMapError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parses and validates a project definition
    pub fn from_json(content: &str) -> Result<Self> {
        let config: ProjectConfig = serde_json::from_str(content)
            .map_err(|e| DisMapError::Config(format!("invalid project file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.regions.is_empty() {
            return Err(DisMapError::Config("no regions defined".to_string()));
        }

        let mut seen = HashSet::new();
        for region in &self.regions {
            if region.code.trim().is_empty() {
                return Err(DisMapError::Config("region with empty code".to_string()));
            }
            if !seen.insert(region.code.as_str()) {
                return Err(DisMapError::Config(format!(
                    "duplicate region code '{}'",
                    region.code
                )));
            }
        }

        Ok(())
    }

    /// Looks up a region by code
    pub fn region(&self, code: &str) -> Result<&RegionConfig> {
        self.regions
            .iter()
            .find(|r| r.code == code)
            .ok_or_else(|| DisMapError::RegionNotFound {
                region: code.to_string(),
            })
    }

    /// Regions to process, in configuration order.
    ///
    /// An empty filter selects every region. Unknown codes are an error.
    pub fn select_regions(&self, codes: &[String]) -> Result<Vec<&RegionConfig>> {
        if codes.is_empty() {
            return Ok(self.regions.iter().collect());
        }
        for code in codes {
            self.region(code)?;
        }
        Ok(self
            .regions
            .iter()
            .filter(|r| codes.iter().any(|c| c == &r.code))
            .collect())
    }

    pub fn species_info(&self, scientific_name: &str) -> Option<&SpeciesInfo> {
        self.species.get(scientific_name)
    }
}

/// Folder name of a species: the scientific name with spaces replaced by underscores
pub fn species_folder_name(scientific_name: &str) -> String {
    scientific_name.trim().replace(' ', "_")
}

/// Inverse of [`species_folder_name`]
pub fn scientific_name_from_folder(folder: &str) -> String {
    folder.replace('_', " ")
}
