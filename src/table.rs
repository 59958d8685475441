//! Indicators table
//!
//! One [`IndicatorRow`] per region/species/year. The table is stored as CSV with
//! the published column names; null indicators are empty cells. Each run also
//! leaves a JSON manifest next to the table.

use crate::errors::Result;
use crate::statistics::{AuxDimension, DimensionIndicators};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One row of the indicators table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndicatorRow {
    #[serde(rename = "OARegion")]
    pub oa_region: String,
    pub region: String,
    pub species: String,
    pub common_name: String,
    #[serde(serialize_with = "serialize_yes_no", deserialize_with = "deserialize_yes_no")]
    pub core_species: bool,
    pub year: i32,

    pub center_of_gravity_latitude: Option<f64>,
    pub minimum_latitude: Option<f64>,
    pub maximum_latitude: Option<f64>,
    pub offset_latitude: Option<f64>,
    #[serde(rename = "CenterOfGravityLatitudeSE")]
    pub center_of_gravity_latitude_se: Option<f64>,

    pub center_of_gravity_longitude: Option<f64>,
    pub minimum_longitude: Option<f64>,
    pub maximum_longitude: Option<f64>,
    pub offset_longitude: Option<f64>,
    #[serde(rename = "CenterOfGravityLongitudeSE")]
    pub center_of_gravity_longitude_se: Option<f64>,

    pub center_of_gravity_depth: Option<f64>,
    pub minimum_depth: Option<f64>,
    pub maximum_depth: Option<f64>,
    pub offset_depth: Option<f64>,
    #[serde(rename = "CenterOfGravityDepthSE")]
    pub center_of_gravity_depth_se: Option<f64>,
}

fn serialize_yes_no<S: Serializer>(
    value: &bool,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "Yes" } else { "No" })
}

fn deserialize_yes_no<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<bool, D::Error> {
    let value = String::deserialize(deserializer)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Ok(true),
        "no" | "false" | "0" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "invalid CoreSpecies value '{}'",
            other
        ))),
    }
}

impl IndicatorRow {
    /// A row with identity columns set and every indicator null
    pub fn empty(
        oa_region: &str,
        region: &str,
        species: &str,
        common_name: &str,
        core_species: bool,
        year: i32,
    ) -> Self {
        Self {
            oa_region: oa_region.to_string(),
            region: region.to_string(),
            species: species.to_string(),
            common_name: common_name.to_string(),
            core_species,
            year,
            center_of_gravity_latitude: None,
            minimum_latitude: None,
            maximum_latitude: None,
            offset_latitude: None,
            center_of_gravity_latitude_se: None,
            center_of_gravity_longitude: None,
            minimum_longitude: None,
            maximum_longitude: None,
            offset_longitude: None,
            center_of_gravity_longitude_se: None,
            center_of_gravity_depth: None,
            minimum_depth: None,
            maximum_depth: None,
            offset_depth: None,
            center_of_gravity_depth_se: None,
        }
    }

    fn columns_mut(&mut self, dimension: AuxDimension) -> [&mut Option<f64>; 5] {
        match dimension {
            AuxDimension::Latitude => [
                &mut self.center_of_gravity_latitude,
                &mut self.minimum_latitude,
                &mut self.maximum_latitude,
                &mut self.offset_latitude,
                &mut self.center_of_gravity_latitude_se,
            ],
            AuxDimension::Longitude => [
                &mut self.center_of_gravity_longitude,
                &mut self.minimum_longitude,
                &mut self.maximum_longitude,
                &mut self.offset_longitude,
                &mut self.center_of_gravity_longitude_se,
            ],
            AuxDimension::Depth => [
                &mut self.center_of_gravity_depth,
                &mut self.minimum_depth,
                &mut self.maximum_depth,
                &mut self.offset_depth,
                &mut self.center_of_gravity_depth_se,
            ],
        }
    }

    /// Fills the five columns of one dimension
    pub fn set_dimension(&mut self, dimension: AuxDimension, indicators: &DimensionIndicators) {
        let values = [
            indicators.center_of_gravity,
            indicators.minimum,
            indicators.maximum,
            indicators.offset,
            indicators.standard_error,
        ];
        for (column, value) in self.columns_mut(dimension).into_iter().zip(values) {
            *column = Some(value);
        }
    }

    /// Raw column values of one dimension, in output order
    pub fn columns(&self, dimension: AuxDimension) -> [Option<f64>; 5] {
        match dimension {
            AuxDimension::Latitude => [
                self.center_of_gravity_latitude,
                self.minimum_latitude,
                self.maximum_latitude,
                self.offset_latitude,
                self.center_of_gravity_latitude_se,
            ],
            AuxDimension::Longitude => [
                self.center_of_gravity_longitude,
                self.minimum_longitude,
                self.maximum_longitude,
                self.offset_longitude,
                self.center_of_gravity_longitude_se,
            ],
            AuxDimension::Depth => [
                self.center_of_gravity_depth,
                self.minimum_depth,
                self.maximum_depth,
                self.offset_depth,
                self.center_of_gravity_depth_se,
            ],
        }
    }

    /// The five columns of one dimension, `None` if any of them is null
    pub fn dimension(&self, dimension: AuxDimension) -> Option<DimensionIndicators> {
        let [cog, min, max, offset, se] = self.columns(dimension);
        Some(DimensionIndicators {
            center_of_gravity: cog?,
            minimum: min?,
            maximum: max?,
            offset: offset?,
            standard_error: se?,
        })
    }

    /// True when every indicator column is null
    pub fn is_null(&self) -> bool {
        AuxDimension::ALL
            .iter()
            .all(|&d| self.columns(d).iter().all(Option::is_none))
    }

    fn signature(&self) -> RowSignature {
        let values = AuxDimension::ALL
            .iter()
            .flat_map(|&d| self.columns(d))
            .map(|c| c.map(f64::to_bits))
            .collect();
        RowSignature {
            identity: (
                self.oa_region.clone(),
                self.region.clone(),
                self.species.clone(),
                self.common_name.clone(),
                self.core_species,
                self.year,
            ),
            values,
        }
    }
}

/// Exact-match identity of a row: floats compare by bit pattern
#[derive(Debug, PartialEq, Eq, Hash)]
struct RowSignature {
    identity: (String, String, String, String, bool, i32),
    values: Vec<Option<u64>>,
}

/// Removes exact duplicate rows, keeping the first occurrence and the row order
pub fn deduplicate(rows: Vec<IndicatorRow>) -> Vec<IndicatorRow> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter()
        .filter(|row| seen.insert(row.signature()))
        .collect()
}

/// Reads an indicators table
pub fn read_table(path: &Path) -> Result<Vec<IndicatorRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record?);
    }
    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Writes an indicators table, replacing any existing file
pub fn write_table(path: &Path, rows: &[IndicatorRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!("💾 Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// Appends `new_rows` to `existing` and deduplicates the result
///
/// Returns the merged table and the number of duplicates removed.
pub fn merge_rows(
    existing: Vec<IndicatorRow>,
    new_rows: Vec<IndicatorRow>,
) -> (Vec<IndicatorRow>, usize) {
    let mut merged = existing;
    merged.extend(new_rows);
    let before = merged.len();
    let merged = deduplicate(merged);
    let removed = before - merged.len();
    (merged, removed)
}

/// Summary of a run, written next to the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub created: String,
    pub project: String,
    pub table: PathBuf,
    pub regions_completed: Vec<String>,
    pub halted_region: Option<String>,
    pub rows_computed: usize,
    pub rows_written: usize,
    pub duplicates_removed: usize,
}

impl RunManifest {
    /// Stamps a manifest with the current UTC time
    pub fn new(project: &str, table: &Path) -> Self {
        Self {
            created: Utc::now().to_rfc3339(),
            project: project.to_string(),
            table: table.to_path_buf(),
            regions_completed: Vec::new(),
            halted_region: None,
            rows_computed: 0,
            rows_written: 0,
            duplicates_removed: 0,
        }
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        debug!("Wrote run manifest {}", path.display());
        Ok(())
    }
}

/// `<table>.manifest.json`
pub fn manifest_path(table: &Path) -> PathBuf {
    let mut name = table
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".manifest.json");
    table.with_file_name(name)
}
