//! Core indicator types
//!
//! This module defines the auxiliary dimensions indicators are computed over and the
//! per-dimension result of one species-year computation.

/// Auxiliary coordinate a biomass distribution is summarized along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuxDimension {
    /// Degrees north
    Latitude,
    /// Degrees east, summarized in [0, 360) to keep the antimeridian out of the sort
    Longitude,
    /// Metres below sea level
    Depth,
}

impl AuxDimension {
    /// All dimensions, in output column order
    pub const ALL: [AuxDimension; 3] = [Self::Latitude, Self::Longitude, Self::Depth];

    /// Get the string representation used in column names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
            Self::Depth => "Depth",
        }
    }

    /// Maps a stored coordinate into the space it is sorted and averaged in
    #[must_use]
    pub fn to_sort_space(self, value: f64) -> f64 {
        match self {
            Self::Longitude => value.rem_euclid(360.0),
            Self::Latitude | Self::Depth => value,
        }
    }

    /// Maps a location statistic (centroid or percentile) back to the stored convention
    #[must_use]
    pub fn from_sort_space(self, value: f64) -> f64 {
        match self {
            Self::Longitude => (value - 180.0).rem_euclid(360.0) - 180.0,
            Self::Latitude | Self::Depth => value,
        }
    }
}

/// Target cumulative fraction for the `Maximum<Dim>` column
pub const UPPER_QUANTILE: f64 = 0.95;
/// Target cumulative fraction for the `Minimum<Dim>` column
pub const LOWER_QUANTILE: f64 = 0.05;

/// Location and spread of one species-year distribution along one dimension
///
/// The offset is not part of this summary: it depends on the species' first
/// observed year and is attached by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CentroidSummary {
    pub dimension: AuxDimension,
    /// Biomass-weighted centroid ("center of gravity")
    pub center_of_gravity: f64,
    /// The centroid before mapping back; offsets between years are taken here
    pub sort_space_centroid: f64,
    /// Value at the 5th cumulative-biomass percentile
    pub minimum: f64,
    /// Value at the 95th cumulative-biomass percentile
    pub maximum: f64,
    /// As-built standard error, `sqrt(var(biomass * aux)) / sqrt(n)`
    pub standard_error: f64,
    /// Number of cells with both biomass and a coordinate
    pub cell_count: usize,
}

/// The five published values of one dimension
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionIndicators {
    pub center_of_gravity: f64,
    pub minimum: f64,
    pub maximum: f64,
    pub offset: f64,
    pub standard_error: f64,
}

impl DimensionIndicators {
    /// Attaches the offset from the species' first-year centroid
    ///
    /// `first_year_centroid` is the sort-space centroid of the first year with biomass.
    #[must_use]
    pub fn from_summary(summary: &CentroidSummary, first_year_centroid: f64) -> Self {
        Self {
            center_of_gravity: summary.center_of_gravity,
            minimum: summary.minimum,
            maximum: summary.maximum,
            offset: summary.sort_space_centroid - first_year_centroid,
            standard_error: summary.standard_error,
        }
    }
}
