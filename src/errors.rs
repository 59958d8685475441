//! Centralized error handling for DisMAP indicators
//!
//! Every fallible operation in the crate returns [`Result`], built on the structured
//! [`DisMapError`] type so callers can match on the failure instead of parsing strings.

use std::fmt;
use std::path::PathBuf;

/// Main error type for indicator computations
#[derive(Debug)]
pub enum DisMapError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// I/O operation errors
    IoError(std::io::Error),

    /// Indicators table read/write errors
    CsvError(csv::Error),

    /// JSON (de)serialization errors
    JsonError(serde_json::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Invalid or inconsistent project configuration
    Config(String),

    /// Variable not found in a NetCDF file
    VariableNotFound { var: String, path: PathBuf },

    /// A grid does not have the shape of the region's auxiliary grids
    GridShapeMismatch {
        path: PathBuf,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// A variable that cannot be used as a grid
    InvalidGrid { path: PathBuf, message: String },

    /// Region code not present in the configuration
    RegionNotFound { region: String },

    /// Statistics computation errors
    StatisticsError(String),

    /// Thread pool configuration error
    ThreadPoolError(String),
}

impl fmt::Display for DisMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisMapError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            DisMapError::IoError(e) => write!(f, "I/O error: {}", e),
            DisMapError::CsvError(e) => write!(f, "CSV error: {}", e),
            DisMapError::JsonError(e) => write!(f, "JSON error: {}", e),
            DisMapError::ArrayError(e) => write!(f, "Array error: {}", e),
            DisMapError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DisMapError::VariableNotFound { var, path } => {
                write!(f, "Variable '{}' not found in {}", var, path.display())
            }
            DisMapError::GridShapeMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "Grid {} has shape {:?}, expected {:?}",
                path.display(),
                found,
                expected
            ),
            DisMapError::InvalidGrid { path, message } => {
                write!(f, "Invalid grid in {}: {}", path.display(), message)
            }
            DisMapError::RegionNotFound { region } => {
                write!(f, "Region '{}' not found in configuration", region)
            }
            DisMapError::StatisticsError(msg) => write!(f, "Statistics computation error: {}", msg),
            DisMapError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
        }
    }
}

impl std::error::Error for DisMapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DisMapError::NetCDFError(e) => Some(e),
            DisMapError::IoError(e) => Some(e),
            DisMapError::CsvError(e) => Some(e),
            DisMapError::JsonError(e) => Some(e),
            DisMapError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for DisMapError {
    fn from(error: netcdf::Error) -> Self {
        DisMapError::NetCDFError(error)
    }
}

impl From<std::io::Error> for DisMapError {
    fn from(error: std::io::Error) -> Self {
        DisMapError::IoError(error)
    }
}

impl From<csv::Error> for DisMapError {
    fn from(error: csv::Error) -> Self {
        DisMapError::CsvError(error)
    }
}

impl From<serde_json::Error> for DisMapError {
    fn from(error: serde_json::Error) -> Self {
        DisMapError::JsonError(error)
    }
}

impl From<ndarray::ShapeError> for DisMapError {
    fn from(error: ndarray::ShapeError) -> Self {
        DisMapError::ArrayError(error)
    }
}

/// Result type alias for DisMAP operations
pub type Result<T> = std::result::Result<T, DisMapError>;
