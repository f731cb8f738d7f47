//! All errors that can occur in the slimcheck library.

use std::fmt;

use crate::config::SettingsError;

pub type Result<T> = std::result::Result<T, SlimcheckError>;

#[derive(Debug)]
pub enum SlimcheckError {
    IoError(std::io::Error),
    TskitError(tskit::TskitError),
    CsvError(csv::Error),
    SettingsError(SettingsError),
    MetadataError(String),
    TooFewMutations { found: usize },
    EmptyMutationList { index: usize },
    MissingColumn { path: String, column: String },
    ParseError(String),
    NoData(String),
    Shape { origin: String, len: usize },
    FrequencyMismatch {
        recomputed: f64,
        reported: f64,
        tolerance: f64,
    },
    ProcessFailed { program: String, status: String },
}

impl fmt::Display for SlimcheckError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SlimcheckError::IoError(error) => write!(f, "IoError: {}", error),
            SlimcheckError::TskitError(error) => write!(f, "TskitError: {}", error),
            SlimcheckError::CsvError(error) => write!(f, "CsvError: {}", error),
            SlimcheckError::SettingsError(error) => write!(f, "SettingsError: {}", error),
            SlimcheckError::MetadataError(message) => write!(f, "MetadataError: {}", message),
            SlimcheckError::TooFewMutations { found } => write!(
                f,
                "TooFewMutations: burn-in holds {} mutation(s), at least 2 are required",
                found
            ),
            SlimcheckError::EmptyMutationList { index } => write!(
                f,
                "EmptyMutationList: mutation {} has a derived state but no metadata entries",
                index
            ),
            SlimcheckError::MissingColumn { path, column } => {
                write!(f, "MissingColumn: no column '{}' in {}", column, path)
            }
            SlimcheckError::ParseError(message) => write!(f, "ParseError: {}", message),
            SlimcheckError::NoData(source) => write!(f, "NoData: no frequency in {}", source),
            SlimcheckError::Shape { origin, len } => write!(
                f,
                "Shape: expected a single frequency in {}, found {}",
                origin, len
            ),
            SlimcheckError::FrequencyMismatch {
                recomputed,
                reported,
                tolerance,
            } => write!(
                f,
                "FrequencyMismatch: tree sequence gives {} but SLiM reported {} (tolerance {})",
                recomputed, reported, tolerance
            ),
            SlimcheckError::ProcessFailed { program, status } => {
                write!(f, "ProcessFailed: {} exited with {}", program, status)
            }
        }
    }
}

impl std::error::Error for SlimcheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SlimcheckError::IoError(error) => Some(error),
            SlimcheckError::TskitError(error) => Some(error),
            SlimcheckError::CsvError(error) => Some(error),
            SlimcheckError::SettingsError(error) => Some(error),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SlimcheckError {
    fn from(error: std::io::Error) -> Self {
        SlimcheckError::IoError(error)
    }
}

impl From<tskit::TskitError> for SlimcheckError {
    fn from(error: tskit::TskitError) -> Self {
        SlimcheckError::TskitError(error)
    }
}

impl From<csv::Error> for SlimcheckError {
    fn from(error: csv::Error) -> Self {
        SlimcheckError::CsvError(error)
    }
}

impl From<serde_json::Error> for SlimcheckError {
    fn from(error: serde_json::Error) -> Self {
        SlimcheckError::MetadataError(error.to_string())
    }
}

impl From<SettingsError> for SlimcheckError {
    fn from(error: SettingsError) -> Self {
        SlimcheckError::SettingsError(error)
    }
}
