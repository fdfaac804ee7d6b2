//! Error type shared by loading, caching and artifact writing.

use std::path::PathBuf;

use crate::domain::VehicleCategory;

/// Failures while reading listings or writing result artifacts.
///
/// Bad data rows never surface here; the reader skips them. Only problems
/// that make the whole file or artifact unusable become an `IoError`.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("cannot open listing file {path}")]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The header row itself is unreadable.
    #[error("malformed CSV header in {path} (byte {offset})")]
    CsvParse {
        path: PathBuf,
        offset: u64,
        source: csv::Error,
    },

    #[error("{path} has no \"{column}\" column")]
    MissingColumn {
        path: PathBuf,
        column: &'static str,
    },

    /// Every data row was rejected during validation.
    #[error("no usable listings in {path}")]
    EmptyDataset { path: PathBuf },

    #[error("unknown vehicle category \"{name}\" (expected car or motorcycle)")]
    UnknownCategory { name: String },

    #[error("no listing file registered for {category}")]
    NoSource { category: VehicleCategory },

    /// Names are restricted to `[a-zA-Z0-9_-]+` so they are safe in file names.
    #[error("experiment name \"{name}\" may only use letters, digits, '_' and '-'")]
    InvalidExperimentName { name: String },

    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot encode {path} as JSON")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot write {path}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}
