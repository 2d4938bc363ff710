//! I/O error types for cyclewarp-io.

use std::path::PathBuf;

use cyclewarp_dtw::DtwError;

/// Errors from file I/O, CSV parsing, configuration and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a required column is absent from the header.
    #[error("missing column \"{column}\" in {path}")]
    MissingColumn {
        /// Path to the CSV file.
        path: PathBuf,
        /// Name of the missing column.
        column: &'static str,
    },

    /// Returned when a cell cannot be parsed into the column's type.
    #[error("invalid value in {path}: row {row_index}, column \"{column}\", raw value \"{raw}\"")]
    InvalidValue {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Column name.
        column: &'static str,
        /// The raw string value that failed to parse.
        raw: String,
    },

    /// Returned when the same user appears twice in a labels file.
    #[error("duplicate user \"{user}\" in {path}: first at row {first_row}, again at row {second_row}")]
    DuplicateUser {
        /// Path to the CSV file.
        path: PathBuf,
        /// The duplicated user.
        user: String,
        /// Zero-based row index of the first occurrence.
        first_row: usize,
        /// Zero-based row index of the second occurrence.
        second_row: usize,
    },

    /// Returned when rows of one cycle disagree on its declared length.
    #[error("conflicting cycle_length for {user}/{cycle} in {path}: {first} vs {second}")]
    ConflictingCycleLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// User of the cycle.
        user: String,
        /// Cycle number.
        cycle: u32,
        /// Length seen first.
        first: usize,
        /// Conflicting length.
        second: usize,
    },

    /// Returned when a JSON document cannot be parsed or produced.
    #[error("JSON error in {path}")]
    Json {
        /// Path of the JSON document.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },

    /// Returned when a stored reference curve fails validation.
    #[error("invalid reference curve in {path}")]
    InvalidReference {
        /// Path of the reference document.
        path: PathBuf,
        /// Validation failure.
        source: DtwError,
    },

    /// Returned when a configuration value is out of range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Returned when a CSV record cannot be written.
    #[error("cannot write CSV record to {path}")]
    CsvWrite {
        /// Path of the CSV file.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl IoError {
    pub(crate) fn csv(path: &std::path::Path, source: csv::Error) -> Self {
        Self::CsvParse {
            path: path.to_path_buf(),
            offset: source.position().map_or(0, |p| p.byte()),
            source,
        }
    }
}
