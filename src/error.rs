use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading the survey dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The configured dataset file does not exist.
    #[error("Dataset file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file exists but could not be opened or read.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// A required column is absent from the header.
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// A required cell is missing or cannot be parsed as the column's type.
    #[error("Row {row}, column '{column}': invalid or missing value '{value}'")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

impl LoadError {
    /// Map an I/O failure on `path`, distinguishing a missing file.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::FileNotFound(path)
        } else {
            LoadError::FileRead { path, source }
        }
    }
}

/// Errors raised while serialising a view to CSV.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Export produced invalid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_io_error_becomes_file_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = LoadError::from_io("/data/sleep.csv", io_err);
        assert!(matches!(err, LoadError::FileNotFound(ref p) if p == &PathBuf::from("/data/sleep.csv")));
        assert_eq!(err.to_string(), "Dataset file not found: /data/sleep.csv");
    }

    #[test]
    fn other_io_error_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = LoadError::from_io("/data/sleep.csv", io_err);
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn invalid_value_message() {
        let err = LoadError::InvalidValue {
            row: 3,
            column: "Age".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Row 3, column 'Age': invalid or missing value 'abc'"
        );
    }
}
