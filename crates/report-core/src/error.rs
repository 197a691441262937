use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Audience Report pipeline.
///
/// File-level conditions abort processing of that file only; batch callers
/// are expected to record the failure and continue with sibling inputs.
/// Row-level anomalies (short rows, unparsable time slots or dates) are
/// never represented here: they are recovered locally by skipping the row.
#[derive(Error, Debug)]
pub enum ReportError {
    /// No recognizable header row was found in a viewing-figures grid.
    #[error("No header row found in \"{label}\"")]
    HeaderNotFound { label: String },

    /// A schedule grid contains no weekday header columns.
    #[error("No day columns found in schedule \"{label}\"")]
    NoDayColumns { label: String },

    /// A file parsed cleanly but produced zero usable days.
    #[error("No usable data in \"{label}\"")]
    EmptyInput { label: String },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The spreadsheet/CSV tokenizer rejected the file.
    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    /// A file extension the reader does not know how to tokenize.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A JSON document could not be parsed (store round-trips).
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_header_not_found() {
        let err = ReportError::HeaderNotFound {
            label: "Januari 2024".to_string(),
        };
        assert_eq!(err.to_string(), "No header row found in \"Januari 2024\"");
    }

    #[test]
    fn test_error_display_no_day_columns() {
        let err = ReportError::NoDayColumns {
            label: "week 7".to_string(),
        };
        assert_eq!(err.to_string(), "No day columns found in schedule \"week 7\"");
    }

    #[test]
    fn test_error_display_empty_input() {
        let err = ReportError::EmptyInput {
            label: "Maart 2024".to_string(),
        };
        assert_eq!(err.to_string(), "No usable data in \"Maart 2024\"");
    }

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ReportError::FileRead {
            path: PathBuf::from("/some/kijkcijfers.xlsx"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/some/kijkcijfers.xlsx"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_unsupported_format() {
        let err = ReportError::UnsupportedFormat(PathBuf::from("data.pdf"));
        assert_eq!(err.to_string(), "Unsupported file format: data.pdf");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReportError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ReportError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
