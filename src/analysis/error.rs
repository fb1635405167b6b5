//! Errors raised while summarizing report files.

use std::path::PathBuf;
use thiserror::Error;

/// Every variant is fatal: the run stops and rows already written stay on disk.
#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("Failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No header line starting with '{sentinel}' in '{}'", .path.display())]
    MissingHeader { path: PathBuf, sentinel: String },

    #[error("Malformed row at '{}' line {line}: {reason}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error(
        "Percentage out of range at '{}' line {line}, column {column}: {value} is not within [0, {ceiling}]",
        .path.display()
    )]
    PercentageOutOfRange {
        path: PathBuf,
        line: usize,
        column: usize,
        value: f64,
        ceiling: f64,
    },

    #[error("Assembly '{}' has a total length of zero", .path.display())]
    EmptyAssembly { path: PathBuf },

    #[error("Output file '{}' is also an input report", .path.display())]
    OutputIsInput { path: PathBuf },

    #[error("Invalid report schema: {0}")]
    InvalidSchema(String),

    #[error("No input reports given")]
    NoInputs,
}

impl AggregateError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_file_and_line() {
        let err = AggregateError::MalformedRow {
            path: PathBuf::from("asm1.tsv"),
            line: 7,
            reason: "expected 68 fields, found 3".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("asm1.tsv"));
        assert!(message.contains("line 7"));
        assert!(message.contains("expected 68 fields"));
    }

    #[test]
    fn test_percentage_message() {
        let err = AggregateError::PercentageOutOfRange {
            path: PathBuf::from("asm2.tsv"),
            line: 3,
            column: 5,
            value: 150.0,
            ceiling: 100.01,
        };
        let message = err.to_string();
        assert!(message.contains("column 5"));
        assert!(message.contains("150"));
        assert!(message.contains("100.01"));
    }
}
