//! Line-level reader for per-scaffold report files.
//!
//! A report is tab-delimited text: header lines start with the schema's
//! sentinel, every other non-empty line is one scaffold or chromosome.

use crate::analysis::AggregateError;
use crate::models::ReportSchema;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::debug;

/// One scaffold row, split on tabs.
#[derive(Debug)]
pub struct DataRow<'a> {
    path: &'a Path,
    /// 1-based line number in the report.
    pub line: usize,
    /// Identifier followed by the value fields.
    pub fields: Vec<&'a str>,
}

impl DataRow<'_> {
    /// Report file the row was read from.
    pub fn path(&self) -> &Path {
        self.path
    }

    /// Scaffold or chromosome name.
    pub fn identifier(&self) -> &str {
        self.fields[0]
    }

    /// Integer scaffold length from field 1.
    pub fn length(&self) -> Result<u64, AggregateError> {
        let raw = self.fields[1].trim();
        raw.parse::<u64>()
            .map_err(|e| self.malformed(format!("length '{}' is not an integer: {}", raw, e)))
    }

    /// Every value field (positions 1..) as a float.
    pub fn values(&self) -> Result<Vec<f64>, AggregateError> {
        self.fields[1..]
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                raw.trim().parse::<f64>().map_err(|e| {
                    self.malformed(format!(
                        "column {} value '{}' is not a number: {}",
                        index + 1,
                        raw.trim(),
                        e
                    ))
                })
            })
            .collect()
    }

    pub fn malformed(&self, reason: String) -> AggregateError {
        AggregateError::MalformedRow {
            path: self.path.to_path_buf(),
            line: self.line,
            reason,
        }
    }
}

/// Reader bound to one report file and the schema it follows.
pub struct ReportScanner<'s> {
    path: PathBuf,
    schema: &'s ReportSchema,
}

impl<'s> ReportScanner<'s> {
    /// Create a scanner for a report file.
    pub fn new(path: impl Into<PathBuf>, schema: &'s ReportSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<BufReader<File>, AggregateError> {
        let file = File::open(&self.path).map_err(|e| AggregateError::io(&self.path, e))?;
        Ok(BufReader::new(file))
    }

    /// Return the first header line verbatim, including its line terminator.
    pub fn read_header(&self) -> Result<String, AggregateError> {
        let mut reader = self.open()?;
        let mut line = String::new();

        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .map_err(|e| AggregateError::io(&self.path, e))?;
            if read == 0 {
                return Err(AggregateError::MissingHeader {
                    path: self.path.clone(),
                    sentinel: self.schema.header_sentinel().to_string(),
                });
            }
            if self.schema.is_header(&line) {
                debug!("Header found in {}", self.path.display());
                return Ok(line);
            }
        }
    }

    /// Visit every data row in file order.
    ///
    /// Header lines and empty lines are skipped. Rows that do not carry
    /// exactly one identifier plus the schema's value columns are rejected.
    pub fn for_each_row<F>(&self, mut visit: F) -> Result<(), AggregateError>
    where
        F: FnMut(&DataRow<'_>) -> Result<(), AggregateError>,
    {
        let mut reader = self.open()?;
        let mut buffer = String::new();
        let expected = self.schema.width() + 1;
        let mut line_number = 0;

        loop {
            buffer.clear();
            let read = reader
                .read_line(&mut buffer)
                .map_err(|e| AggregateError::io(&self.path, e))?;
            if read == 0 {
                break;
            }
            line_number += 1;

            if self.schema.is_header(&buffer) {
                continue;
            }

            let content = buffer.trim_end_matches('\n').trim_end_matches('\r');
            if content.is_empty() {
                continue;
            }

            let row = DataRow {
                path: &self.path,
                line: line_number,
                fields: content.split('\t').collect(),
            };

            if row.fields.len() != expected {
                return Err(row.malformed(format!(
                    "expected {} fields, found {}",
                    expected,
                    row.fields.len()
                )));
            }

            visit(&row)?;
        }

        Ok(())
    }
}
