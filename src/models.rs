//! Data models for the repeat comparison table.
//!
//! This module contains the report schema (which columns are counts and
//! which are percentages) and the per-assembly summary produced from it.

use crate::analysis::AggregateError;
use std::fmt;

/// Literal that starts every header line of a RepeatMasker summary report.
pub const HEADER_SENTINEL: &str = "filename";

/// Number of value columns following the row identifier.
pub const REPEATMASKER_VALUE_COLUMNS: usize = 67;

/// Positions holding percentages, counted in the full row where position 0
/// is the scaffold identifier.
///
/// Each percentage at position `p` is expressed over the absolute count at
/// position `p - 1`, so the aggregate is rebuilt from that count instead of
/// averaging percentages across scaffolds of different size.
pub const REPEATMASKER_PERCENTAGE_COLUMNS: [usize; 23] = [
    3, 5, 7, 10, 13, 16, 19, 22, 25, 28, 31, 34, 37, 40, 43, 46, 49, 52, 55, 58, 61, 64, 67,
];

/// GC content. Its weighted sum is kept as-is and never divided by the
/// assembly length.
pub const GC_CONTENT_COLUMN: usize = 3;

/// Upper bound accepted for a percentage (upstream rounding drifts past 100).
pub const PERCENTAGE_CEILING: f64 = 100.01;

/// Decimal places kept for percentage accumulators.
pub const PERCENTAGE_DECIMALS: u32 = 2;

/// How a value column is accumulated across scaffolds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnKind {
    /// Plain additive count or measure, truncated to an integer per row.
    Count,
    /// Percentage expressed over the count at position `base`.
    Percentage {
        /// Position of the absolute count this percentage was computed over.
        base: usize,
        /// Whether finalization re-derives it against the assembly length.
        scaled: bool,
    },
}

impl ColumnKind {
    pub fn is_percentage(&self) -> bool {
        matches!(self, ColumnKind::Percentage { .. })
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Count => write!(f, "count"),
            ColumnKind::Percentage { base, scaled: true } => write!(f, "percentage of #{}", base),
            ColumnKind::Percentage { base, scaled: false } => {
                write!(f, "unscaled percentage of #{}", base)
            }
        }
    }
}

/// Column layout of a per-scaffold report.
///
/// Positions are 1-based within the full row (position 0 is the
/// identifier); position 1 is always the scaffold length.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSchema {
    header_sentinel: String,
    columns: Vec<ColumnKind>,
    percentage_ceiling: f64,
    decimals: u32,
}

impl Default for ReportSchema {
    fn default() -> Self {
        Self::repeatmasker()
    }
}

impl ReportSchema {
    /// The layout written by the upstream RepeatMasker summary step.
    pub fn repeatmasker() -> Self {
        let columns = (1..=REPEATMASKER_VALUE_COLUMNS)
            .map(|position| {
                if REPEATMASKER_PERCENTAGE_COLUMNS.contains(&position) {
                    ColumnKind::Percentage {
                        base: position - 1,
                        scaled: position != GC_CONTENT_COLUMN,
                    }
                } else {
                    ColumnKind::Count
                }
            })
            .collect();

        Self {
            header_sentinel: HEADER_SENTINEL.to_string(),
            columns,
            percentage_ceiling: PERCENTAGE_CEILING,
            decimals: PERCENTAGE_DECIMALS,
        }
    }

    /// Build and validate a custom layout.
    pub fn new(
        header_sentinel: &str,
        value_columns: usize,
        percentage_columns: &[usize],
        unscaled_columns: &[usize],
        percentage_ceiling: f64,
        decimals: u32,
    ) -> Result<Self, AggregateError> {
        if header_sentinel.is_empty() {
            return Err(AggregateError::InvalidSchema(
                "header sentinel must not be empty".to_string(),
            ));
        }
        if value_columns == 0 {
            return Err(AggregateError::InvalidSchema(
                "at least one value column (the scaffold length) is required".to_string(),
            ));
        }
        if !percentage_ceiling.is_finite() || percentage_ceiling < 0.0 {
            return Err(AggregateError::InvalidSchema(format!(
                "percentage ceiling must be a non-negative number, got {}",
                percentage_ceiling
            )));
        }

        let mut columns = vec![ColumnKind::Count; value_columns];
        for &position in percentage_columns {
            if position < 2 || position > value_columns {
                return Err(AggregateError::InvalidSchema(format!(
                    "percentage column {} is outside 2..={}",
                    position, value_columns
                )));
            }
            columns[position - 1] = ColumnKind::Percentage {
                base: position - 1,
                scaled: !unscaled_columns.contains(&position),
            };
        }

        for (index, kind) in columns.iter().enumerate() {
            if let ColumnKind::Percentage { base, .. } = kind {
                if columns[base - 1].is_percentage() {
                    return Err(AggregateError::InvalidSchema(format!(
                        "percentage column {} is based on column {}, which is itself a percentage",
                        index + 1,
                        base
                    )));
                }
            }
        }

        if let Some(position) = unscaled_columns
            .iter()
            .find(|&&p| !percentage_columns.contains(&p))
        {
            return Err(AggregateError::InvalidSchema(format!(
                "unscaled column {} is not a percentage column",
                position
            )));
        }

        Ok(Self {
            header_sentinel: header_sentinel.to_string(),
            columns,
            percentage_ceiling,
            decimals,
        })
    }

    /// Number of value columns after the identifier.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Kind of the column at a 1-based row position.
    #[cfg(test)]
    pub fn kind(&self, position: usize) -> Option<ColumnKind> {
        position
            .checked_sub(1)
            .and_then(|index| self.columns.get(index))
            .copied()
    }

    /// Column kinds indexed by accumulator slot (position - 1).
    pub fn columns(&self) -> &[ColumnKind] {
        &self.columns
    }

    pub fn header_sentinel(&self) -> &str {
        &self.header_sentinel
    }

    /// Whether a raw line is a header line.
    pub fn is_header(&self, line: &str) -> bool {
        line.as_bytes()
            .starts_with(self.header_sentinel.as_bytes())
    }

    pub fn percentage_ceiling(&self) -> f64 {
        self.percentage_ceiling
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }
}

/// A finalized cell of a summary row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SummaryValue {
    /// Exact integer total of a count column.
    Count(i64),
    /// Percentage, or the unscaled weighted sum for GC content.
    Percentage(f64),
}

/// One output row: the summary of every scaffold of one assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblySummary {
    /// Input path as given on the command line.
    pub name: String,
    /// Number of data rows (scaffolds/chromosomes) seen.
    pub scaffolds: usize,
    /// Total assembly length from the length column.
    pub assembly_len: u64,
    /// Finalized values, in input column order.
    pub values: Vec<SummaryValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeatmasker_layout() {
        let schema = ReportSchema::repeatmasker();
        assert_eq!(schema.width(), 67);
        assert_eq!(schema.header_sentinel(), "filename");
        assert_eq!(schema.kind(1), Some(ColumnKind::Count));
        assert_eq!(schema.kind(2), Some(ColumnKind::Count));
        assert_eq!(
            schema.kind(3),
            Some(ColumnKind::Percentage {
                base: 2,
                scaled: false
            })
        );
        assert_eq!(
            schema.kind(67),
            Some(ColumnKind::Percentage {
                base: 66,
                scaled: true
            })
        );
        assert_eq!(schema.kind(0), None);
        assert_eq!(schema.kind(68), None);

        let percentages = schema.columns().iter().filter(|k| k.is_percentage()).count();
        assert_eq!(percentages, REPEATMASKER_PERCENTAGE_COLUMNS.len());
    }

    #[test]
    fn test_custom_schema_matches_builtin() {
        let schema = ReportSchema::new(
            HEADER_SENTINEL,
            REPEATMASKER_VALUE_COLUMNS,
            &REPEATMASKER_PERCENTAGE_COLUMNS,
            &[GC_CONTENT_COLUMN],
            PERCENTAGE_CEILING,
            PERCENTAGE_DECIMALS,
        )
        .unwrap();
        assert_eq!(schema, ReportSchema::repeatmasker());
    }

    #[test]
    fn test_schema_rejects_length_as_percentage() {
        let result = ReportSchema::new("filename", 5, &[1], &[], 100.01, 2);
        assert!(matches!(result, Err(AggregateError::InvalidSchema(_))));
    }

    #[test]
    fn test_schema_rejects_out_of_range_column() {
        let result = ReportSchema::new("filename", 5, &[3, 6], &[], 100.01, 2);
        assert!(matches!(result, Err(AggregateError::InvalidSchema(_))));
    }

    #[test]
    fn test_schema_rejects_chained_percentages() {
        let result = ReportSchema::new("filename", 5, &[3, 4], &[], 100.01, 2);
        assert!(matches!(result, Err(AggregateError::InvalidSchema(_))));
    }

    #[test]
    fn test_schema_rejects_unscaled_count() {
        let result = ReportSchema::new("filename", 5, &[3], &[4], 100.01, 2);
        assert!(matches!(result, Err(AggregateError::InvalidSchema(_))));
    }

    #[test]
    fn test_is_header() {
        let schema = ReportSchema::repeatmasker();
        assert!(schema.is_header("filename\tlength\n"));
        assert!(schema.is_header("filenames"));
        assert!(!schema.is_header("scaffold_1\t100"));
        assert!(!schema.is_header("file"));
    }

    #[test]
    fn test_column_kind_display() {
        assert_eq!(ColumnKind::Count.to_string(), "count");
        assert_eq!(
            ColumnKind::Percentage {
                base: 4,
                scaled: true
            }
            .to_string(),
            "percentage of #4"
        );
    }
}
