//! Per-assembly aggregation of scaffold rows.
//!
//! Count columns are summed as integers. A percentage cannot be summed
//! across scaffolds of different size, so each percentage column instead
//! accumulates the absolute count it was computed over, and the assembly
//! percentage is re-derived from that sum and the total assembly length.

use crate::analysis::AggregateError;
use crate::models::{AssemblySummary, ColumnKind, ReportSchema, SummaryValue};
use crate::report::{is_same_file, ComparisonTable};
use crate::scanner::{DataRow, ReportScanner};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Smallest count representable as `i64` (-2^63, exact in `f64`).
const I64_MIN_F64: f64 = i64::MIN as f64;
/// First value past `i64::MAX` (2^63, exact in `f64`).
const I64_BOUND_F64: f64 = 9_223_372_036_854_775_808.0;

/// Round to `decimals` places from the exact binary value, ties to even.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Running totals for one assembly.
#[derive(Debug, Clone)]
pub struct AccumulatorState {
    assembly_len: u64,
    sums: Vec<SummaryValue>,
}

impl AccumulatorState {
    /// Fresh state for an assembly whose total length is already known.
    pub fn new(schema: &ReportSchema, assembly_len: u64) -> Self {
        let sums = schema
            .columns()
            .iter()
            .map(|kind| match kind {
                ColumnKind::Count => SummaryValue::Count(0),
                ColumnKind::Percentage { .. } => SummaryValue::Percentage(0.0),
            })
            .collect();

        Self { assembly_len, sums }
    }

    /// Add one scaffold row.
    ///
    /// Percentage accumulators are rounded after every row, so rounding
    /// error compounds across rows exactly as in existing comparison tables.
    pub fn add_row(
        &mut self,
        schema: &ReportSchema,
        row: &DataRow<'_>,
    ) -> Result<(), AggregateError> {
        let values = row.values()?;
        let ceiling = schema.percentage_ceiling();

        for (index, kind) in schema.columns().iter().enumerate() {
            let position = index + 1;
            let value = values[index];

            match (kind, &mut self.sums[index]) {
                (ColumnKind::Count, SummaryValue::Count(sum)) => {
                    if !value.is_finite() {
                        return Err(row.malformed(format!(
                            "column {} count '{}' is not finite",
                            position, value
                        )));
                    }
                    let truncated = value.trunc();
                    if !(I64_MIN_F64..I64_BOUND_F64).contains(&truncated) {
                        return Err(row.malformed(format!(
                            "column {} count '{}' does not fit in a 64-bit integer",
                            position, value
                        )));
                    }
                    *sum = sum.checked_add(truncated as i64).ok_or_else(|| {
                        row.malformed(format!("column {} total overflows", position))
                    })?;
                }
                (ColumnKind::Percentage { base, .. }, SummaryValue::Percentage(sum)) => {
                    if !(0.0..=ceiling).contains(&value) {
                        return Err(AggregateError::PercentageOutOfRange {
                            path: row.path().to_path_buf(),
                            line: row.line,
                            column: position,
                            value,
                            ceiling,
                        });
                    }
                    if value > 100.0 {
                        debug!(
                            "{} line {} ({}): column {} is {} (above 100, within tolerance)",
                            row.path().display(),
                            row.line,
                            row.identifier(),
                            position,
                            value
                        );
                    }
                    *sum += values[base - 1];
                }
                _ => unreachable!("accumulator kinds follow the schema"),
            }
        }

        let decimals = schema.decimals();
        for sum in &mut self.sums {
            if let SummaryValue::Percentage(value) = sum {
                *value = round_to(*value, decimals);
            }
        }

        Ok(())
    }

    /// Turn the running totals into a summary row.
    ///
    /// Scaled percentage columns become `100 * sum / assembly_len`; unscaled
    /// ones (GC content) keep their accumulated value.
    pub fn finalize(
        mut self,
        schema: &ReportSchema,
        path: &Path,
        scaffolds: usize,
    ) -> Result<AssemblySummary, AggregateError> {
        if self.assembly_len == 0 {
            return Err(AggregateError::EmptyAssembly {
                path: path.to_path_buf(),
            });
        }

        let total = self.assembly_len as f64;
        for (kind, sum) in schema.columns().iter().zip(self.sums.iter_mut()) {
            if let (ColumnKind::Percentage { scaled: true, .. }, SummaryValue::Percentage(value)) =
                (kind, sum)
            {
                *value = round_to(100.0 * *value / total, schema.decimals());
            }
        }

        Ok(AssemblySummary {
            name: path.display().to_string(),
            scaffolds,
            assembly_len: self.assembly_len,
            values: self.sums,
        })
    }
}

/// Length pass: total assembly length and scaffold count.
pub fn measure_assembly(scanner: &ReportScanner<'_>) -> Result<(u64, usize), AggregateError> {
    let mut assembly_len: u64 = 0;
    let mut scaffolds = 0;

    scanner.for_each_row(|row| {
        let length = row.length()?;
        assembly_len = assembly_len
            .checked_add(length)
            .ok_or_else(|| row.malformed("assembly length overflows".to_string()))?;
        scaffolds += 1;
        Ok(())
    })?;

    debug!(
        "{}: {} scaffolds, {} bp",
        scanner.path().display(),
        scaffolds,
        assembly_len
    );
    Ok((assembly_len, scaffolds))
}

/// Summarize every scaffold of one report into a single row.
///
/// The file is read twice: the percentage re-derivation needs the total
/// assembly length before rows are accumulated.
pub fn summarize_assembly(
    path: &Path,
    schema: &ReportSchema,
) -> Result<AssemblySummary, AggregateError> {
    let scanner = ReportScanner::new(path, schema);
    let (assembly_len, scaffolds) = measure_assembly(&scanner)?;

    let mut state = AccumulatorState::new(schema, assembly_len);
    scanner.for_each_row(|row| state.add_row(schema, row))?;

    state.finalize(schema, path, scaffolds)
}

/// Build the comparison table for `inputs`, in order, at `output`.
///
/// The header comes from the first input. Each summary row is appended as
/// soon as its assembly is done, so rows of earlier assemblies survive a
/// failure on a later one.
pub fn compare_assemblies(
    inputs: &[PathBuf],
    output: &Path,
    schema: &ReportSchema,
    progress: Option<&ProgressBar>,
) -> Result<Vec<AssemblySummary>, AggregateError> {
    let first = inputs.first().ok_or(AggregateError::NoInputs)?;
    if inputs.iter().any(|input| is_same_file(input, output)) {
        return Err(AggregateError::OutputIsInput {
            path: output.to_path_buf(),
        });
    }
    let header = ReportScanner::new(first, schema).read_header()?;
    let table = ComparisonTable::create(output, &header)?;

    let mut summaries = Vec::with_capacity(inputs.len());
    for input in inputs {
        if let Some(bar) = progress {
            bar.set_message(input.display().to_string());
        }

        let summary = summarize_assembly(input, schema)?;
        table.append(&summary)?;
        info!(
            "Summarized {} ({} scaffolds, {} bp)",
            summary.name, summary.scaffolds, summary.assembly_len
        );

        if let Some(bar) = progress {
            bar.inc(1);
        }
        summaries.push(summary);
    }

    Ok(summaries)
}

/// Check every report without writing a table.
///
/// Applies the same header and row checks as [`compare_assemblies`] and
/// returns the summaries it would have written.
pub fn validate_assemblies(
    inputs: &[PathBuf],
    schema: &ReportSchema,
) -> Result<Vec<AssemblySummary>, AggregateError> {
    let first = inputs.first().ok_or(AggregateError::NoInputs)?;
    ReportScanner::new(first, schema).read_header()?;

    inputs
        .iter()
        .map(|input| summarize_assembly(input, schema))
        .collect()
}
