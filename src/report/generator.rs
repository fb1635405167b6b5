//! Comparison table generation.
//!
//! The table is plain tab-separated text: the header line of the first
//! report, then one summary row per assembly. Cells are rendered the way
//! existing comparison tables were written, so regenerated tables diff
//! cleanly against older ones.

use crate::analysis::AggregateError;
use crate::models::{AssemblySummary, SummaryValue};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Append-only comparison table on disk.
#[derive(Debug)]
pub struct ComparisonTable {
    path: PathBuf,
}

impl ComparisonTable {
    /// Create (or truncate) the table and write its header line.
    pub fn create(path: &Path, header: &str) -> Result<Self, AggregateError> {
        let mut file = File::create(path).map_err(|e| AggregateError::io(path, e))?;
        file.write_all(header.as_bytes())
            .map_err(|e| AggregateError::io(path, e))?;
        if !header.ends_with('\n') {
            file.write_all(b"\n")
                .map_err(|e| AggregateError::io(path, e))?;
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Append one summary row.
    ///
    /// The file is reopened for every row so completed rows are on disk
    /// even if a later assembly fails.
    pub fn append(&self, summary: &AssemblySummary) -> Result<(), AggregateError> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| AggregateError::io(&self.path, e))?;
        file.write_all(render_row(summary).as_bytes())
            .map_err(|e| AggregateError::io(&self.path, e))
    }
}

/// Whether two paths name the same existing file.
///
/// Paths that cannot be resolved (a table not yet created) fall back to a
/// plain path comparison.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Render a summary as a newline-terminated table row.
pub fn render_row(summary: &AssemblySummary) -> String {
    let mut row = summary.name.clone();
    for value in &summary.values {
        row.push('\t');
        row.push_str(&render_value(value));
    }
    row.push('\n');
    row
}

/// Render one cell.
pub fn render_value(value: &SummaryValue) -> String {
    match value {
        SummaryValue::Count(count) => count.to_string(),
        SummaryValue::Percentage(percentage) => format_float(*percentage),
    }
}

/// Shortest round-trip decimal, always with a fractional part, switching
/// to `1e+16` / `1.5e-05` exponent form outside `[1e-4, 1e16)`.
fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) {
        return format!("{:?}", value);
    }

    let scientific = format!("{:e}", value);
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => scientific,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_summary() -> AssemblySummary {
        AssemblySummary {
            name: "results/asm1.tsv".to_string(),
            scaffolds: 2,
            assembly_len: 400,
            values: vec![
                SummaryValue::Count(400),
                SummaryValue::Count(160),
                SummaryValue::Percentage(160.0),
                SummaryValue::Count(90),
                SummaryValue::Percentage(22.5),
            ],
        }
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(22.5), "22.5");
        assert_eq!(format_float(160.0), "160.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(123456789.0), "123456789.0");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1.5e-5), "1.5e-05");
        assert_eq!(format_float(2.5e120), "2.5e+120");
    }

    #[test]
    fn test_render_row() {
        let row = render_row(&create_test_summary());
        assert_eq!(row, "results/asm1.tsv\t400\t160\t160.0\t90\t22.5\n");
    }

    #[test]
    fn test_table_header_then_appended_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("comparison.tsv");
        std::fs::write(&path, "stale content\n").unwrap();

        let table = ComparisonTable::create(&path, "filename\tlength\r\n").unwrap();
        table.append(&create_test_summary()).unwrap();
        table.append(&create_test_summary()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "filename\tlength\r\n\
             results/asm1.tsv\t400\t160\t160.0\t90\t22.5\n\
             results/asm1.tsv\t400\t160\t160.0\t90\t22.5\n"
        );
    }

    #[test]
    fn test_is_same_file_resolves_aliases() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("asm.tsv");
        std::fs::write(&path, "filename\n").unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        let aliased = temp_dir.path().join("nested").join("..").join("asm.tsv");

        assert!(is_same_file(&path, &aliased));
        assert!(is_same_file(&path, &path));
        assert!(!is_same_file(&path, &temp_dir.path().join("other.tsv")));
        assert!(!is_same_file(&path, temp_dir.path()));
    }

    #[test]
    fn test_unterminated_header_gets_newline() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("comparison.tsv");

        ComparisonTable::create(&path, "filename\tlength").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "filename\tlength\n");
    }
}
