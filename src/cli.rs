//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::report::is_same_file;
use clap::Parser;
use std::path::PathBuf;

/// rmcompare - RepeatMasker comparison table across assemblies
///
/// Summarizes per-scaffold repeat statistics of each assembly into one row
/// and writes all rows, in input order, to a single tab-separated table.
///
/// Examples:
///   rmcompare -o comparison.tsv asm1.rm.tsv asm2.rm.tsv
///   rmcompare --dry-run asm1.rm.tsv asm2.rm.tsv
///   rmcompare --config schema.toml -o comparison.tsv reports/*.tsv
///   rmcompare --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Per-scaffold report files, one per assembly
    ///
    /// Output rows follow this order. The header is taken from the first file.
    #[arg(value_name = "REPORT", required_unless_present = "init_config")]
    pub inputs: Vec<PathBuf>,

    /// Output file path for the comparison table
    ///
    /// Defaults to the config file setting, or repeatmasker_comparison.tsv
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .rmcompare.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only, no progress bar)
    #[arg(short, long)]
    pub quiet: bool,

    /// Validate and summarize every report without writing the table
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .rmcompare.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.inputs.is_empty() {
            return Err("At least one report file is required".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        for input in &self.inputs {
            if !input.exists() {
                return Err(format!("Report file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Report path is not a file: {}", input.display()));
            }
        }

        // The table is truncated before any report is read
        if let Some(ref output) = self.output {
            if self.inputs.iter().any(|input| is_same_file(input, output)) {
                return Err(format!(
                    "Output file is also an input: {}",
                    output.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_args(inputs: Vec<PathBuf>) -> Args {
        Args {
            inputs,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_positional_inputs() {
        let args = Args::try_parse_from(["rmcompare", "-o", "out.tsv", "a.tsv", "b.tsv"]).unwrap();
        assert_eq!(args.inputs, vec![PathBuf::from("a.tsv"), PathBuf::from("b.tsv")]);
        assert_eq!(args.output, Some(PathBuf::from("out.tsv")));
    }

    #[test]
    fn test_inputs_required_unless_init_config() {
        assert!(Args::try_parse_from(["rmcompare"]).is_err());
        assert!(Args::try_parse_from(["rmcompare", "--init-config"]).is_ok());
    }

    #[test]
    fn test_validation_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let args = make_args(vec![temp_dir.path().join("missing.tsv")]);
        assert!(args.validate().is_err());

        let args = make_args(vec![temp_dir.path().to_path_buf()]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_output_overwrites_input() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("asm.tsv");
        std::fs::write(&input, "filename\n").unwrap();

        let mut args = make_args(vec![input.clone()]);
        assert!(args.validate().is_ok());

        args.output = Some(input);
        assert!(args.validate().is_err());

        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        args.output = Some(temp_dir.path().join("nested").join("..").join("asm.tsv"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("asm.tsv");
        std::fs::write(&input, "filename\n").unwrap();

        let mut args = make_args(vec![input]);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(vec![]);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
