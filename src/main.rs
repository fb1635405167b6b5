//! rmcompare - RepeatMasker comparison table builder
//!
//! Reads one per-scaffold repeat annotation report per assembly and writes
//! a single table with one summary row per assembly. Count columns are
//! summed; percentage columns are re-derived from the absolute counts they
//! were computed over and the total assembly length.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid arguments, configuration, or report content

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod scanner;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("rmcompare v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Comparison failed: {:#}", e);
        eprintln!("\nError: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .rmcompare.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("Created {} with the RepeatMasker report layout.", DEFAULT_CONFIG_FILE);
    println!("   Edit [schema] to describe a different column layout.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the comparison, or the dry run.
fn run(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let schema = config
        .schema
        .to_schema()
        .context("Invalid [schema] configuration")?;
    debug!(
        "Schema: {} value columns, sentinel '{}'",
        schema.width(),
        schema.header_sentinel()
    );

    if args.dry_run {
        return handle_dry_run(&args.inputs, &schema);
    }

    let output = PathBuf::from(&config.general.output);

    let progress = if args.quiet {
        None
    } else {
        Some(create_progress_bar(args.inputs.len() as u64))
    };

    info!(
        "Comparing {} assemblies into {}",
        args.inputs.len(),
        output.display()
    );
    let result =
        analysis::compare_assemblies(&args.inputs, &output, &schema, progress.as_ref());

    if let Some(ref bar) = progress {
        bar.finish_and_clear();
    }

    let summaries = result
        .with_context(|| format!("Failed to build comparison table {}", output.display()))?;

    println!(
        "Wrote {} assembly rows to {} in {:.1}s",
        summaries.len(),
        output.display(),
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Handle --dry-run: summarize every report, print totals, write nothing.
fn handle_dry_run(inputs: &[PathBuf], schema: &models::ReportSchema) -> Result<()> {
    println!("Dry run: validating {} reports (no table is written)\n", inputs.len());

    for summary in analysis::validate_assemblies(inputs, schema)? {
        println!(
            "   {}: {} scaffolds, {} bp",
            summary.name, summary.scaffolds, summary.assembly_len
        );
    }

    println!("\nDry run complete. All reports are valid.");
    Ok(())
}

fn create_progress_bar(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    match ProgressStyle::default_bar().template("{bar:40.cyan/blue} {pos}/{len} {msg}") {
        Ok(style) => bar.set_style(style),
        Err(e) => warn!("Invalid progress bar template: {}", e),
    }
    bar
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location; a file that exists but does not parse is fatal
    match Config::load_default()? {
        Some(config) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
