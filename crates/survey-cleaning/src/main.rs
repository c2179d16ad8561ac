//! CLI entry point for the survey cleaning engine.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use std::path::Path;
use survey_cleaning::config::{
    CleaningMode, KeepStrategy, MissingDataStrategy, OutlierAction, OutlierMethod, SpeederMethod,
};
use survey_cleaning::ingest::{self, ColumnTypeOverrides};
use survey_cleaning::{
    AutoCleaner, CleaningOutcome, CleaningSettings, CleaningSettingsBuilder, Dataset, Detector,
    JsonFileTemplateStore, ReportFormat, ReportGenerator, TemplateStore,
};
use tracing::{info, warn};

#[cfg(feature = "advisory")]
use std::env;
#[cfg(feature = "advisory")]
use survey_cleaning::advisory::HttpAdvisor;

/// Report formats selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliReportFormat {
    Md,
    Json,
    Both,
}

impl CliReportFormat {
    fn formats(self) -> Vec<ReportFormat> {
        match self {
            Self::Md => vec![ReportFormat::Markdown],
            Self::Json => vec![ReportFormat::Json],
            Self::Both => vec![ReportFormat::Markdown, ReportFormat::Json],
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMode {
    /// Detect and remediate
    Auto,
    /// Detect only
    Manual,
}

impl From<CliMode> for CleaningMode {
    fn from(cli: CliMode) -> Self {
        match cli {
            CliMode::Auto => CleaningMode::Auto,
            CliMode::Manual => CleaningMode::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliKeepStrategy {
    First,
    Last,
    MostComplete,
}

impl From<CliKeepStrategy> for KeepStrategy {
    fn from(cli: CliKeepStrategy) -> Self {
        match cli {
            CliKeepStrategy::First => KeepStrategy::First,
            CliKeepStrategy::Last => KeepStrategy::Last,
            CliKeepStrategy::MostComplete => KeepStrategy::MostComplete,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSpeederMethod {
    Absolute,
    Percentile,
    MedianMultiple,
}

impl From<CliSpeederMethod> for SpeederMethod {
    fn from(cli: CliSpeederMethod) -> Self {
        match cli {
            CliSpeederMethod::Absolute => SpeederMethod::Absolute,
            CliSpeederMethod::Percentile => SpeederMethod::Percentile,
            CliSpeederMethod::MedianMultiple => SpeederMethod::MedianMultiple,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierMethod {
    Iqr,
    Zscore,
}

impl From<CliOutlierMethod> for OutlierMethod {
    fn from(cli: CliOutlierMethod) -> Self {
        match cli {
            CliOutlierMethod::Iqr => OutlierMethod::Iqr,
            CliOutlierMethod::Zscore => OutlierMethod::ZScore,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutlierAction {
    /// Remove rows containing outliers
    Remove,
    /// Winsorize to the 5th/95th percentiles
    Cap,
    /// Keep outliers and report them
    Flag,
}

impl From<CliOutlierAction> for OutlierAction {
    fn from(cli: CliOutlierAction) -> Self {
        match cli {
            CliOutlierAction::Remove => OutlierAction::Remove,
            CliOutlierAction::Cap => OutlierAction::Cap,
            CliOutlierAction::Flag => OutlierAction::Flag,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMissingStrategy {
    Leave,
    ImputeMean,
    ImputeMedian,
    ImputeMode,
    Remove,
}

impl From<CliMissingStrategy> for MissingDataStrategy {
    fn from(cli: CliMissingStrategy) -> Self {
        match cli {
            CliMissingStrategy::Leave => MissingDataStrategy::Leave,
            CliMissingStrategy::ImputeMean => MissingDataStrategy::ImputeMean,
            CliMissingStrategy::ImputeMedian => MissingDataStrategy::ImputeMedian,
            CliMissingStrategy::ImputeMode => MissingDataStrategy::ImputeMode,
            CliMissingStrategy::Remove => MissingDataStrategy::Remove,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Survey response data cleaning",
    long_about = "Detects duplicates, speeders, straight-liners, outliers, missing data and \
                  low-quality text in survey exports, and cleans them.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  ADVISOR_API_KEY    Bearer key for --advisor-url (optional)\n\n\
                  EXAMPLES:\n  \
                  # Clean with defaults\n  \
                  survey-cleaning -i responses.csv\n\n  \
                  # Preview detected issues only\n  \
                  survey-cleaning -i responses.csv --dry-run\n\n  \
                  # Use a saved template and emit both report formats\n  \
                  survey-cleaning -i responses.csv --templates templates.json --template strict --format both"
)]
struct Args {
    /// Path to the CSV export to clean
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned CSV and reports
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// JSON file with cleaning settings (partial settings are accepted)
    #[arg(long, conflicts_with = "template")]
    settings: Option<String>,

    /// Id of a saved template to use as settings
    #[arg(long, requires = "templates")]
    template: Option<String>,

    /// Template store file
    #[arg(long)]
    templates: Option<String>,

    /// Override an inferred column type, e.g. `--column-type Q1=categorical`
    #[arg(long = "column-type", value_name = "NAME=TYPE")]
    column_types: Vec<String>,

    /// Report format(s) to write
    #[arg(long, value_enum, default_value = "md")]
    format: CliReportFormat,

    /// Only run the detectors and print what was found
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON to stdout
    ///
    /// Disables all logging so stdout only carries the report.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Endpoint of a settings advisor
    #[arg(long)]
    advisor_url: Option<String>,

    #[arg(long, value_enum)]
    mode: Option<CliMode>,

    #[arg(long, value_enum)]
    keep_strategy: Option<CliKeepStrategy>,

    #[arg(long, value_enum)]
    speeder_method: Option<CliSpeederMethod>,

    #[arg(long, value_enum)]
    outlier_method: Option<CliOutlierMethod>,

    #[arg(long, value_enum)]
    outlier_action: Option<CliOutlierAction>,

    #[arg(long, value_enum)]
    missing_strategy: Option<CliMissingStrategy>,

    /// Missing-data threshold in percent (0 - 100)
    #[arg(long)]
    missing_threshold: Option<f64>,

    /// Keep an untouched copy of the input (written as <name>-original.csv)
    #[arg(long)]
    preserve_original: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so that only
/// JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let overrides = ColumnTypeOverrides::parse_pairs(&args.column_types)?;
    info!("Loading dataset from: {}", args.input);
    let dataset = ingest::read_csv(&args.input, &overrides)?;

    let settings = resolve_settings(&args)?;

    let mut builder = AutoCleaner::builder();
    if !args.quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let cleaner = builder.build();

    if args.dry_run {
        run_dry_run(&args, &cleaner, &dataset, &settings);
        return Ok(());
    }

    let outcome = run_cleaner(&args, &cleaner, &dataset, &settings)?;
    handle_output(&outcome, &args)
}

/// Settings from a file or template, with CLI flags applied on top.
fn resolve_settings(args: &Args) -> Result<CleaningSettings> {
    let base = match (&args.settings, &args.template, &args.templates) {
        (Some(path), _, _) => {
            info!("Using settings from {}", path);
            CleaningSettings::from_json_file(path)?
        }
        (None, Some(id), Some(store_path)) => {
            let store = JsonFileTemplateStore::open(store_path)?;
            info!("Using template '{}' from {}", id, store_path);
            store.use_template(id)?
        }
        _ => CleaningSettings::default(),
    };

    let mut builder = CleaningSettingsBuilder::from_settings(base);
    if let Some(mode) = args.mode {
        builder = builder.mode(mode.into());
    }
    if let Some(strategy) = args.keep_strategy {
        builder = builder.keep_strategy(strategy.into());
    }
    if let Some(method) = args.speeder_method {
        builder = builder.speeder_method(method.into());
    }
    if let Some(method) = args.outlier_method {
        builder = builder.outlier_method(method.into());
    }
    if let Some(action) = args.outlier_action {
        builder = builder.outlier_action(action.into());
    }
    if let Some(strategy) = args.missing_strategy {
        builder = builder.missing_strategy(strategy.into());
    }
    if let Some(threshold) = args.missing_threshold {
        builder = builder.missing_threshold(threshold);
    }
    if args.preserve_original {
        builder = builder.preserve_original(true);
    }

    Ok(builder.build()?)
}

#[cfg(feature = "advisory")]
fn run_cleaner(
    args: &Args,
    cleaner: &AutoCleaner,
    dataset: &Dataset,
    settings: &CleaningSettings,
) -> Result<CleaningOutcome> {
    if let Some(url) = &args.advisor_url {
        let api_key = env::var("ADVISOR_API_KEY").ok();
        if api_key.is_none() {
            warn!("ADVISOR_API_KEY not set. Calling advisor without authentication.");
        }
        info!("Requesting recommended settings from {}", url);
        let advisor = HttpAdvisor::new(url.clone(), api_key)?;
        return Ok(cleaner.run_with_advisor(dataset, settings, &advisor)?);
    }
    Ok(cleaner.run(dataset, settings)?)
}

/// Run without advisory support (fallback when the "advisory" feature is disabled)
#[cfg(not(feature = "advisory"))]
fn run_cleaner(
    args: &Args,
    cleaner: &AutoCleaner,
    dataset: &Dataset,
    settings: &CleaningSettings,
) -> Result<CleaningOutcome> {
    if args.advisor_url.is_some() {
        warn!("Advisory support not compiled in. Ignoring --advisor-url.");
    }
    Ok(cleaner.run(dataset, settings)?)
}

/// Print what the detectors found without changing anything.
///
/// Uses `println!` intentionally: this is the command's primary output and
/// must be visible regardless of log level.
fn run_dry_run(args: &Args, cleaner: &AutoCleaner, dataset: &Dataset, settings: &CleaningSettings) {
    let pass = cleaner.detect(dataset, settings);

    if args.json {
        match serde_json::to_string_pretty(&pass.issues) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to serialize issues: {}", e),
        }
        return;
    }

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Detected issues");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", dataset.row_count());
    println!("  Columns: {}", dataset.column_count());
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    for column in dataset.columns() {
        println!("  {:<30} {}", truncate_str(&column.name, 29), column.column_type.as_str());
    }
    println!();

    println!("ISSUES");
    println!("{}", "-".repeat(40));
    for detector in Detector::ALL {
        println!(
            "  {:<16} {}",
            detector.display_name(),
            pass.issues.count(detector)
        );
    }
    println!("  Rows flagged: {}", pass.issues.flagged_rows().len());
    println!();

    for warning in &pass.warnings {
        println!("  WARNING: {}", warning);
    }
    for error in &pass.errors {
        println!("  ERROR: {}", error);
    }

    println!("{}", "=".repeat(80));
    println!("To clean the dataset, run without --dry-run");
    println!("{}", "=".repeat(80));
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Write the cleaned CSV and reports, then print the result.
///
/// - Default: human-readable summary on stdout
/// - `--json`: the report as JSON on stdout, nothing else
fn handle_output(outcome: &CleaningOutcome, args: &Args) -> Result<()> {
    let stem = extract_file_stem(&args.input);
    let output_dir = Path::new(&args.output);
    std::fs::create_dir_all(output_dir)?;

    let cleaned_path = output_dir.join(format!("{}-cleaned.csv", stem));
    ingest::write_csv(&outcome.cleaned, &cleaned_path)?;

    if let Some(original) = &outcome.original {
        ingest::write_csv(original, output_dir.join(format!("{}-original.csv", stem)))?;
    }

    let mut report_paths = Vec::new();
    for format in args.format.formats() {
        report_paths.push(ReportGenerator::write_report(
            &outcome.report,
            output_dir,
            &stem,
            format,
        )?);
    }

    if args.json {
        println!("{}", ReportGenerator::to_json(&outcome.report)?);
        return Ok(());
    }

    let report = &outcome.report;
    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    for line in report.summary_lines() {
        println!("  {}", line);
    }
    println!();

    if !report.actions.is_empty() {
        println!("Actions:");
        for action in &report.actions {
            println!("  - {}", action.description);
        }
        println!();
    }
    for warning in &report.warnings {
        println!("WARNING: {}", warning);
    }
    for error in &report.errors {
        println!("ERROR: {}", error);
    }

    println!("Cleaned data: {}", cleaned_path.display());
    for path in &report_paths {
        println!("Report:       {}", path.display());
    }
    println!("Duration: {}ms", report.execution_time_ms);

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}
