//! CLI entry point for the data analysis studio.

use anyhow::{Result, anyhow};
use clap::Parser;
use data_studio::{
    DataCleaner, build_markdown_report, cleaned_csv_bytes, cleaned_data_file_name,
    export_timestamp, ingest_bytes, report_file_name,
};
use data_studio::{CleaningReport, IngestionResult};
use dotenv::dotenv;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "End-to-End Data Analysis Studio",
    long_about = "Upload raw files (CSV, Excel, JSON, Parquet, PDF, TXT, TSV), auto-clean them,\n\
                  run EDA, and export reports and dashboard assets.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  AWS_ACCESS_KEY_ID       Access key for S3 export\n  \
                  AWS_SECRET_ACCESS_KEY   Secret key for S3 export\n\n\
                  EXAMPLES:\n  \
                  # Clean a CSV and write the report next to it\n  \
                  data-studio -i sales.csv -o outputs/\n\n  \
                  # Also render dashboard charts\n  \
                  data-studio -i sales.xlsx --charts\n\n  \
                  # Upload cleaned data + report to S3\n  \
                  data-studio -i sales.csv --s3-bucket my-bucket --s3-prefix analysis-outputs"
)]
struct Args {
    /// Path to the file to analyze
    #[arg(short, long)]
    input: String,

    /// Output directory for the cleaned dataset, report, and charts
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Render dashboard charts (distribution, categories, correlation, trend)
    #[arg(long)]
    charts: bool,

    /// S3 bucket for optional cloud export
    #[arg(long)]
    s3_bucket: Option<String>,

    /// Key prefix for uploaded objects
    #[arg(long, default_value = "analysis-outputs")]
    s3_prefix: String,

    /// AWS region of the bucket
    #[arg(long, default_value = "us-east-1")]
    s3_region: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
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
    init_logging(&args.log_level, args.quiet);
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let bytes = fs::read(&args.input)?;
    let file_name = Path::new(&args.input)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&args.input);

    let ingested = ingest_bytes(file_name, &bytes)?;
    for note in &ingested.notes {
        info!("Ingestion note: {}", note);
    }

    if ingested.dataframe.height() == 0 {
        warn!("No rows were extracted from this file");
        return Err(data_studio::AnalysisError::EmptyResult.into());
    }

    let (cleaned, cleaning_report) = DataCleaner::clean(&ingested.dataframe)?;

    let out_dir = PathBuf::from(&args.output);
    fs::create_dir_all(&out_dir)?;

    let stem = extract_file_stem(&args.input);
    let timestamp = export_timestamp();

    let mut cleaned_for_csv = cleaned.clone();
    let csv_bytes = cleaned_csv_bytes(&mut cleaned_for_csv)?;
    let csv_path = out_dir.join(cleaned_data_file_name(&stem));
    fs::write(&csv_path, &csv_bytes)?;
    info!("Cleaned dataset written to {}", csv_path.display());

    let report_md = build_markdown_report(
        &ingested.dataframe,
        &cleaned,
        &cleaning_report.transformations,
        ingested.format,
        &ingested.notes,
    )?;
    let report_path = out_dir.join(report_file_name(&timestamp));
    fs::write(&report_path, report_md.as_bytes())?;
    info!("Report written to {}", report_path.display());

    let mut chart_paths = Vec::new();
    if args.charts {
        chart_paths = render_charts(&cleaned, &out_dir)?;
        for path in &chart_paths {
            info!("Chart written to {}", path.display());
        }
    }

    let mut uploaded = Vec::new();
    if args.s3_bucket.is_some() {
        uploaded = upload_artifacts(&args, &csv_bytes, report_md.as_bytes(), &stem, &timestamp)?;
    }

    print_snapshot(
        &args,
        &ingested,
        &cleaned,
        &cleaning_report,
        &csv_path,
        &report_path,
        &chart_paths,
        &uploaded,
    );

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string()
}

/// Render the dashboard charts for the first column of each relevant kind,
/// mirroring the single-selection dashboard of the interactive UI.
fn render_charts(df: &DataFrame, out_dir: &Path) -> Result<Vec<PathBuf>> {
    use data_studio::utils::{is_datetime_dtype, is_numeric_dtype};
    use data_studio::{categorical_plot, correlation_heatmap, distribution_plot, time_series_plot};

    let numeric: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();
    let categorical: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::String)
        .map(|c| c.name().to_string())
        .collect();
    let datetime: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_datetime_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();

    let mut written = Vec::new();
    let mut record = |path: PathBuf, result: data_studio::Result<()>| match result {
        Ok(()) => written.push(path),
        Err(e) => warn!("Skipping chart {}: {}", path.display(), e),
    };

    if let Some(col) = numeric.first() {
        let path = out_dir.join(format!("distribution_{}.png", sanitize(col)));
        let result = distribution_plot(df, col, &path);
        record(path, result);
    }

    if let Some(col) = categorical.first() {
        let path = out_dir.join(format!("categories_{}.png", sanitize(col)));
        let result = categorical_plot(df, col, &path);
        record(path, result);
    }

    let heatmap_path = out_dir.join("correlation_heatmap.png");
    match correlation_heatmap(df, &heatmap_path) {
        Ok(true) => record(heatmap_path, Ok(())),
        Ok(false) => {}
        Err(e) => record(heatmap_path, Err(e)),
    }

    if let (Some(time_col), Some(value_col)) = (datetime.first(), numeric.first()) {
        let path = out_dir.join(format!(
            "trend_{}_{}.png",
            sanitize(time_col),
            sanitize(value_col)
        ));
        let result = time_series_plot(df, time_col, value_col, &path);
        record(path, result);
    }

    Ok(written)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[cfg(feature = "cloud")]
fn upload_artifacts(
    args: &Args,
    csv_bytes: &[u8],
    report_bytes: &[u8],
    stem: &str,
    timestamp: &str,
) -> Result<Vec<String>> {
    use data_studio::{S3Client, S3Config, export_artifacts};
    use std::env;

    let bucket = args.s3_bucket.as_deref().unwrap_or_default();
    let config = S3Config::from_parts(
        bucket,
        &args.s3_region,
        env::var("AWS_ACCESS_KEY_ID").ok(),
        env::var("AWS_SECRET_ACCESS_KEY").ok(),
    )?;
    let client = S3Client::new(config)?;

    let (dataset_uri, report_uri) = export_artifacts(
        &client,
        &args.s3_prefix,
        stem,
        timestamp,
        csv_bytes,
        report_bytes,
    )?;
    info!("Uploaded cleaned dataset to {}", dataset_uri);
    info!("Uploaded report to {}", report_uri);

    Ok(vec![dataset_uri, report_uri])
}

#[cfg(not(feature = "cloud"))]
fn upload_artifacts(
    _args: &Args,
    _csv_bytes: &[u8],
    _report_bytes: &[u8],
    _stem: &str,
    _timestamp: &str,
) -> Result<Vec<String>> {
    warn!("Cloud export not compiled in. Rebuild with --features cloud.");
    Ok(Vec::new())
}

/// Print a human-readable summary of the run.
#[allow(clippy::too_many_arguments)]
fn print_snapshot(
    args: &Args,
    ingested: &IngestionResult,
    cleaned: &DataFrame,
    report: &CleaningReport,
    csv_path: &Path,
    report_path: &Path,
    chart_paths: &[PathBuf],
    uploaded: &[String],
) {
    if args.quiet {
        return;
    }

    println!();
    println!("{}", "=".repeat(80));
    println!("ANALYSIS COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!("Source format:         {}", ingested.format.tag().to_uppercase());
    println!("Raw rows:              {}", ingested.dataframe.height());
    println!("Cleaned rows:          {}", cleaned.height());
    println!("Columns:               {}", cleaned.width());
    println!("Duplicates dropped:    {}", report.dropped_duplicates);
    println!("Missing cells imputed: {}", report.imputed_cells);

    let notes: Vec<&String> = ingested
        .notes
        .iter()
        .chain(report.transformations.iter())
        .collect();
    if !notes.is_empty() {
        println!();
        println!("Notes:");
        for note in notes {
            println!("  - {}", note);
        }
    }

    println!();
    println!("Outputs:");
    println!("  - {}", csv_path.display());
    println!("  - {}", report_path.display());
    for path in chart_paths {
        println!("  - {}", path.display());
    }
    for uri in uploaded {
        println!("  - {}", uri);
    }
}
