//! End-to-end data analysis studio library.
//!
//! Ingests a tabular or semi-tabular file, applies a fixed sequence of
//! cleaning heuristics, and produces summary statistics, charts, and a
//! Markdown report, with optional export to object storage.
//!
//! # Overview
//!
//! - **Ingestion**: CSV, Excel, JSON, Parquet, PDF tables, and delimited
//!   text decoded into a polars `DataFrame` plus diagnostic notes.
//! - **Cleaning**: duplicate removal, whitespace trimming, missing-value
//!   imputation, opportunistic datetime coercion, and IQR outlier capping.
//! - **EDA**: numeric summaries and chart rendering.
//! - **Reporting**: a Markdown document assembled from the run.
//! - **Cloud export**: optional S3 upload of the produced artifacts.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_studio::{DataCleaner, build_markdown_report, ingest_bytes};
//!
//! let bytes = std::fs::read("sales.csv")?;
//! let ingested = ingest_bytes("sales.csv", &bytes)?;
//!
//! let (cleaned, report) = DataCleaner::clean(&ingested.dataframe)?;
//! println!("dropped {} duplicate rows", report.dropped_duplicates);
//!
//! let markdown = build_markdown_report(
//!     &ingested.dataframe,
//!     &cleaned,
//!     &report.transformations,
//!     ingested.format,
//!     &ingested.notes,
//! )?;
//! ```
//!
//! Control flow is strictly linear and single-pass per upload: ingest →
//! clean → summarize/plot → report → optional export. Nothing is retained
//! across runs.

pub mod cleaner;
#[cfg(feature = "cloud")]
pub mod cloud;
pub mod eda;
pub mod error;
pub mod ingest;
pub mod reporting;
pub mod types;
pub mod utils;

pub use cleaner::DataCleaner;
#[cfg(feature = "cloud")]
pub use cloud::{ObjectStore, S3Client, S3Config, export_artifacts};
pub use eda::{
    categorical_plot, correlation_heatmap, distribution_plot, numeric_summary, time_series_plot,
};
pub use error::{AnalysisError, Result, ResultExt};
pub use ingest::ingest_bytes;
pub use reporting::{
    build_markdown_report, cleaned_csv_bytes, cleaned_data_file_name, export_timestamp,
    report_file_name,
};
pub use types::{CleaningReport, IngestionResult, SourceFormat};
