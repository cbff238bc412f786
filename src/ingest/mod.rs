//! Table ingestion adapter.
//!
//! Maps raw bytes + filename to a DataFrame, a format tag, and diagnostic
//! notes. Each source format is delegated to an established decoder: polars
//! for delimited text and parquet, calamine for spreadsheets, serde_json for
//! tree-structured records, and pdf-extract for document tables.

mod document;
mod spreadsheet;
mod tree;

use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::{IngestionResult, SourceFormat};
use polars::io::SerReader;
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::info;

/// Decode an uploaded file into a table based on its filename extension.
///
/// # Errors
///
/// Returns [`AnalysisError::UnsupportedFormat`] when the extension is not
/// among the recognized set, and [`AnalysisError::IngestionFailed`] when the
/// decoder rejects the bytes.
pub fn ingest_bytes(file_name: &str, bytes: &[u8]) -> Result<IngestionResult> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    info!("Ingesting '{}' ({} bytes)", file_name, bytes.len());

    let result = match extension.as_str() {
        "csv" => IngestionResult {
            dataframe: read_delimited(bytes, b',')?,
            format: SourceFormat::Csv,
            notes: Vec::new(),
        },
        "xlsx" | "xls" => {
            let dataframe = spreadsheet::read_workbook(bytes)?;
            IngestionResult {
                dataframe,
                format: SourceFormat::Excel,
                notes: Vec::new(),
            }
        }
        "json" => {
            let dataframe = tree::read_tree(bytes)?;
            IngestionResult {
                dataframe,
                format: SourceFormat::Json,
                notes: Vec::new(),
            }
        }
        "parquet" => IngestionResult {
            dataframe: ParquetReader::new(Cursor::new(bytes))
                .finish()
                .context("reading parquet")?,
            format: SourceFormat::Parquet,
            notes: Vec::new(),
        },
        "pdf" => {
            let (dataframe, notes) = document::read_document(bytes)?;
            IngestionResult {
                dataframe,
                format: SourceFormat::Pdf,
                notes,
            }
        }
        "txt" | "tsv" => {
            let separator = if extension == "tsv" { b'\t' } else { b',' };
            IngestionResult {
                dataframe: read_delimited(bytes, separator)?,
                format: SourceFormat::Text,
                notes: Vec::new(),
            }
        }
        _ => return Err(AnalysisError::UnsupportedFormat { extension }),
    };

    info!(
        "Ingested {} table: {} rows x {} columns",
        result.format,
        result.dataframe.height(),
        result.dataframe.width()
    );

    Ok(result)
}

fn read_delimited(bytes: &[u8], separator: u8) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("reading delimited text")
}
