use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Source format recognized by the ingestion adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Comma-delimited row/column text.
    Csv,
    /// Spreadsheet workbook (xlsx or legacy xls).
    Excel,
    /// Tree-structured records, flattened into dotted column names.
    Json,
    /// Columnar binary.
    Parquet,
    /// Document with page-scanned tables.
    Pdf,
    /// Generic delimited text (comma or tab depending on extension).
    Text,
}

impl SourceFormat {
    /// Lowercase tag used in reports and logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Json => "json",
            Self::Parquet => "parquet",
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Output of the ingestion adapter: the decoded table, its format tag,
/// and any diagnostic notes produced while parsing.
#[derive(Debug, Clone)]
pub struct IngestionResult {
    pub dataframe: DataFrame,
    pub format: SourceFormat,
    pub notes: Vec<String>,
}

/// Outcome of the cleaning pipeline, alongside the cleaned table.
///
/// `transformations` is ordered: stage order first, column order within a
/// stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    /// Number of exact-duplicate rows removed (first occurrence kept).
    pub dropped_duplicates: usize,
    /// Number of missing cells filled, summed across columns as the
    /// per-column missing count before filling.
    pub imputed_cells: usize,
    /// Human-readable descriptions of the transformations applied.
    pub transformations: Vec<String>,
}

impl CleaningReport {
    pub fn new() -> Self {
        Self::default()
    }
}
