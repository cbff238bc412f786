//! Custom error types for the analysis pipeline.
//!
//! All errors are terminal for the current request: the caller is expected
//! to fix the input (or credentials) and re-run. There is no retry logic
//! anywhere in the crate.

use thiserror::Error;

/// The main error type for the analysis pipeline.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The uploaded file extension is not among the recognized formats.
    #[error(
        "Unsupported file type '{extension}'. Upload CSV, Excel, JSON, Parquet, PDF, TXT, or TSV."
    )]
    UnsupportedFormat { extension: String },

    /// Ingestion produced zero rows; the pipeline halts before cleaning.
    #[error("No rows were extracted from this file. Please verify your input format.")]
    EmptyResult,

    /// The source file could not be decoded into a table.
    #[error("Failed to ingest file: {0}")]
    IngestionFailed(String),

    /// A chart could not be rendered.
    #[error("Failed to render chart: {0}")]
    ChartRenderFailed(String),

    /// Cloud export was requested without a complete credential set.
    #[error("Incomplete cloud credentials: {0}")]
    MissingCredentials(String),

    /// The object-storage transport reported a failure; surfaced verbatim.
    #[error("Cloud export failed: {0}")]
    CloudExport(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON parse error wrapper.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error (only with the "cloud" feature).
    #[cfg(feature = "cloud")]
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_message_lists_formats() {
        let err = AnalysisError::UnsupportedFormat {
            extension: "docx".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("docx"));
        assert!(msg.contains("CSV"));
        assert!(msg.contains("Parquet"));
    }

    #[test]
    fn test_with_context_wraps_message() {
        let err = AnalysisError::EmptyResult.with_context("During ingestion");
        assert!(err.to_string().contains("During ingestion"));
        assert!(err.to_string().contains("No rows"));
    }

    #[test]
    fn test_polars_result_context() {
        let res: std::result::Result<(), polars::error::PolarsError> = Err(
            polars::error::PolarsError::NoData("empty input".into()),
        );
        let err = res.context("reading csv").unwrap_err();
        assert!(err.to_string().contains("reading csv"));
    }
}
