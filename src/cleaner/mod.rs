//! Cleaning pipeline for ingested tables.
//!
//! A fixed sequence of heuristic transformations applied column-by-column:
//!
//! 1. Duplicate row elimination (keep first occurrence)
//! 2. Whitespace trimming for string columns (silent)
//! 3. Missing-value imputation, dispatched on a per-column kind decided
//!    once before the stage runs
//! 4. Opportunistic datetime coercion of string columns
//! 5. IQR-based outlier capping for numeric columns
//!
//! Each stage returns its own notes and the driver concatenates them in
//! stage order, so there is no note state shared across stages.

mod coercion;
mod imputers;
mod outliers;
mod sanitizers;

use crate::error::Result;
use crate::types::CleaningReport;
use crate::utils::ColumnKind;
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner applying the fixed transformation sequence.
pub struct DataCleaner;

impl DataCleaner {
    /// Clean a table, producing a new table and a report of what changed.
    ///
    /// The input is not mutated; raw and cleaned tables stay independently
    /// inspectable. The output has the same column count as the input and
    /// at most as many rows. The empty table cleans to an empty table with
    /// an empty report.
    pub fn clean(df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let mut report = CleaningReport::new();

        info!(
            "Cleaning table with {} rows x {} columns",
            df.height(),
            df.width()
        );

        let (work, dropped, dedup_notes) = sanitizers::drop_duplicate_rows(df.clone())?;
        report.dropped_duplicates = dropped;
        report.transformations.extend(dedup_notes);

        let work = sanitizers::trim_string_columns(work)?;

        // The kind of every column is decided here, once, before imputation;
        // stage 4 re-types columns afterwards but never feeds this dispatch.
        let kinds: Vec<(String, ColumnKind)> = work
            .get_columns()
            .iter()
            .map(|c| (c.name().to_string(), ColumnKind::of(c.dtype())))
            .collect();
        debug!("Column kinds: {:?}", kinds);

        let (work, imputed_cells, impute_notes) = imputers::impute_missing(work, &kinds)?;
        report.imputed_cells = imputed_cells;
        report.transformations.extend(impute_notes);

        let (work, coercion_notes) = coercion::coerce_datetime_columns(work)?;
        report.transformations.extend(coercion_notes);

        let (work, outlier_notes) = outliers::cap_outliers(work)?;
        report.transformations.extend(outlier_notes);

        info!(
            "Cleaning complete: {} duplicate row(s) dropped, {} cell(s) imputed, {} note(s)",
            report.dropped_duplicates,
            report.imputed_cells,
            report.transformations.len()
        );

        Ok((work, report))
    }
}
