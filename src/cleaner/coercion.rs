//! Opportunistic datetime coercion for string columns.
//!
//! This is a type-inference pass over the columns still typed as plain
//! strings after imputation: each value is probed against the supported
//! datetime formats and the column is reclassified only when more than 80%
//! of its values parse.

use crate::error::Result;
use crate::utils::{datetime_series_from_millis, parse_datetime_millis};
use polars::prelude::*;
use tracing::debug;

/// Fraction of values that must parse for a column to be reclassified.
const PARSE_RATIO_THRESHOLD: f64 = 0.8;

/// Probe every string column for datetime content and replace the ones that
/// clear the threshold with Datetime(Milliseconds) columns. Values that fail
/// to parse become missing. Columns below the threshold are left unchanged
/// with no note.
///
/// This pass only ever produces datetime columns, never numeric ones, so
/// the outlier pass that follows sees exactly the columns that were already
/// numeric when imputation ran.
pub(crate) fn coerce_datetime_columns(mut df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
    let mut notes = Vec::new();
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }
        let len = series.len();
        if len == 0 {
            continue;
        }

        let str_ca = series.str()?;
        let mut millis: Vec<Option<i64>> = Vec::with_capacity(len);
        let mut parsed_count = 0usize;
        for opt_val in str_ca.into_iter() {
            let parsed = opt_val.and_then(parse_datetime_millis);
            if parsed.is_some() {
                parsed_count += 1;
            }
            millis.push(parsed);
        }

        let parse_ratio = parsed_count as f64 / len as f64;
        if parse_ratio > PARSE_RATIO_THRESHOLD {
            let datetime_series = datetime_series_from_millis(col_name, millis)?;
            df.replace(col_name, datetime_series)?;
            notes.push(format!("Auto-parsed '{}' as datetime.", col_name));
            debug!(
                "Coerced '{}' to datetime ({:.0}% of values parsed)",
                col_name,
                parse_ratio * 100.0
            );
        }
    }

    Ok((df, notes))
}
