//! Shared utilities for the analysis pipeline.
//!
//! Dtype predicates, column-kind classification, small statistics helpers,
//! and the datetime string parsing used by the coercion stage.

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType is a datetime type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Logical kind of a column, decided once per column before imputation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer or floating point numbers.
    Numeric,
    /// Date or datetime values.
    Timestamp,
    /// Everything else (free-form text, categories, booleans).
    Categorical,
}

impl ColumnKind {
    pub fn of(dtype: &DataType) -> Self {
        if is_numeric_dtype(dtype) {
            Self::Numeric
        } else if is_datetime_dtype(dtype) {
            Self::Timestamp
        } else {
            Self::Categorical
        }
    }
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent value of a string Series, ties broken by the value that
/// occurs first in row order.
pub fn string_mode_stable(series: &Series) -> Option<String> {
    let str_ca = series.str().ok()?;

    let mut counts: Vec<(String, usize)> = Vec::new();
    for val in str_ca.into_iter().flatten() {
        match counts.iter_mut().find(|(v, _)| v == val) {
            Some((_, count)) => *count += 1,
            None => counts.push((val.to_string(), 1)),
        }
    }

    // First-seen order means max_by_key keeps the earliest value on ties.
    counts
        .into_iter()
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(val, _)| val)
}

/// Linear-interpolation quantile over an ascending-sorted slice.
///
/// Callers must pass a non-empty, sorted slice.
pub fn quantile_linear(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Sample standard deviation (ddof = 1). Returns NaN for fewer than 2 values.
pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return f64::NAN;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values
        .iter()
        .map(|v| (v - mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    variance.sqrt()
}

// =============================================================================
// Series Transformation Utilities
// =============================================================================

/// Fill null values in a numeric Series with a specific value.
///
/// The result is always Float64, matching what a median fill produces.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let float_series = series.cast(&DataType::Float64)?;
    let filled = float_series
        .f64()?
        .apply(|v| Some(v.unwrap_or(fill_value)));
    Ok(filled.into_series())
}

/// Fill null values in a string Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let str_ca = series.str()?;
    let filled: Vec<Option<String>> = str_ca
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value).to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), filled))
}

/// Build a Datetime(Milliseconds) Series from epoch-millisecond values.
pub fn datetime_series_from_millis(
    name: &str,
    millis: Vec<Option<i64>>,
) -> PolarsResult<Series> {
    Series::new(name.into(), millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}

// =============================================================================
// Datetime String Parsing
// =============================================================================

static DATETIME_FORMATS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ]
});

static DATE_FORMATS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]);

/// Try to parse a string as a datetime, accepting the formats the ingestion
/// sources commonly produce. Date-only values resolve to midnight.
pub fn parse_datetime_str(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim().trim_end_matches('Z');
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    for fmt in DATE_FORMATS.iter() {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// Epoch milliseconds for a parsed datetime string, if it parses.
pub fn parse_datetime_millis(value: &str) -> Option<i64> {
    parse_datetime_str(value).map(|dt| dt.and_utc().timestamp_millis())
}

// =============================================================================
// Tests
// =============================================================================
