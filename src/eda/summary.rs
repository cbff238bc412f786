//! Descriptive statistics over the numeric columns of a table.

use crate::error::Result;
use crate::utils::{is_numeric_dtype, quantile_linear, sample_std};
use polars::prelude::*;

/// Build a describe-style summary with one row per numeric column:
/// `feature`, `count`, `mean`, `std`, `min`, `25%`, `50%`, `75%`, `max`.
///
/// Returns an empty DataFrame when the table has no numeric columns.
pub fn numeric_summary(df: &DataFrame) -> Result<DataFrame> {
    let mut features: Vec<String> = Vec::new();
    let mut counts: Vec<u32> = Vec::new();
    let mut means: Vec<f64> = Vec::new();
    let mut stds: Vec<f64> = Vec::new();
    let mut mins: Vec<f64> = Vec::new();
    let mut q25s: Vec<f64> = Vec::new();
    let mut medians: Vec<f64> = Vec::new();
    let mut q75s: Vec<f64> = Vec::new();
    let mut maxes: Vec<f64> = Vec::new();

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            continue;
        }

        let float_series = series.cast(&DataType::Float64)?;
        let mut present: Vec<f64> = float_series.f64()?.into_iter().flatten().collect();
        present.sort_by(|a, b| a.total_cmp(b));

        features.push(series.name().to_string());
        counts.push(present.len() as u32);

        if present.is_empty() {
            means.push(f64::NAN);
            stds.push(f64::NAN);
            mins.push(f64::NAN);
            q25s.push(f64::NAN);
            medians.push(f64::NAN);
            q75s.push(f64::NAN);
            maxes.push(f64::NAN);
            continue;
        }

        means.push(present.iter().sum::<f64>() / present.len() as f64);
        stds.push(sample_std(&present));
        mins.push(present[0]);
        q25s.push(quantile_linear(&present, 0.25));
        medians.push(quantile_linear(&present, 0.5));
        q75s.push(quantile_linear(&present, 0.75));
        maxes.push(present[present.len() - 1]);
    }

    if features.is_empty() {
        return Ok(DataFrame::empty());
    }

    let columns = vec![
        Series::new("feature".into(), features).into_column(),
        Series::new("count".into(), counts).into_column(),
        Series::new("mean".into(), means).into_column(),
        Series::new("std".into(), stds).into_column(),
        Series::new("min".into(), mins).into_column(),
        Series::new("25%".into(), q25s).into_column(),
        Series::new("50%".into(), medians).into_column(),
        Series::new("75%".into(), q75s).into_column(),
        Series::new("max".into(), maxes).into_column(),
    ];

    Ok(DataFrame::new(columns)?)
}
