//! Chart rendering wrappers.
//!
//! Thin, pure functions from a table + column selection to a rendered PNG.
//! The figure design is deliberately plain; these exist so the CLI can drop
//! dashboard assets next to the report.

use crate::error::{AnalysisError, Result};
use crate::utils::{is_datetime_dtype, is_numeric_dtype};
use chrono::DateTime;
use plotters::prelude::*;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

const CHART_SIZE: (u32, u32) = (900, 600);
const HISTOGRAM_BINS: usize = 40;
const TOP_CATEGORIES: usize = 15;

fn chart_err(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::ChartRenderFailed(e.to_string())
}

fn numeric_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    let series = df.column(column)?.as_materialized_series();
    let float_series = series.cast(&DataType::Float64)?;
    Ok(float_series
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .collect())
}

/// Render a histogram of a numeric column.
pub fn distribution_plot(df: &DataFrame, column: &str, path: &Path) -> Result<()> {
    let values = numeric_values(df, column)?;
    if values.is_empty() {
        return Err(AnalysisError::ChartRenderFailed(format!(
            "column '{}' has no numeric values to plot",
            column
        )));
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in &values {
        min = min.min(*v);
        max = max.max(*v);
    }
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let bin_width = (max - min) / HISTOGRAM_BINS as f64;
    let mut counts = vec![0u32; HISTOGRAM_BINS];
    for v in &values {
        let idx = (((v - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[idx] += 1;
    }
    let y_max = counts.iter().copied().max().unwrap_or(1);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Distribution: {}", column), ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(min..max, 0u32..y_max + 1)
        .map_err(chart_err)?;
    chart.configure_mesh().draw().map_err(chart_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = min + i as f64 * bin_width;
            Rectangle::new([(x0, 0), (x0 + bin_width, count)], BLUE.mix(0.5).filled())
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Render a bar chart of the most frequent values of a text column.
pub fn categorical_plot(df: &DataFrame, column: &str, path: &Path) -> Result<()> {
    let series = df.column(column)?.as_materialized_series();
    let str_series = series.cast(&DataType::String)?;
    let str_ca = str_series.str()?;

    // Count in first-seen order so ties keep a stable ranking.
    let mut counts: Vec<(String, u32)> = Vec::new();
    for val in str_ca.into_iter().flatten() {
        match counts.iter_mut().find(|(v, _)| v == val) {
            Some((_, count)) => *count += 1,
            None => counts.push((val.to_string(), 1)),
        }
    }
    if counts.is_empty() {
        return Err(AnalysisError::ChartRenderFailed(format!(
            "column '{}' has no values to plot",
            column
        )));
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(TOP_CATEGORIES);

    let names: Vec<String> = counts.iter().map(|(name, _)| name.clone()).collect();
    let n = counts.len();
    let y_max = counts.iter().map(|(_, c)| *c).max().unwrap_or(1);

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Top Categories: {}", column), ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(60)
        .y_label_area_size(50)
        .build_cartesian_2d(0f64..n as f64, 0u32..y_max + 1)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_labels(n)
        .x_label_formatter(&|x| {
            let idx = x.floor() as usize;
            names.get(idx).cloned().unwrap_or_default()
        })
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, (_, count))| {
            Rectangle::new(
                [(i as f64 + 0.1, 0), (i as f64 + 0.9, *count)],
                GREEN.mix(0.6).filled(),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Render a Pearson correlation heatmap over the numeric columns.
///
/// Returns `Ok(false)` without writing a file when the table has fewer than
/// two numeric columns.
pub fn correlation_heatmap(df: &DataFrame, path: &Path) -> Result<bool> {
    let numeric_cols: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect();
    if numeric_cols.len() < 2 {
        return Ok(false);
    }

    let mut columns: Vec<Vec<Option<f64>>> = Vec::with_capacity(numeric_cols.len());
    for name in &numeric_cols {
        let float_series = df
            .column(name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        columns.push(float_series.f64()?.into_iter().collect());
    }

    let n = numeric_cols.len();
    let mut matrix = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in 0..n {
            matrix[i][j] = pearson(&columns[i], &columns[j]);
        }
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Correlation Heatmap", ("sans-serif", 24))
        .margin(12)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0f64..n as f64, 0f64..n as f64)
        .map_err(chart_err)?;

    let x_names = numeric_cols.clone();
    let y_names = numeric_cols.clone();
    chart
        .configure_mesh()
        .x_labels(n)
        .y_labels(n)
        .x_label_formatter(&|x| {
            let idx = x.floor() as usize;
            x_names.get(idx).cloned().unwrap_or_default()
        })
        .y_label_formatter(&|y| {
            let idx = y.floor() as usize;
            y_names.get(idx).cloned().unwrap_or_default()
        })
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series((0..n).flat_map(|i| (0..n).map(move |j| (i, j))).map(|(i, j)| {
            Rectangle::new(
                [(i as f64, j as f64), (i as f64 + 1.0, j as f64 + 1.0)],
                correlation_color(matrix[i][j]).filled(),
            )
        }))
        .map_err(chart_err)?;

    chart
        .draw_series((0..n).flat_map(|i| (0..n).map(move |j| (i, j))).map(|(i, j)| {
            Text::new(
                format!("{:.2}", matrix[i][j]),
                (i as f64 + 0.3, j as f64 + 0.55),
                ("sans-serif", 14),
            )
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(true)
}

/// Render a per-timestamp mean line chart of a numeric column.
pub fn time_series_plot(
    df: &DataFrame,
    time_column: &str,
    value_column: &str,
    path: &Path,
) -> Result<()> {
    let time_series = df.column(time_column)?.as_materialized_series();
    if !is_datetime_dtype(time_series.dtype()) {
        return Err(AnalysisError::ChartRenderFailed(format!(
            "column '{}' is not a datetime column",
            time_column
        )));
    }

    let millis_series = time_series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;
    let millis: Vec<Option<i64>> = millis_series.i64()?.into_iter().collect();

    let value_series = df
        .column(value_column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let values: Vec<Option<f64>> = value_series.f64()?.into_iter().collect();

    // Per-timestamp mean over rows where both cells are present.
    let mut grouped: BTreeMap<i64, (f64, u32)> = BTreeMap::new();
    for (t, v) in millis.iter().zip(values.iter()) {
        if let (Some(t), Some(v)) = (t, v) {
            let entry = grouped.entry(*t).or_insert((0.0, 0));
            entry.0 += v;
            entry.1 += 1;
        }
    }
    if grouped.is_empty() {
        return Err(AnalysisError::ChartRenderFailed(format!(
            "no complete ({}, {}) pairs to plot",
            time_column, value_column
        )));
    }

    let points: Vec<(i64, f64)> = grouped
        .into_iter()
        .map(|(t, (sum, count))| (t, sum / count as f64))
        .collect();

    let x_min = points[0].0;
    let x_max = points[points.len() - 1].0.max(x_min + 1);
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, v) in &points {
        y_min = y_min.min(*v);
        y_max = y_max.max(*v);
    }
    if y_min == y_max {
        y_min -= 0.5;
        y_max += 0.5;
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("{} Trend over {}", value_column, time_column),
            ("sans-serif", 24),
        )
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|millis| {
            DateTime::from_timestamp_millis(*millis)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(chart_err)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|(t, v)| Circle::new((*t, *v), 3, BLUE.filled())),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Map a correlation in [-1, 1] to a blue-white-red ramp. NaN renders white.
fn correlation_color(c: f64) -> RGBColor {
    if c.is_nan() {
        return RGBColor(255, 255, 255);
    }
    let c = c.clamp(-1.0, 1.0);
    if c < 0.0 {
        let t = -c;
        let lerp = |a: f64, b: f64| (a + (b - a) * t) as u8;
        RGBColor(lerp(255.0, 59.0), lerp(255.0, 76.0), lerp(255.0, 192.0))
    } else {
        let t = c;
        let lerp = |a: f64, b: f64| (a + (b - a) * t) as u8;
        RGBColor(lerp(255.0, 180.0), lerp(255.0, 4.0), lerp(255.0, 38.0))
    }
}

fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| match (a, b) {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}
