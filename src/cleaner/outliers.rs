//! Outlier capping for numeric columns using the IQR method.

use crate::error::Result;
use crate::utils::{is_numeric_dtype, quantile_linear};
use polars::prelude::*;
use tracing::debug;

/// Multiplier applied to the IQR when computing the outlier fences.
const IQR_FENCE_MULTIPLIER: f64 = 1.5;

/// Clip every numeric value outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]` to the
/// nearest fence. Columns whose IQR is zero or undefined are skipped
/// silently; columns where nothing changes keep their original dtype.
pub(crate) fn cap_outliers(mut df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
    let mut notes = Vec::new();
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series();
        if !is_numeric_dtype(series.dtype()) {
            continue;
        }

        let float_series = series.cast(&DataType::Float64)?;
        let ca = float_series.f64()?;

        let mut present: Vec<f64> = ca.into_iter().flatten().collect();
        if present.is_empty() {
            continue;
        }
        present.sort_by(|a, b| a.total_cmp(b));

        let q1 = quantile_linear(&present, 0.25);
        let q3 = quantile_linear(&present, 0.75);
        let iqr = q3 - q1;
        if iqr == 0.0 || !iqr.is_finite() {
            debug!("Skipping '{}': IQR is zero or undefined", col_name);
            continue;
        }

        let lower = q1 - IQR_FENCE_MULTIPLIER * iqr;
        let upper = q3 + IQR_FENCE_MULTIPLIER * iqr;

        let capped = ca.apply(|v| v.map(|val| val.clamp(lower, upper)));
        let changed = ca
            .into_iter()
            .zip(capped.into_iter())
            .filter(|(before, after)| before != after)
            .count();

        if changed > 0 {
            df.replace(col_name, capped.into_series())?;
            notes.push(format!(
                "Capped {} outlier value(s) in '{}' using IQR clipping.",
                changed, col_name
            ));
            debug!(
                "Capped {} values in '{}' to [{:.4}, {:.4}]",
                changed, col_name, lower, upper
            );
        }
    }

    Ok((df, notes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caps_high_outlier_to_upper_fence() {
        let df = df![
            "v" => [1.0, 2.0, 3.0, 4.0, 100.0],
        ]
        .unwrap();

        // Q1 = 2, Q3 = 4, IQR = 2, fences = [-1, 7].
        let (capped, notes) = cap_outliers(df).unwrap();
        let v = capped.column("v").unwrap().f64().unwrap().clone();
        assert_eq!(v.get(4), Some(7.0));
        assert_eq!(v.get(0), Some(1.0));
        assert_eq!(
            notes,
            vec!["Capped 1 outlier value(s) in 'v' using IQR clipping.".to_string()]
        );
    }

    #[test]
    fn test_caps_low_outlier_to_lower_fence() {
        let df = df![
            "v" => [-100.0, 2.0, 3.0, 4.0, 5.0],
        ]
        .unwrap();

        // Q1 = 2, Q3 = 4, IQR = 2, fences = [-1, 7].
        let (capped, _) = cap_outliers(df).unwrap();
        let v = capped.column("v").unwrap().f64().unwrap().clone();
        assert_eq!(v.get(0), Some(-1.0));
    }

    #[test]
    fn test_zero_iqr_skipped_silently() {
        let df = df![
            "v" => [5.0, 5.0, 5.0, 5.0, 100.0],
        ]
        .unwrap();

        let (capped, notes) = cap_outliers(df).unwrap();
        let v = capped.column("v").unwrap().f64().unwrap().clone();
        assert_eq!(v.get(4), Some(100.0));
        assert!(notes.is_empty());
    }

    #[test]
    fn test_no_outliers_no_note_and_dtype_kept() {
        let df = df![
            "v" => [1i64, 2, 3, 4, 5],
        ]
        .unwrap();

        let (capped, notes) = cap_outliers(df).unwrap();
        assert!(notes.is_empty());
        // Unchanged columns keep their original integer dtype.
        assert_eq!(capped.column("v").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_nulls_survive_capping() {
        let df = df![
            "v" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0), None, Some(100.0)],
        ]
        .unwrap();

        let (capped, _) = cap_outliers(df).unwrap();
        assert_eq!(capped.column("v").unwrap().null_count(), 1);
    }

    #[test]
    fn test_string_columns_ignored() {
        let df = df![
            "c" => ["a", "b", "c"],
        ]
        .unwrap();

        let (capped, notes) = cap_outliers(df).unwrap();
        assert_eq!(capped.column("c").unwrap().dtype(), &DataType::String);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_empty_frame() {
        let (capped, notes) = cap_outliers(DataFrame::empty()).unwrap();
        assert_eq!(capped.height(), 0);
        assert!(notes.is_empty());
    }
}
