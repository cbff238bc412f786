//! Missing-value imputation, dispatched on the column kind decided before
//! this stage runs.
//!
//! Numeric columns fill with the median of present values, timestamp
//! columns forward-fill (leading gaps stay missing), and everything else
//! fills with the first-occurring mode, falling back to "Unknown" when the
//! column has no present values at all.

use crate::error::Result;
use crate::utils::{ColumnKind, fill_numeric_nulls, fill_string_nulls, string_mode_stable};
use polars::prelude::*;
use tracing::debug;

/// Fill missing values per column. Returns the filled frame, the number of
/// cells imputed (pre-fill missing count per column, summed), and the stage
/// notes in column order.
pub(crate) fn impute_missing(
    mut df: DataFrame,
    kinds: &[(String, ColumnKind)],
) -> Result<(DataFrame, usize, Vec<String>)> {
    let mut imputed_cells = 0;
    let mut notes = Vec::new();

    for (col_name, kind) in kinds {
        let series = df.column(col_name)?.as_materialized_series().clone();
        let missing_before = series.null_count();
        if missing_before == 0 {
            continue;
        }

        match kind {
            ColumnKind::Numeric => {
                match series.median() {
                    Some(median_val) => {
                        let filled = fill_numeric_nulls(&series, median_val)?;
                        df.replace(col_name, filled)?;
                        imputed_cells += missing_before;
                        notes.push(format!(
                            "Filled missing numeric values in '{}' with median.",
                            col_name
                        ));
                    }
                    None => {
                        // Median of a column with no present values is
                        // undefined; the column is left as-is.
                        debug!(
                            "Skipping '{}': no present values to compute a median from",
                            col_name
                        );
                    }
                }
            }
            ColumnKind::Timestamp => {
                // Forward pass only. Rows before the first present value
                // have nothing to propagate and stay missing.
                let filled = series.fill_null(FillNullStrategy::Forward(None))?;
                df.replace(col_name, filled)?;
                imputed_cells += missing_before;
                notes.push(format!(
                    "Forward-filled missing datetime values in '{}'.",
                    col_name
                ));
            }
            ColumnKind::Categorical => {
                if !fill_categorical(&mut df, col_name, &series)? {
                    continue;
                }
                imputed_cells += missing_before;
                notes.push(format!(
                    "Filled missing categorical values in '{}' with mode/Unknown.",
                    col_name
                ));
            }
        }
    }

    Ok((df, imputed_cells, notes))
}

/// Fill nulls in a categorical column. Returns false when the column's
/// dtype has no usable fill value (e.g. an all-null boolean column).
fn fill_categorical(df: &mut DataFrame, col_name: &str, series: &Series) -> Result<bool> {
    match series.dtype() {
        DataType::String => {
            let fill_value =
                string_mode_stable(series).unwrap_or_else(|| "Unknown".to_string());
            let filled = fill_string_nulls(series, &fill_value)?;
            df.replace(col_name, filled)?;
            Ok(true)
        }
        DataType::Boolean => {
            let ca = series.bool()?;
            let true_count = ca.into_iter().flatten().filter(|v| *v).count();
            let present = series.len() - series.null_count();
            if present == 0 {
                debug!("Skipping '{}': all-null boolean column", col_name);
                return Ok(false);
            }
            // First-occurring mode: on a tie the earlier value wins.
            let false_count = present - true_count;
            let mode = if true_count == false_count {
                ca.into_iter().flatten().next().unwrap_or(false)
            } else {
                true_count > false_count
            };
            let filled: Vec<Option<bool>> =
                ca.into_iter().map(|v| Some(v.unwrap_or(mode))).collect();
            df.replace(col_name, Series::new(series.name().clone(), filled))?;
            Ok(true)
        }
        other => {
            debug!(
                "Skipping '{}': no categorical fill for dtype {:?}",
                col_name, other
            );
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::datetime_series_from_millis;

    fn kinds_of(df: &DataFrame) -> Vec<(String, ColumnKind)> {
        df.get_columns()
            .iter()
            .map(|c| (c.name().to_string(), ColumnKind::of(c.dtype())))
            .collect()
    }

    #[test]
    fn test_numeric_median_fill() {
        let df = df![
            "v" => [Some(1.0), Some(2.0), Some(3.0), None, Some(5.0)],
        ]
        .unwrap();
        let kinds = kinds_of(&df);

        let (filled, imputed, notes) = impute_missing(df, &kinds).unwrap();
        let v = filled.column("v").unwrap();
        assert_eq!(v.null_count(), 0);
        // Median of [1, 2, 3, 5] = 2.5
        assert_eq!(v.f64().unwrap().get(3), Some(2.5));
        assert_eq!(imputed, 1);
        assert_eq!(
            notes,
            vec!["Filled missing numeric values in 'v' with median.".to_string()]
        );
    }

    #[test]
    fn test_numeric_all_null_skipped_without_note() {
        let df = df![
            "v" => [None::<f64>, None, None],
        ]
        .unwrap();
        let kinds = kinds_of(&df);

        let (filled, imputed, notes) = impute_missing(df, &kinds).unwrap();
        assert_eq!(filled.column("v").unwrap().null_count(), 3);
        assert_eq!(imputed, 0);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_timestamp_forward_fill_keeps_leading_gaps() {
        let ts = datetime_series_from_millis(
            "ts",
            vec![None, None, Some(1_000), None, Some(3_000)],
        )
        .unwrap();
        let df = DataFrame::new(vec![ts.into_column()]).unwrap();
        let kinds = kinds_of(&df);

        let (filled, imputed, notes) = impute_missing(df, &kinds).unwrap();
        let ts = filled.column("ts").unwrap();
        // Leading gaps remain; the gap after the first value is filled.
        assert_eq!(ts.null_count(), 2);
        assert!(matches!(ts.get(0).unwrap(), AnyValue::Null));
        assert!(matches!(ts.get(1).unwrap(), AnyValue::Null));
        assert_eq!(
            ts.as_materialized_series()
                .cast(&DataType::Int64)
                .unwrap()
                .i64()
                .unwrap()
                .get(3),
            Some(1_000)
        );
        assert_eq!(imputed, 3);
        assert_eq!(
            notes,
            vec!["Forward-filled missing datetime values in 'ts'.".to_string()]
        );
    }

    #[test]
    fn test_categorical_mode_fill() {
        let df = df![
            "c" => [Some("A"), Some("B"), Some("A"), None],
        ]
        .unwrap();
        let kinds = kinds_of(&df);

        let (filled, imputed, notes) = impute_missing(df, &kinds).unwrap();
        let c = filled.column("c").unwrap();
        assert_eq!(c.null_count(), 0);
        assert_eq!(c.str().unwrap().get(3), Some("A"));
        assert_eq!(imputed, 1);
        assert!(notes[0].contains("mode/Unknown"));
    }

    #[test]
    fn test_categorical_mode_tie_breaks_on_first_occurrence() {
        let df = df![
            "c" => [Some("B"), Some("A"), Some("A"), Some("B"), None],
        ]
        .unwrap();
        let kinds = kinds_of(&df);

        let (filled, _, _) = impute_missing(df, &kinds).unwrap();
        assert_eq!(filled.column("c").unwrap().str().unwrap().get(4), Some("B"));
    }

    #[test]
    fn test_categorical_all_null_fills_unknown() {
        let df = df![
            "c" => [None::<&str>, None, None],
        ]
        .unwrap();
        let kinds = kinds_of(&df);

        let (filled, imputed, _) = impute_missing(df, &kinds).unwrap();
        let c = filled.column("c").unwrap();
        assert_eq!(c.null_count(), 0);
        for i in 0..3 {
            assert_eq!(c.str().unwrap().get(i), Some("Unknown"));
        }
        assert_eq!(imputed, 3);
    }

    #[test]
    fn test_boolean_mode_fill() {
        let df = df![
            "b" => [Some(true), Some(true), Some(false), None],
        ]
        .unwrap();
        let kinds = kinds_of(&df);

        let (filled, imputed, _) = impute_missing(df, &kinds).unwrap();
        let b = filled.column("b").unwrap();
        assert_eq!(b.null_count(), 0);
        assert_eq!(b.bool().unwrap().get(3), Some(true));
        assert_eq!(imputed, 1);
    }

    #[test]
    fn test_columns_without_missing_untouched() {
        let df = df![
            "v" => [1.0, 2.0],
            "c" => ["x", "y"],
        ]
        .unwrap();
        let kinds = kinds_of(&df);

        let (_, imputed, notes) = impute_missing(df, &kinds).unwrap();
        assert_eq!(imputed, 0);
        assert!(notes.is_empty());
    }
}
