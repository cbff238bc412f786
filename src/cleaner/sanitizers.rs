//! Row and value sanitization: duplicate removal and whitespace trimming.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Remove rows that are exact duplicates of an earlier row across all
/// columns, keeping the first occurrence. Returns the surviving rows, the
/// removed count, and the stage notes (empty when nothing was removed).
pub(crate) fn drop_duplicate_rows(df: DataFrame) -> Result<(DataFrame, usize, Vec<String>)> {
    if df.height() == 0 || df.width() == 0 {
        return Ok((df, 0, Vec::new()));
    }

    let before = df.height();
    let deduped = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let dropped = before - deduped.height();

    let mut notes = Vec::new();
    if dropped > 0 {
        notes.push(format!("Dropped {} duplicate row(s).", dropped));
        debug!("Removed {} duplicate rows", dropped);
    }

    Ok((deduped, dropped, notes))
}

/// Strip leading/trailing whitespace from every value of every string
/// column. Null values are left untouched. This stage is silent: it emits
/// no transformation notes.
pub(crate) fn trim_string_columns(mut df: DataFrame) -> Result<DataFrame> {
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

        let str_ca = series.str()?;
        let trimmed: Vec<Option<String>> = str_ca
            .into_iter()
            .map(|opt| opt.map(|v| v.trim().to_string()))
            .collect();

        let trimmed_series = Series::new(col_name.as_str().into(), trimmed);
        df.replace(col_name, trimmed_series)?;
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_duplicates_keeps_first_occurrence() {
        let df = df![
            "k" => ["a", "a", "b"],
            "v" => [1, 1, 2],
        ]
        .unwrap();

        let (deduped, dropped, notes) = drop_duplicate_rows(df).unwrap();
        assert_eq!(deduped.height(), 2);
        assert_eq!(dropped, 1);
        assert_eq!(notes, vec!["Dropped 1 duplicate row(s).".to_string()]);

        let k = deduped.column("k").unwrap();
        assert_eq!(k.str().unwrap().get(0), Some("a"));
        assert_eq!(k.str().unwrap().get(1), Some("b"));
    }

    #[test]
    fn test_drop_duplicates_silent_when_none() {
        let df = df![
            "v" => [1, 2, 3],
        ]
        .unwrap();

        let (deduped, dropped, notes) = drop_duplicate_rows(df).unwrap();
        assert_eq!(deduped.height(), 3);
        assert_eq!(dropped, 0);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_drop_duplicates_rows_differing_in_one_column_kept() {
        let df = df![
            "k" => ["a", "a"],
            "v" => [1, 2],
        ]
        .unwrap();

        let (deduped, dropped, _) = drop_duplicate_rows(df).unwrap();
        assert_eq!(deduped.height(), 2);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_drop_duplicates_empty_frame() {
        let (deduped, dropped, notes) = drop_duplicate_rows(DataFrame::empty()).unwrap();
        assert_eq!(deduped.height(), 0);
        assert_eq!(dropped, 0);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_trim_string_columns() {
        let df = df![
            "name" => [Some("  alice "), Some("bob"), None],
            "age" => [Some(30), Some(40), Some(50)],
        ]
        .unwrap();

        let trimmed = trim_string_columns(df).unwrap();
        let name = trimmed.column("name").unwrap();
        assert_eq!(name.str().unwrap().get(0), Some("alice"));
        assert_eq!(name.str().unwrap().get(1), Some("bob"));
        assert_eq!(name.null_count(), 1);

        // Numeric columns untouched
        let age = trimmed.column("age").unwrap();
        assert_eq!(age.null_count(), 0);
    }

    #[test]
    fn test_trim_keeps_whitespace_only_values_as_empty_strings() {
        let df = df![
            "name" => ["   ", "x"],
        ]
        .unwrap();

        let trimmed = trim_string_columns(df).unwrap();
        let name = trimmed.column("name").unwrap();
        assert_eq!(name.str().unwrap().get(0), Some(""));
        assert_eq!(name.null_count(), 0);
    }
}
