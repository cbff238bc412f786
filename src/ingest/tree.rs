//! Tree-structured record ingestion.
//!
//! JSON input is normalized into rows: nested objects flatten into dotted
//! column names (`a.b.c`), arrays and other non-scalar values are kept as
//! their JSON text. Rows with differing key sets union their columns, with
//! missing cells becoming null. Column order is first-seen order.

use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A flattened scalar cell.
#[derive(Debug, Clone)]
enum Cell {
    Num(f64),
    Bool(bool),
    Str(String),
}

pub(crate) fn read_tree(bytes: &[u8]) -> Result<DataFrame> {
    let value: Value = serde_json::from_slice(bytes)?;

    let records: Vec<&Map<String, Value>> = match &value {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(obj) => records.push(obj),
                    other => {
                        return Err(AnalysisError::IngestionFailed(format!(
                            "JSON array elements must be objects, found {}",
                            json_kind(other)
                        )));
                    }
                }
            }
            records
        }
        Value::Object(obj) => vec![obj],
        other => {
            return Err(AnalysisError::IngestionFailed(format!(
                "JSON root must be an object or an array of objects, found {}",
                json_kind(other)
            )));
        }
    };

    if records.is_empty() {
        return Ok(DataFrame::empty());
    }

    // Flatten each record, tracking column order as names first appear.
    let mut column_order: Vec<String> = Vec::new();
    let mut rows: Vec<HashMap<String, Cell>> = Vec::with_capacity(records.len());
    for record in records {
        let mut row = HashMap::new();
        flatten_object("", record, &mut row, &mut column_order);
        rows.push(row);
    }

    let columns = column_order
        .iter()
        .map(|name| build_column(name, &rows))
        .collect::<Vec<Column>>();

    Ok(DataFrame::new(columns)?)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn flatten_object(
    prefix: &str,
    obj: &Map<String, Value>,
    row: &mut HashMap<String, Cell>,
    column_order: &mut Vec<String>,
) {
    for (key, value) in obj {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            Value::Object(nested) => flatten_object(&name, nested, row, column_order),
            Value::Null => {
                register_column(&name, column_order);
            }
            Value::Number(n) => {
                register_column(&name, column_order);
                row.insert(name, Cell::Num(n.as_f64().unwrap_or(f64::NAN)));
            }
            Value::Bool(b) => {
                register_column(&name, column_order);
                row.insert(name, Cell::Bool(*b));
            }
            Value::String(s) => {
                register_column(&name, column_order);
                row.insert(name, Cell::Str(s.clone()));
            }
            Value::Array(_) => {
                register_column(&name, column_order);
                row.insert(name, Cell::Str(value.to_string()));
            }
        }
    }
}

fn register_column(name: &str, column_order: &mut Vec<String>) {
    if !column_order.iter().any(|n| n == name) {
        column_order.push(name.to_string());
    }
}

/// Build one Series from the per-row cells. A column where every present
/// value is a number becomes Float64; all-boolean becomes Boolean; anything
/// else (including mixed) is stringified.
fn build_column(name: &str, rows: &[HashMap<String, Cell>]) -> Column {
    let cells: Vec<Option<&Cell>> = rows.iter().map(|row| row.get(name)).collect();

    let all_numeric = cells
        .iter()
        .flatten()
        .all(|c| matches!(c, Cell::Num(_)));
    let all_boolean = cells
        .iter()
        .flatten()
        .all(|c| matches!(c, Cell::Bool(_)));
    let any_present = cells.iter().any(|c| c.is_some());

    if any_present && all_numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Some(Cell::Num(n)) => Some(*n),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), values).into_column();
    }

    if any_present && all_boolean {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Some(Cell::Bool(b)) => Some(*b),
                _ => None,
            })
            .collect();
        return Series::new(name.into(), values).into_column();
    }

    let values: Vec<Option<String>> = cells
        .iter()
        .copied()
        .map(|c| {
            c.map(|cell| match cell {
                Cell::Str(s) => s.clone(),
                Cell::Num(n) => n.to_string(),
                Cell::Bool(b) => b.to_string(),
            })
        })
        .collect();
    Series::new(name.into(), values).into_column()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_of_objects() {
        let bytes = br#"[{"name": "alice", "age": 30}, {"name": "bob", "age": 40}]"#;
        let df = read_tree(bytes).unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("age").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_nested_objects_flatten_with_dotted_names() {
        let bytes = br#"[{"user": {"name": "alice", "address": {"city": "Oslo"}}, "id": 1}]"#;
        let df = read_tree(bytes).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(names.contains(&"user.name".to_string()));
        assert!(names.contains(&"user.address.city".to_string()));
        assert!(names.contains(&"id".to_string()));
    }

    #[test]
    fn test_single_object_becomes_one_row() {
        let bytes = br#"{"a": 1, "b": "x"}"#;
        let df = read_tree(bytes).unwrap();
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn test_column_union_fills_missing_with_null() {
        let bytes = br#"[{"a": 1}, {"b": "x"}]"#;
        let df = read_tree(bytes).unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_arrays_are_kept_as_json_text() {
        let bytes = br#"[{"tags": [1, 2, 3]}]"#;
        let df = read_tree(bytes).unwrap();
        let tags = df.column("tags").unwrap();
        assert_eq!(tags.dtype(), &DataType::String);
        assert_eq!(tags.str().unwrap().get(0), Some("[1,2,3]"));
    }

    #[test]
    fn test_mixed_scalars_stringified() {
        let bytes = br#"[{"v": 1}, {"v": "x"}]"#;
        let df = read_tree(bytes).unwrap();
        assert_eq!(df.column("v").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("v").unwrap().str().unwrap().get(0), Some("1"));
    }

    #[test]
    fn test_empty_array_gives_empty_frame() {
        let df = read_tree(b"[]").unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 0);
    }

    #[test]
    fn test_scalar_root_rejected() {
        let err = read_tree(b"42").unwrap_err();
        assert!(err.to_string().contains("JSON root"));
    }
}
