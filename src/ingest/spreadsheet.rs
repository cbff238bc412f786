//! Spreadsheet ingestion via calamine.
//!
//! Reads the first worksheet of an xlsx/xls workbook. The first row is the
//! header; columns where every non-empty cell is numeric become Float64,
//! everything else is read as text.

use crate::error::{AnalysisError, Result};
use calamine::{Data, DataType as _, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::io::Cursor;

pub(crate) fn read_workbook(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| AnalysisError::IngestionFailed(format!("could not open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AnalysisError::IngestionFailed("workbook has no worksheets".to_string()))?
        .map_err(|e| AnalysisError::IngestionFailed(format!("could not read worksheet: {}", e)))?;

    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    if rows.is_empty() {
        return Ok(DataFrame::empty());
    }

    let headers: Vec<String> = rows[0]
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = cell.as_string().unwrap_or_default();
            if name.trim().is_empty() {
                format!("column_{}", idx + 1)
            } else {
                name
            }
        })
        .collect();

    let columns = headers
        .iter()
        .enumerate()
        .map(|(col_idx, header)| {
            let cells: Vec<Option<&Data>> = rows[1..].iter().map(|row| row.get(col_idx)).collect();
            build_column(header, &cells)
        })
        .collect::<Vec<Column>>();

    Ok(DataFrame::new(columns)?)
}

fn build_column(name: &str, cells: &[Option<&Data>]) -> Column {
    let mut any_present = false;
    let mut all_numeric = true;
    for cell in cells.iter().copied().flatten() {
        if cell.is_empty() {
            continue;
        }
        any_present = true;
        if !matches!(cell, Data::Int(_) | Data::Float(_)) {
            all_numeric = false;
        }
    }

    if any_present && all_numeric {
        let values: Vec<Option<f64>> = cells
            .iter()
            .copied()
            .map(|c| c.and_then(|cell| cell.as_f64()))
            .collect();
        return Series::new(name.into(), values).into_column();
    }

    let values: Vec<Option<String>> = cells
        .iter()
        .copied()
        .map(|c| {
            c.and_then(|cell| {
                if cell.is_empty() {
                    None
                } else {
                    cell.as_string()
                }
            })
        })
        .collect();
    Series::new(name.into(), values).into_column()
}
