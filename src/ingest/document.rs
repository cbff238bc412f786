//! Document-table ingestion.
//!
//! Extracts the text of a PDF with pdf-extract and scans each page for
//! tabular regions: runs of consecutive lines whose delimiter-split field
//! counts agree. The first row of each region is its header, every row is
//! tagged with its source page number, and all regions are concatenated
//! into one table with columns unioned by name.

use crate::error::{AnalysisError, Result};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

/// Column added to every extracted row with the 1-based page it came from.
pub(crate) const SOURCE_PAGE_COLUMN: &str = "_source_page";

/// Fields inside a line are separated by a tab or a run of 2+ spaces.
static FIELD_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\t+| {2,}").expect("Invalid field separator regex"));

#[derive(Debug)]
struct PageTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    page: usize,
}

pub(crate) fn read_document(bytes: &[u8]) -> Result<(DataFrame, Vec<String>)> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| AnalysisError::IngestionFailed(format!("could not extract PDF text: {}", e)))?;

    let mut tables = Vec::new();
    for (page_idx, page_text) in text.split('\u{0c}').enumerate() {
        tables.extend(scan_page(page_text, page_idx + 1));
    }

    if tables.is_empty() {
        return Ok((
            DataFrame::empty(),
            vec!["No PDF tables detected. Returning empty frame.".to_string()],
        ));
    }

    let note = format!("Extracted {} table(s) from PDF.", tables.len());
    debug!("{}", note);
    let df = union_tables(&tables)?;
    Ok((df, vec![note]))
}

/// Find tabular regions in one page of text. A region is a run of 2+
/// consecutive lines that split into the same number (>= 2) of fields;
/// the first line of the run is the header.
fn scan_page(page_text: &str, page: usize) -> Vec<PageTable> {
    let mut tables = Vec::new();
    let mut region: Vec<Vec<String>> = Vec::new();

    let mut flush = |region: &mut Vec<Vec<String>>| {
        if region.len() >= 2 {
            let mut rows = std::mem::take(region);
            let headers = rows.remove(0);
            tables.push(PageTable {
                headers,
                rows,
                page,
            });
        } else {
            region.clear();
        }
    };

    for line in page_text.lines() {
        let fields = split_fields(line);
        let fits_region = fields.len() >= 2
            && region
                .last()
                .map(|prev| prev.len() == fields.len())
                .unwrap_or(true);

        if fits_region {
            region.push(fields);
        } else {
            flush(&mut region);
            if fields.len() >= 2 {
                region.push(fields);
            }
        }
    }
    flush(&mut region);

    tables
}

fn split_fields(line: &str) -> Vec<String> {
    FIELD_SEPARATOR
        .split(line.trim())
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Concatenate the page tables into one DataFrame, unioning columns by name
/// in first-seen order. Cells absent from a table's column set are null.
fn union_tables(tables: &[PageTable]) -> Result<DataFrame> {
    let mut column_order: Vec<String> = Vec::new();
    for table in tables {
        for header in &table.headers {
            if !column_order.iter().any(|c| c == header) {
                column_order.push(header.clone());
            }
        }
    }

    let total_rows: usize = tables.iter().map(|t| t.rows.len()).sum();
    let mut cells: HashMap<&str, Vec<Option<String>>> = column_order
        .iter()
        .map(|name| (name.as_str(), Vec::with_capacity(total_rows)))
        .collect();
    let mut pages: Vec<i64> = Vec::with_capacity(total_rows);

    for table in tables {
        for row in &table.rows {
            for name in &column_order {
                let value = table
                    .headers
                    .iter()
                    .position(|h| h == name)
                    .and_then(|idx| row.get(idx))
                    .cloned();
                cells
                    .get_mut(name.as_str())
                    .expect("column registered above")
                    .push(value);
            }
            pages.push(table.page as i64);
        }
    }

    let mut columns: Vec<Column> = column_order
        .iter()
        .map(|name| {
            let values = cells.remove(name.as_str()).expect("column registered above");
            Series::new(name.as_str().into(), values).into_column()
        })
        .collect();
    columns.push(Series::new(SOURCE_PAGE_COLUMN.into(), pages).into_column());

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_page_finds_aligned_region() {
        let page = "Quarterly Overview\n\nname  amount  region\nwidget  10  north\ngadget  20  south\n\nfooter text";
        let tables = scan_page(page, 1);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["name", "amount", "region"]);
        assert_eq!(tables[0].rows.len(), 2);
    }

    #[test]
    fn test_scan_page_header_only_region_is_discarded() {
        let page = "name  amount\n\nprose line without columns";
        let tables = scan_page(page, 1);
        assert!(tables.is_empty());
    }

    #[test]
    fn test_scan_page_field_count_change_splits_regions() {
        let page = "a  b\n1  2\nx  y  z\n1  2  3\n4  5  6";
        let tables = scan_page(page, 1);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].headers.len(), 2);
        assert_eq!(tables[1].headers.len(), 3);
    }

    #[test]
    fn test_union_tables_tags_source_page_and_unions_columns() {
        let tables = vec![
            PageTable {
                headers: vec!["name".to_string(), "amount".to_string()],
                rows: vec![vec!["widget".to_string(), "10".to_string()]],
                page: 1,
            },
            PageTable {
                headers: vec!["name".to_string(), "region".to_string()],
                rows: vec![vec!["gadget".to_string(), "south".to_string()]],
                page: 3,
            },
        ];

        let df = union_tables(&tables).unwrap();
        assert_eq!(df.shape(), (2, 4));

        let amount = df.column("amount").unwrap();
        assert_eq!(amount.null_count(), 1);
        let region = df.column("region").unwrap();
        assert_eq!(region.null_count(), 1);

        let pages = df.column(SOURCE_PAGE_COLUMN).unwrap();
        assert_eq!(pages.i64().unwrap().get(0), Some(1));
        assert_eq!(pages.i64().unwrap().get(1), Some(3));
    }

    #[test]
    fn test_read_document_invalid_bytes() {
        let err = read_document(b"not a pdf").unwrap_err();
        assert!(matches!(err, AnalysisError::IngestionFailed(_)));
    }
}
