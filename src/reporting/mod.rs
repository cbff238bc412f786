//! Markdown report assembly and export serialization.

use crate::error::Result;
use crate::types::SourceFormat;
use chrono::Utc;
use polars::prelude::*;

use crate::eda::numeric_summary;

static RECOMMENDATIONS: [&str; 3] = [
    "- Validate business rules and domain constraints for key variables.",
    "- Review top correlated features and assess causality before using them in models.",
    "- Consider exporting cleaned data to cloud storage for team collaboration.",
];

/// Assemble the analysis report as a Markdown document.
pub fn build_markdown_report(
    raw_df: &DataFrame,
    cleaned_df: &DataFrame,
    transformations: &[String],
    format: SourceFormat,
    ingestion_notes: &[String],
) -> Result<String> {
    let generated_at = Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    render_report(
        &generated_at,
        raw_df,
        cleaned_df,
        transformations,
        format,
        ingestion_notes,
    )
}

fn render_report(
    generated_at: &str,
    raw_df: &DataFrame,
    cleaned_df: &DataFrame,
    transformations: &[String],
    format: SourceFormat,
    ingestion_notes: &[String],
) -> Result<String> {
    let columns = cleaned_df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines: Vec<String> = vec![
        "# Automated Data Analysis Report".to_string(),
        String::new(),
        format!("Generated: **{}**", generated_at),
        format!("Source format: **{}**", format.tag().to_uppercase()),
        String::new(),
        "## 1) Dataset Overview".to_string(),
        format!(
            "- Raw shape: `{} rows x {} columns`",
            raw_df.height(),
            raw_df.width()
        ),
        format!(
            "- Cleaned shape: `{} rows x {} columns`",
            cleaned_df.height(),
            cleaned_df.width()
        ),
        format!("- Columns: `{}`", columns),
        String::new(),
        "## 2) Ingestion Notes".to_string(),
    ];

    if ingestion_notes.is_empty() {
        lines.push("- No ingestion warnings.".to_string());
    } else {
        lines.extend(ingestion_notes.iter().map(|note| format!("- {}", note)));
    }

    lines.push(String::new());
    lines.push("## 3) Processing Steps".to_string());
    if transformations.is_empty() {
        lines.push("- No explicit transformations were needed.".to_string());
    } else {
        lines.extend(transformations.iter().map(|item| format!("- {}", item)));
    }

    lines.push(String::new());
    lines.push("## 4) Numeric Summary".to_string());
    let summary = numeric_summary(cleaned_df)?;
    if summary.height() > 0 {
        lines.push(String::new());
        lines.push(render_markdown_table(&summary)?);
    } else {
        lines.push("- No numeric columns available.".to_string());
    }

    lines.push(String::new());
    lines.push("## 5) Recommended Next Actions".to_string());
    lines.extend(RECOMMENDATIONS.iter().map(|r| r.to_string()));

    Ok(lines.join("\n"))
}

/// Render a DataFrame as a GitHub-flavored Markdown table.
fn render_markdown_table(df: &DataFrame) -> Result<String> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut lines = Vec::with_capacity(df.height() + 2);
    lines.push(format!("| {} |", names.join(" | ")));
    lines.push(format!(
        "|{}|",
        names.iter().map(|_| "---").collect::<Vec<_>>().join("|")
    ));

    for row_idx in 0..df.height() {
        let cells: Vec<String> = df
            .get_columns()
            .iter()
            .map(|col| {
                col.get(row_idx)
                    .map(format_cell)
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();
        lines.push(format!("| {} |", cells.join(" | ")));
    }

    Ok(lines.join("\n"))
}

fn format_cell(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(ref s) => s.to_string(),
        AnyValue::Float64(f) => format_float(f),
        AnyValue::Float32(f) => format_float(f as f64),
        other => format!("{}", other),
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    let rendered = format!("{:.4}", v);
    let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
    trimmed.to_string()
}

/// Serialize the cleaned table as UTF-8 CSV bytes (header row, no index).
pub fn cleaned_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    CsvWriter::new(&mut buf).include_header(true).finish(df)?;
    Ok(buf)
}

/// Output file name for the cleaned dataset.
pub fn cleaned_data_file_name(stem: &str) -> String {
    format!("cleaned_{}.csv", stem)
}

/// Output file name for the Markdown report.
pub fn report_file_name(timestamp: &str) -> String {
    format!("analysis_report_{}.md", timestamp)
}

/// UTC timestamp used in report and export file names.
pub fn export_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frames() -> (DataFrame, DataFrame) {
        let raw = df![
            "v" => [1.0, 1.0, 100.0],
            "c" => ["a", "a", "b"],
        ]
        .unwrap();
        let cleaned = df![
            "v" => [1.0, 100.0],
            "c" => ["a", "b"],
        ]
        .unwrap();
        (raw, cleaned)
    }

    #[test]
    fn test_report_contains_all_sections() {
        let (raw, cleaned) = sample_frames();
        let report = render_report(
            "2024-06-01 10:00 UTC",
            &raw,
            &cleaned,
            &["Dropped 1 duplicate row(s).".to_string()],
            SourceFormat::Csv,
            &[],
        )
        .unwrap();

        assert!(report.starts_with("# Automated Data Analysis Report"));
        assert!(report.contains("Generated: **2024-06-01 10:00 UTC**"));
        assert!(report.contains("Source format: **CSV**"));
        assert!(report.contains("## 1) Dataset Overview"));
        assert!(report.contains("- Raw shape: `3 rows x 2 columns`"));
        assert!(report.contains("- Cleaned shape: `2 rows x 2 columns`"));
        assert!(report.contains("- Columns: `v, c`"));
        assert!(report.contains("## 2) Ingestion Notes"));
        assert!(report.contains("- No ingestion warnings."));
        assert!(report.contains("## 3) Processing Steps"));
        assert!(report.contains("- Dropped 1 duplicate row(s)."));
        assert!(report.contains("## 4) Numeric Summary"));
        assert!(report.contains("| feature |"));
        assert!(report.contains("## 5) Recommended Next Actions"));
        assert!(report.contains("- Validate business rules"));
    }

    #[test]
    fn test_report_placeholders_for_empty_notes_and_steps() {
        let cleaned = df![
            "c" => ["a", "b"],
        ]
        .unwrap();
        let report = render_report(
            "2024-06-01 10:00 UTC",
            &cleaned,
            &cleaned,
            &[],
            SourceFormat::Pdf,
            &[],
        )
        .unwrap();

        assert!(report.contains("- No explicit transformations were needed."));
        assert!(report.contains("- No numeric columns available."));
        assert!(report.contains("Source format: **PDF**"));
    }

    #[test]
    fn test_report_lists_ingestion_notes() {
        let (raw, cleaned) = sample_frames();
        let report = render_report(
            "2024-06-01 10:00 UTC",
            &raw,
            &cleaned,
            &[],
            SourceFormat::Pdf,
            &["Extracted 2 table(s) from PDF.".to_string()],
        )
        .unwrap();

        assert!(report.contains("- Extracted 2 table(s) from PDF."));
        assert!(!report.contains("No ingestion warnings"));
    }

    #[test]
    fn test_markdown_table_shape() {
        let df = df![
            "feature" => ["v"],
            "mean" => [2.5],
        ]
        .unwrap();
        let table = render_markdown_table(&df).unwrap();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "| feature | mean |");
        assert_eq!(lines[1], "|---|---|");
        assert_eq!(lines[2], "| v | 2.5 |");
    }

    #[test]
    fn test_format_float_trims_trailing_zeros() {
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(3.0), "3");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(1.23456), "1.2346");
        assert_eq!(format_float(f64::NAN), "NaN");
    }

    #[test]
    fn test_cleaned_csv_bytes_roundtrip_header() {
        let mut df = df![
            "name" => ["alice", "bob"],
            "age" => [30i64, 40],
        ]
        .unwrap();
        let bytes = cleaned_csv_bytes(&mut df).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("name,age\n"));
        assert!(text.contains("alice,30"));
    }

    #[test]
    fn test_output_file_names() {
        assert_eq!(cleaned_data_file_name("sales"), "cleaned_sales.csv");
        assert_eq!(
            report_file_name("20240601_101500"),
            "analysis_report_20240601_101500.md"
        );
    }
}
