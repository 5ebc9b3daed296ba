//! CSV and Excel analysis tools.
//!
//! These are intentionally shallow: the question text is matched against a
//! small set of trigger keywords and a canned report is produced. This is
//! not a query engine.

use crate::error::{Result, SvarError};
use calamine::{open_workbook_auto, Reader};
use std::path::Path;

/// Report types recognized from the question text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// List the column names.
    Columns,
    /// Report the row count.
    Rows,
    /// Produce a file summary.
    Summary,
    /// Anything else; answered with a fixed message.
    Unsupported,
}

/// Map a free-text question onto a report type by keyword.
pub fn classify_question(question: &str) -> ReportKind {
    let question = question.to_lowercase();
    if question.contains("columns") {
        ReportKind::Columns
    } else if question.contains("rows") {
        ReportKind::Rows
    } else if question.contains("summary") {
        ReportKind::Summary
    } else {
        ReportKind::Unsupported
    }
}

/// Analyze a CSV file to answer a question about its content.
pub fn analyze_csv(file_path: &str, question: &str) -> Result<String> {
    if !Path::new(file_path).exists() {
        return Err(SvarError::FileNotFound(file_path.to_string()));
    }

    let content = std::fs::read_to_string(file_path)?;
    if content.trim().is_empty() {
        return Err(SvarError::Spreadsheet("The CSV file is empty.".to_string()));
    }

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SvarError::Spreadsheet(format!("Failed to parse CSV: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let records: Vec<csv::StringRecord> = reader.records().filter_map(|r| r.ok()).collect();

    Ok(match classify_question(question) {
        ReportKind::Columns => format!(
            "The CSV file contains the following columns: {}",
            headers.join(", ")
        ),
        ReportKind::Rows => format!("The CSV file contains {} rows.", records.len()),
        ReportKind::Summary => csv_summary(&headers, &records),
        ReportKind::Unsupported => "Sorry, I can only answer questions about columns, rows, \
            or provide a summary of the CSV file."
            .to_string(),
    })
}

/// Per-column summary: numeric columns get min/max/mean, others a distinct count.
fn csv_summary(headers: &[String], records: &[csv::StringRecord]) -> String {
    let mut lines = vec![format!(
        "Summary of the CSV file ({} rows, {} columns):",
        records.len(),
        headers.len()
    )];

    for (idx, header) in headers.iter().enumerate() {
        let values: Vec<&str> = records
            .iter()
            .filter_map(|r| r.get(idx))
            .filter(|v| !v.is_empty())
            .collect();

        let numbers: Vec<f64> = values.iter().filter_map(|v| v.parse::<f64>().ok()).collect();

        if !numbers.is_empty() && numbers.len() == values.len() {
            let min = numbers.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = numbers.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
            lines.push(format!(
                "- {}: numeric, min {}, max {}, mean {:.2}",
                header, min, max, mean
            ));
        } else {
            let mut distinct: Vec<&str> = values.clone();
            distinct.sort_unstable();
            distinct.dedup();
            lines.push(format!(
                "- {}: {} non-empty values, {} distinct",
                header,
                values.len(),
                distinct.len()
            ));
        }
    }

    lines.join("\n")
}

/// Analyze an Excel file to answer a question about its content.
pub fn analyze_excel(file_path: &str, question: &str) -> Result<String> {
    if !Path::new(file_path).exists() {
        return Err(SvarError::FileNotFound(file_path.to_string()));
    }

    let mut workbook = open_workbook_auto(file_path)
        .map_err(|e| SvarError::Spreadsheet(format!("Failed to open Excel file: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SvarError::Spreadsheet("The Excel file contains no sheets.".to_string()))?
        .map_err(|e| SvarError::Spreadsheet(format!("Failed to read Excel sheet: {}", e)))?;

    if range.is_empty() {
        return Err(SvarError::Spreadsheet("The Excel file is empty.".to_string()));
    }

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let data_rows: Vec<Vec<String>> = rows
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect();

    Ok(match classify_question(question) {
        ReportKind::Columns => format!(
            "The Excel file contains the following columns: {}",
            headers.join(", ")
        ),
        ReportKind::Rows => format!("The Excel file contains {} rows.", data_rows.len()),
        ReportKind::Summary => excel_summary(&headers, &data_rows),
        ReportKind::Unsupported => "Sorry, I can only answer questions about columns, rows, \
            or provide a summary of the Excel file."
            .to_string(),
    })
}

/// Summary report: dimensions, column names, and the first few rows.
fn excel_summary(headers: &[String], data_rows: &[Vec<String>]) -> String {
    let preview: Vec<String> = data_rows
        .iter()
        .take(5)
        .map(|row| row.join(", "))
        .collect();

    format!(
        "Excel File Analysis:\n\
         - Total rows: {}\n\
         - Total columns: {}\n\
         - Column names: {}\n\
         - First few rows:\n{}",
        data_rows.len(),
        headers.len(),
        headers.join(", "),
        preview.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_classify_question() {
        assert_eq!(classify_question("What columns does it have?"), ReportKind::Columns);
        assert_eq!(classify_question("How many ROWS are there?"), ReportKind::Rows);
        assert_eq!(classify_question("Give me a summary"), ReportKind::Summary);
        assert_eq!(classify_question("What is the average price?"), ReportKind::Unsupported);
    }

    #[test]
    fn test_csv_columns() {
        let file = write_csv("name,age,city\nalice,30,oslo\nbob,25,bergen\n");
        let result = analyze_csv(file.path().to_str().unwrap(), "what columns?").unwrap();
        assert_eq!(result, "The CSV file contains the following columns: name, age, city");
    }

    #[test]
    fn test_csv_rows() {
        let file = write_csv("name,age\nalice,30\nbob,25\ncarol,41\n");
        let result = analyze_csv(file.path().to_str().unwrap(), "how many rows?").unwrap();
        assert_eq!(result, "The CSV file contains 3 rows.");
    }

    #[test]
    fn test_csv_summary() {
        let file = write_csv("name,age\nalice,30\nbob,25\n");
        let result = analyze_csv(file.path().to_str().unwrap(), "summary please").unwrap();
        assert!(result.contains("2 rows, 2 columns"));
        assert!(result.contains("age: numeric"));
        assert!(result.contains("mean 27.50"));
    }

    #[test]
    fn test_csv_unsupported_question() {
        let file = write_csv("a,b\n1,2\n");
        let result = analyze_csv(file.path().to_str().unwrap(), "who wrote this?").unwrap();
        assert!(result.starts_with("Sorry, I can only answer questions about columns"));
    }

    #[test]
    fn test_csv_missing_file() {
        match analyze_csv("/nonexistent/data.csv", "rows") {
            Err(SvarError::FileNotFound(path)) => assert_eq!(path, "/nonexistent/data.csv"),
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_empty_file() {
        let file = write_csv("");
        match analyze_csv(file.path().to_str().unwrap(), "rows") {
            Err(SvarError::Spreadsheet(msg)) => assert_eq!(msg, "The CSV file is empty."),
            other => panic!("Expected Spreadsheet error, got {:?}", other),
        }
    }

    #[test]
    fn test_excel_missing_file() {
        match analyze_excel("/nonexistent/data.xlsx", "rows") {
            Err(SvarError::FileNotFound(_)) => {}
            other => panic!("Expected FileNotFound, got {:?}", other),
        }
    }
}
