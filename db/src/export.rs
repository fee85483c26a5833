//! Export serializer: rows to CSV text or an XLSX workbook.

use std::fmt;
use std::str::FromStr;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_xlsxwriter::{Workbook, XlsxError};
use serde::Serialize;
use thiserror::Error;

use crate::types::{Row, Value};

/// Name of the single worksheet in exported workbooks.
pub const SHEET_NAME: &str = "Query Results";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No data to export")]
    NoData,

    #[error("Unsupported export format. Use \"csv\" or \"xlsx\"")]
    UnsupportedFormat(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("Result has too many columns or rows for a worksheet")]
    TooWide,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// Download file name, `query_results.<format>`.
    pub fn file_name(&self) -> String {
        format!("query_results.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Serialize `rows` in `format`. Columns come from the keys of the first row.
pub fn serialize(rows: &[Row], format: ExportFormat) -> Result<Vec<u8>, ExportError> {
    let first = rows.first().ok_or(ExportError::NoData)?;
    let headers: Vec<&str> = first.keys().map(String::as_str).collect();

    match format {
        ExportFormat::Csv => to_csv(&headers, rows),
        ExportFormat::Xlsx => to_xlsx(&headers, rows),
    }
}

/// Every field quoted, `"` doubled, records joined by `\n` with no trailing newline.
fn to_csv(headers: &[&str], rows: &[Row]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(headers.iter().map(|header| {
            row.get(*header)
                .and_then(Value::as_string)
                .unwrap_or_default()
        }))?;
    }

    let mut bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.into_error().into()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    Ok(bytes)
}

fn to_xlsx(headers: &[&str], rows: &[Row]) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, header) in headers.iter().enumerate() {
        sheet.write_string(0, column_index(col)?, *header)?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = u32::try_from(idx + 1).map_err(|_| ExportError::TooWide)?;
        for (col, header) in headers.iter().enumerate() {
            let col = column_index(col)?;
            let Some(value) = row.get(*header).filter(|v| !v.is_null()) else {
                continue;
            };
            if let Some(b) = value.as_bool() {
                sheet.write_boolean(row_num, col, b)?;
            } else if let Some(n) = value.as_f64() {
                sheet.write_number(row_num, col, n)?;
            } else {
                sheet.write_string(row_num, col, value.to_string())?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_index(col: usize) -> Result<u16, ExportError> {
    u16::try_from(col).map_err(|_| ExportError::TooWide)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(cells: &[(&str, Value)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row(&[
                ("id", Value::Int(1)),
                ("name", Value::from("Ada")),
                ("note", Value::from(r#"says "hi", twice"#)),
            ]),
            row(&[
                ("id", Value::Int(2)),
                ("name", Value::from("")),
                ("note", Value::Null),
            ]),
            // "note" absent entirely
            row(&[("id", Value::Int(3)), ("name", Value::from("Linus"))]),
        ]
    }

    #[rstest]
    fn test_csv_exact_bytes() {
        let bytes = serialize(&sample_rows(), ExportFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "\"id\",\"name\",\"note\"\n\
             \"1\",\"Ada\",\"says \"\"hi\"\", twice\"\n\
             \"2\",\"\",\"\"\n\
             \"3\",\"Linus\",\"\""
        );
    }

    #[rstest]
    fn test_csv_parses_back_to_rows() {
        let rows = sample_rows();
        let bytes = serialize(&rows, ExportFormat::Csv).unwrap();

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, vec!["id", "name", "note"]);

        let parsed: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(String::from).collect())
            .collect();
        let expected: Vec<Vec<String>> = rows
            .iter()
            .map(|r| {
                headers
                    .iter()
                    .map(|h| r.get(h).and_then(Value::as_string).unwrap_or_default())
                    .collect()
            })
            .collect();
        assert_eq!(parsed, expected);
        assert_eq!(parsed[0][2], r#"says "hi", twice"#);
    }

    #[rstest]
    fn test_csv_no_trailing_newline() {
        let rows = vec![row(&[("a", Value::Int(1))])];
        let bytes = serialize(&rows, ExportFormat::Csv).unwrap();
        assert_eq!(bytes, b"\"a\"\n\"1\"");
    }

    #[rstest]
    fn test_csv_does_not_neutralize_formulas() {
        let rows = vec![row(&[("f", Value::from("=1+2"))])];
        let bytes = serialize(&rows, ExportFormat::Csv).unwrap();
        assert_eq!(bytes, b"\"f\"\n\"=1+2\"");
    }

    #[rstest]
    #[case(ExportFormat::Csv)]
    #[case(ExportFormat::Xlsx)]
    fn test_empty_rows_is_no_data(#[case] format: ExportFormat) {
        let err = serialize(&[], format).unwrap_err();
        assert_eq!(err.to_string(), "No data to export");
    }

    #[rstest]
    fn test_xlsx_is_zip_container() {
        let bytes = serialize(&sample_rows(), ExportFormat::Xlsx).unwrap();
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[rstest]
    fn test_xlsx_accepts_every_cell_kind() {
        let rows = vec![row(&[
            ("flag", Value::Bool(true)),
            ("big", Value::UInt(u64::MAX)),
            ("ratio", Value::Float(0.5)),
            ("blob", Value::Bytes(vec![0xca, 0xfe])),
            ("missing", Value::Null),
        ])];
        let bytes = serialize(&rows, ExportFormat::Xlsx).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("xlsx", ExportFormat::Xlsx)]
    fn test_parse_format(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[rstest]
    #[case("pdf")]
    #[case("CSV")]
    #[case("")]
    fn test_parse_unsupported_format(#[case] input: &str) {
        let err = input.parse::<ExportFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported export format. Use \"csv\" or \"xlsx\"");
    }

    #[rstest]
    fn test_format_metadata() {
        assert_eq!(ExportFormat::default(), ExportFormat::Csv);
        assert_eq!(ExportFormat::Csv.file_name(), "query_results.csv");
        assert_eq!(ExportFormat::Xlsx.file_name(), "query_results.xlsx");
        assert_eq!(ExportFormat::Csv.content_type(), "text/csv");
        assert!(ExportFormat::Xlsx.content_type().ends_with("spreadsheetml.sheet"));
    }
}
