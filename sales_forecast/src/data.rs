//! Sales table sources and conversion into records

use crate::config::ColumnNames;
use crate::error::{ForecastError, Result};
use crate::record::SalesRecord;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Anything that can hand over the current sales table
pub trait DataSource {
    /// Fetch the full table. Failures are reported as `ForecastError::DataSource`.
    fn fetch(&self) -> Result<DataFrame>;

    /// Short human-readable description used in logs
    fn describe(&self) -> String;
}

/// Sales table stored in a local CSV file
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for CsvFileSource {
    fn fetch(&self) -> Result<DataFrame> {
        let bytes = fs::read(&self.path).map_err(|e| {
            ForecastError::DataSource(format!("Cannot open {}: {}", self.path.display(), e))
        })?;
        read_csv_bytes(bytes)
    }

    fn describe(&self) -> String {
        format!("csv file {}", self.path.display())
    }
}

/// Publicly shared spreadsheet, read through its CSV export
#[derive(Debug, Clone)]
pub struct SheetSource {
    url: String,
}

impl SheetSource {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
        }
    }

    /// URL the table is actually downloaded from
    pub fn export_url(&self) -> String {
        sheet_export_url(&self.url)
    }
}

impl DataSource for SheetSource {
    fn fetch(&self) -> Result<DataFrame> {
        let url = self.export_url();
        debug!(%url, "downloading sales sheet");

        let response = reqwest::blocking::get(&url)
            .and_then(|r| r.error_for_status())
            .map_err(|e| ForecastError::DataSource(format!("Cannot download sheet: {}", e)))?;
        let body = response
            .bytes()
            .map_err(|e| ForecastError::DataSource(format!("Cannot read sheet body: {}", e)))?;

        read_csv_bytes(body.to_vec())
    }

    fn describe(&self) -> String {
        format!("sheet {}", self.url)
    }
}

/// Table already held in memory
#[derive(Debug, Clone)]
pub struct FrameSource {
    df: DataFrame,
}

impl FrameSource {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }
}

impl DataSource for FrameSource {
    fn fetch(&self) -> Result<DataFrame> {
        Ok(self.df.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory table ({} rows)", self.df.height())
    }
}

/// Rewrite a spreadsheet link (`.../d/<id>/edit?...`) into its CSV export link.
///
/// Links that already point at an export, or are not spreadsheet links,
/// are returned unchanged.
pub fn sheet_export_url(url: &str) -> String {
    const MARKER: &str = "/spreadsheets/d/";

    if url.contains("/export?") {
        return url.to_string();
    }

    match url.find(MARKER) {
        Some(start) => {
            let id_start = start + MARKER.len();
            let id_end = url[id_start..]
                .find(|c: char| matches!(c, '/' | '?' | '#'))
                .map_or(url.len(), |offset| id_start + offset);
            format!("{}/export?format=csv", &url[..id_end])
        }
        None => url.to_string(),
    }
}

/// Parse CSV bytes into a table
pub fn read_csv_bytes(bytes: Vec<u8>) -> Result<DataFrame> {
    CsvReader::new(Cursor::new(bytes))
        .infer_schema(None)
        .has_header(true)
        .finish()
        .map_err(|e| ForecastError::DataSource(format!("Invalid sales table: {}", e)))
}

/// Current sales records together with the table they came from
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    records: Vec<SalesRecord>,
    fetched_at: DateTime<Utc>,
}

impl Dataset {
    /// Fetch the table from `source` and convert every row
    pub fn load(source: &dyn DataSource, columns: &ColumnNames) -> Result<Self> {
        let frame = source.fetch()?;
        let records = records_from_frame(&frame, columns)?;
        info!(
            source = %source.describe(),
            rows = records.len(),
            "loaded sales table"
        );

        Ok(Self {
            frame,
            records,
            fetched_at: Utc::now(),
        })
    }

    /// Build a dataset directly from records
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        Self {
            frame: DataFrame::empty(),
            records,
            fetched_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Table as fetched from the source
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Convert table rows into records.
///
/// Cells that cannot be read become missing fields; a missing column makes
/// that field missing in every row.
pub fn records_from_frame(df: &DataFrame, columns: &ColumnNames) -> Result<Vec<SalesRecord>> {
    let height = df.height();

    let feature_columns = columns
        .features
        .iter()
        .map(|name| numeric_column(df, name))
        .collect::<Result<Vec<_>>>()?;
    let weekdays = text_column(df, &columns.weekday)?;
    let revenue = numeric_column(df, &columns.revenue)?;

    let records = (0..height)
        .map(|row| SalesRecord {
            features: std::array::from_fn(|i| feature_columns[i][row]),
            weekday: weekdays[row].clone(),
            revenue: revenue[row],
        })
        .collect();

    Ok(records)
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = match df.column(name) {
        Ok(col) => col,
        Err(_) => {
            warn!(column = name, "column not found in sales table");
            return Ok(vec![None; df.height()]);
        }
    };

    match col.dtype() {
        DataType::Utf8 => Ok(col
            .utf8()?
            .into_iter()
            .map(|cell| cell.and_then(parse_number))
            .collect()),
        dtype if dtype.is_numeric() => {
            let casted = col.cast(&DataType::Float64)?;
            let values = casted.f64()?.into_iter().collect();
            Ok(values)
        }
        other => Err(ForecastError::DataSource(format!(
            "Column '{}' has unsupported type {}",
            name, other
        ))),
    }
}

fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let col = match df.column(name) {
        Ok(col) => col,
        Err(_) => {
            warn!(column = name, "column not found in sales table");
            return Ok(vec![None; df.height()]);
        }
    };

    let casted = col.cast(&DataType::Utf8)?;
    let values = casted
        .utf8()?
        .into_iter()
        .map(|cell| {
            cell.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

/// Parse a sheet number such as `1,250,000` or `₩ 30000`
fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, ',' | '₩') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = "\
울산이자카야 검색량,울산달동술집 검색량,울산술집 검색량,울산삼산술집 검색량,플레이스 유입수,요일,매출
10,10,10,50,200,월,\"1,000,000\"
20,20,20,60,300,화,1500000
5,abc,5,5,5,수,700000
";

    #[test]
    fn export_url_rewrites_sheet_links() {
        let url = "https://docs.google.com/spreadsheets/d/abc123/edit?usp=sharing";
        assert_eq!(
            sheet_export_url(url),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
        assert_eq!(
            sheet_export_url("https://docs.google.com/spreadsheets/d/abc123"),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
    }

    #[test]
    fn export_url_keeps_other_links() {
        let export = "https://docs.google.com/spreadsheets/d/abc/export?format=csv";
        assert_eq!(sheet_export_url(export), export);
        assert_eq!(
            sheet_export_url("https://example.com/sales.csv"),
            "https://example.com/sales.csv"
        );
    }

    #[test]
    fn parses_sheet_numbers() {
        assert_eq!(parse_number("1,000,000"), Some(1_000_000.0));
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("₩30000"), Some(30000.0));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn converts_table_rows_into_records() {
        let df = read_csv_bytes(TABLE.as_bytes().to_vec()).unwrap();
        let records = records_from_frame(&df, &ColumnNames::default()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            SalesRecord::new([10.0, 10.0, 10.0, 50.0, 200.0], "월", 1_000_000.0)
        );
        assert_eq!(records[1].revenue, Some(1_500_000.0));
        assert_eq!(records[2].features[1], None);
        assert_eq!(records[2].weekday.as_deref(), Some("수"));
    }

    #[test]
    fn missing_column_leaves_fields_empty() {
        let df = read_csv_bytes(b"a,b\n1,2\n".to_vec()).unwrap();
        let records = records_from_frame(&df, &ColumnNames::default()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0], SalesRecord::default());
    }

    #[test]
    fn missing_file_is_a_data_source_error() {
        let source = CsvFileSource::new("/nonexistent/sales.csv");
        assert!(matches!(source.fetch(), Err(ForecastError::DataSource(_))));
    }
}
