mod common;

use common::HEADER;
use pretty_assertions::assert_eq;
use sales_forecast::config::ColumnNames;
use sales_forecast::data::{CsvFileSource, Dataset};
use sales_forecast::{DataSource, ForecastError};
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", body).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_csv_file() {
    let file = csv_file(&format!(
        "{}\n10,10,10,50,200,월,1000000\n20,20,20,60,300,화,1500000\n",
        HEADER
    ));

    let dataset = Dataset::load(&CsvFileSource::new(file.path()), &ColumnNames::default()).unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.frame().height(), 2);
    let first = &dataset.records()[0];
    assert_eq!(
        first.features,
        [Some(10.0), Some(10.0), Some(10.0), Some(50.0), Some(200.0)]
    );
    assert_eq!(first.weekday.as_deref(), Some("월"));
    assert_eq!(first.revenue, Some(1_000_000.0));
}

#[test]
fn test_formatted_numbers_are_parsed() {
    let file = csv_file(&format!(
        "{}\n10,10,10,50,\"1,200\",금,\"₩2,100,000\"\n",
        HEADER
    ));

    let dataset = Dataset::load(&CsvFileSource::new(file.path()), &ColumnNames::default()).unwrap();
    let record = &dataset.records()[0];

    assert_eq!(record.features[4], Some(1200.0));
    assert_eq!(record.revenue, Some(2_100_000.0));
}

#[test]
fn test_empty_cells_become_missing_fields() {
    let file = csv_file(&format!("{}\n10,,10,50,200,,1000000\n11,12,13,14,15,화,900000\n", HEADER));

    let dataset = Dataset::load(&CsvFileSource::new(file.path()), &ColumnNames::default()).unwrap();
    let record = &dataset.records()[0];

    assert_eq!(record.features[1], None);
    assert_eq!(record.weekday, None);
    assert_eq!(record.revenue, Some(1_000_000.0));
}

#[test]
fn test_missing_column_leaves_field_empty() {
    let file = csv_file("요일,매출\n월,1000000\n");

    let dataset = Dataset::load(&CsvFileSource::new(file.path()), &ColumnNames::default()).unwrap();
    let record = &dataset.records()[0];

    assert_eq!(record.features, [None; 5]);
    assert_eq!(record.weekday.as_deref(), Some("월"));
}

#[test]
fn test_custom_column_names() {
    let file = csv_file("a,b,c,d,e,day,sales\n1,2,3,4,5,일,700000\n");
    let columns = ColumnNames {
        features: ["a", "b", "c", "d", "e"].map(str::to_string),
        weekday: "day".to_string(),
        revenue: "sales".to_string(),
    };

    let dataset = Dataset::load(&CsvFileSource::new(file.path()), &columns).unwrap();
    let record = &dataset.records()[0];

    assert_eq!(
        record.features,
        [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)]
    );
    assert_eq!(record.weekday.as_deref(), Some("일"));
    assert_eq!(record.revenue, Some(700_000.0));
}

#[test]
fn test_unreadable_file_is_a_data_source_error() {
    let source = CsvFileSource::new("/nonexistent/sales.csv");
    let err = source.fetch().unwrap_err();
    assert!(matches!(err, ForecastError::DataSource(_)));
}

