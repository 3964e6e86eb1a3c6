use chrono::NaiveDate;
use polars::prelude::*;
use production_forecast::{DataLoader, ForecastError, GroupKey};
use std::io::Write;
use tempfile::{Builder, NamedTempFile};

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = Builder::new().suffix(".csv").tempfile().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[test]
fn test_data_loader_from_csv() {
    let file = csv_file(&[
        "date,bank,product,production,channel",
        "2024-01-01,A,X,100.0,web",
        "2024-01-02,A,X,110.5,web",
        "2024-01-01,B,Y,7,branch",
    ]);

    let observations = DataLoader::from_path(file.path()).unwrap();

    assert_eq!(observations.len(), 3);
    assert_eq!(observations[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    assert_eq!(observations[1].production, 110.5);
    assert_eq!(observations[2].key(), GroupKey::new("B", "Y"));
    assert_eq!(observations[2].production, 7.0);
}

#[test]
fn test_numeric_ids_are_read_as_strings() {
    let file = csv_file(&[
        "date,bank,product,production",
        "2024-01-01 00:00:00,341,12,5.0",
    ]);

    let observations = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(observations[0].key(), GroupKey::new("341", "12"));
    assert_eq!(observations[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
}

#[test]
fn test_missing_column_is_reported() {
    let file = csv_file(&["date,bank,production", "2024-01-01,A,1.0"]);

    let err = DataLoader::from_csv(file.path()).unwrap_err();

    assert!(matches!(err, ForecastError::MissingColumn(ref c) if c == "product"));
}

#[test]
fn test_rows_with_nulls_are_skipped() {
    let file = csv_file(&[
        "date,bank,product,production",
        "2024-01-01,A,X,1.0",
        "2024-01-02,A,X,",
        "2024-01-03,A,X,3.0",
    ]);

    let observations = DataLoader::from_csv(file.path()).unwrap();

    assert_eq!(observations.len(), 2);
    assert_eq!(observations[1].production, 3.0);
}

#[test]
fn test_duplicate_observations_are_rejected() {
    let file = csv_file(&[
        "date,bank,product,production",
        "2024-01-01,A,X,1.0",
        "2024-01-01,A,X,2.0",
    ]);

    let err = DataLoader::from_csv(file.path()).unwrap_err();

    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_invalid_date_is_a_data_error() {
    let file = csv_file(&["date,bank,product,production", "01/02/2024,A,X,1.0"]);

    let err = DataLoader::from_csv(file.path()).unwrap_err();

    assert!(matches!(err, ForecastError::DataError(_)));
}

#[test]
fn test_from_dataframe() {
    let df = df! {
        "date" => &["2024-02-01", "2024-02-02"],
        "bank" => &["A", "A"],
        "product" => &["X", "X"],
        "production" => &[1i64, 2i64],
    }
    .unwrap();

    let observations = DataLoader::from_dataframe(df).unwrap();

    assert_eq!(observations.len(), 2);
    assert_eq!(observations[1].production, 2.0);
}

#[test]
fn test_missing_file_is_an_io_error() {
    let err = DataLoader::from_csv("/nonexistent/production.csv").unwrap_err();
    assert!(matches!(err, ForecastError::IoError(_)));
}

#[test]
fn test_unsupported_extension() {
    let err = DataLoader::from_path("production.xlsx").unwrap_err();
    assert!(matches!(err, ForecastError::InvalidParameter(_)));
}
