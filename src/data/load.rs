use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::DataError;
use super::parse::{parse_csv_rows, parse_json_rows};
use super::record::Dataset;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Json,
    Csv,
}

fn detect_format(path: &Path) -> Result<Format, DataError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => Ok(Format::Json),
        "csv" => Ok(Format::Csv),
        _ => Err(DataError::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let format = detect_format(path)?;
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read dataset {}", path.display()))?;

    parse_dataset(&raw, format)
        .map(|mut dataset| {
            dataset.source = path.display().to_string();
            dataset
        })
        .with_context(|| format!("failed to parse dataset {}", path.display()))
}

fn parse_dataset(raw: &str, format: Format) -> Result<Dataset, DataError> {
    let rows = match format {
        Format::Json => parse_json_rows(raw)?,
        Format::Csv => parse_csv_rows(raw)?,
    };

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped_rows = 0usize;
    for (row_number, row) in rows.into_iter().enumerate() {
        let outcome = row.and_then(|row| {
            row.into_record()
                .map_err(|rejection| rejection.reason().to_owned())
        });

        match outcome {
            Ok(record) => records.push(record),
            Err(reason) => {
                skipped_rows += 1;
                warn!(row = row_number + 1, %reason, "skipping dataset row");
            }
        }
    }

    if records.is_empty() {
        return Err(DataError::Empty);
    }

    info!(
        rows = records.len(),
        skipped = skipped_rows,
        ?format,
        "dataset parsed"
    );

    Ok(Dataset {
        source: String::new(),
        records,
        skipped_rows,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::Metric;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_export_and_skips_unnamed_rows() {
        let file = write_temp(
            ".csv",
            "Country name,Regional indicator,Ladder score,Log GDP per capita\n\
             Finland,Western Europe,7.741,1.844\n\
             ,Nowhere,5.0,1.0\n\
             Israel,Middle East and North Africa,7.341,\n",
        );

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.skipped_rows, 1);
        assert_eq!(dataset.records[0].name, "Finland");
        assert_eq!(dataset.records[1].metric(Metric::Gdp), None);
        assert_eq!(dataset.source, file.path().display().to_string());
    }

    #[test]
    fn loads_json_export() {
        let file = write_temp(
            ".json",
            r#"[{"Country name": "Japan", "Regional indicator": "East Asia", "Ladder score": 6.06}]"#,
        );

        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.region_count(), 1);
    }

    #[test]
    fn dataset_without_usable_rows_is_an_error() {
        let file = write_temp(".json", r#"[{"Country name": ""}, {"Ladder score": 4.2}]"#);
        let error = load_dataset(file.path()).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DataError>(),
            Some(DataError::Empty)
        ));
    }

    #[test]
    fn unknown_extension_is_rejected_before_reading() {
        let error = load_dataset(Path::new("countries.xlsx")).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<DataError>(),
            Some(DataError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let error = load_dataset(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(error.to_string().contains("/definitely/not/here.csv"));
    }
}
