//! Parse functions - transform raw CSV data into normalized price records

use crate::ingestion::error::IngestionError;
use crate::ingestion::types::{DropStats, PriceRecord, RawData, RawPriceRecord};
use crate::ingestion::utils::{month_label, parse_posted_date, parse_rate};
use chrono::Datelike;
use serde::Deserialize;
use std::io::Read;
use tracing::{debug, info, warn};

pub const POSTED_ON_COLUMN: &str = "posted_on";
pub const RATE_SQFT_COLUMN: &str = "rate_sqft";

/// Price export row; every other column in the file is ignored
#[derive(Debug, Deserialize)]
struct PriceCsvRow {
    posted_on: Option<String>,
    rate_sqft: Option<String>, // numeric, but may hold "NA" etc.
}

/// Parse the price CSV into raw records. No validation beyond the header check.
pub fn parse_price_csv(raw: RawData) -> Result<Vec<RawPriceRecord>, IngestionError> {
    match raw {
        RawData::File(path) => {
            info!("Parsing price CSV from {:?}", path);
            let reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .trim(csv::Trim::Headers)
                .from_path(&path)?;
            read_records(reader)
        }
        RawData::Csv(text) => {
            let reader = csv::ReaderBuilder::new()
                .has_headers(true)
                .flexible(true)
                .trim(csv::Trim::Headers)
                .from_reader(text.as_bytes());
            read_records(reader)
        }
    }
}

fn read_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<RawPriceRecord>, IngestionError> {
    let headers = reader.headers()?.clone();
    for column in [POSTED_ON_COLUMN, RATE_SQFT_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(IngestionError::MissingColumn { column });
        }
    }

    let mut records = Vec::new();
    let mut row_errors = 0;

    for (idx, result) in reader.deserialize::<PriceCsvRow>().enumerate() {
        match result {
            Ok(row) => records.push(RawPriceRecord {
                posted_on: row.posted_on,
                rate_sqft: row.rate_sqft.as_deref().and_then(parse_rate),
            }),
            Err(e) => {
                row_errors += 1;
                if row_errors <= 10 {
                    // Only log first 10 errors
                    warn!("Failed to deserialize row {}: {}", idx, e);
                }
                // Kept as an empty row so the normalizer drops and counts it
                records.push(RawPriceRecord {
                    posted_on: None,
                    rate_sqft: None,
                });
            }
        }
    }

    info!(
        "Read {} rows from price CSV ({} unreadable)",
        records.len(),
        row_errors
    );

    Ok(records)
}

/// Keep rows that have both a parseable date and a price, deriving
/// year / month / label from the date. Nothing is repaired or imputed.
pub fn normalize(records: &[RawPriceRecord]) -> (Vec<PriceRecord>, DropStats) {
    let mut drops = DropStats::default();

    let cleaned = records
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let Some(date) = raw.posted_on.as_deref().and_then(parse_posted_date) else {
                debug!("Dropping row {}: unparseable date {:?}", idx, raw.posted_on);
                drops.missing_date += 1;
                return None;
            };
            let Some(rate_sqft) = raw.rate_sqft else {
                debug!("Dropping row {}: missing rate_sqft", idx);
                drops.missing_price += 1;
                return None;
            };

            Some(PriceRecord {
                posted_date: date,
                year: date.year(),
                month: date.month(),
                month_year: month_label(date),
                rate_sqft,
            })
        })
        .collect();

    (cleaned, drops)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::tempdir;

    fn raw(posted_on: Option<&str>, rate_sqft: Option<f64>) -> RawPriceRecord {
        RawPriceRecord {
            posted_on: posted_on.map(str::to_string),
            rate_sqft,
        }
    }

    #[test]
    fn test_parse_csv_ignores_extra_columns() {
        let csv = "locality,posted_on,rate_sqft,bhk\n\
                   Sector 56,2020-01-15,5000,3\n\
                   Sector 57,,6000,2\n\
                   Sector 58,2020-02-01,,2\n";

        let records = parse_price_csv(RawData::Csv(csv.to_string())).unwrap();

        assert_eq!(
            records,
            vec![
                raw(Some("2020-01-15"), Some(5000.0)),
                raw(None, Some(6000.0)),
                raw(Some("2020-02-01"), None),
            ]
        );
    }

    #[test]
    fn test_parse_csv_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("prices.csv");
        fs::write(&path, "posted_on,rate_sqft\n2021-03-04,7250.5\n").unwrap();

        let records = parse_price_csv(RawData::File(path)).unwrap();

        assert_eq!(records, vec![raw(Some("2021-03-04"), Some(7250.5))]);
    }

    #[test]
    fn test_parse_csv_missing_column() {
        let csv = "posted_on,price\n2020-01-15,5000\n";

        let err = parse_price_csv(RawData::Csv(csv.to_string())).unwrap_err();

        assert!(matches!(
            err,
            IngestionError::MissingColumn { column: "rate_sqft" }
        ));
    }

    #[test]
    fn test_parse_csv_non_numeric_rate() {
        let csv = "posted_on,rate_sqft\n2020-01-15,on request\n2020-01-16,NaN\n";

        let records = parse_price_csv(RawData::Csv(csv.to_string())).unwrap();

        assert!(records.iter().all(|r| r.rate_sqft.is_none()));
    }

    #[test]
    fn test_normalize_drops_empty_date() {
        // 5 rows, row 3 has an empty date
        let records = vec![
            raw(Some("2020-01-15"), Some(5000.0)),
            raw(Some("2020-01-20"), Some(6000.0)),
            raw(Some(""), Some(5500.0)),
            raw(Some("2020-02-03"), Some(6100.0)),
            raw(Some("2020-03-09"), Some(6200.0)),
        ];

        let (cleaned, drops) = normalize(&records);

        assert_eq!(cleaned.len(), 4);
        assert_eq!(drops.missing_date, 1);
        assert_eq!(drops.missing_price, 0);
    }

    #[test]
    fn test_normalize_drops_missing_price_and_bad_dates() {
        let records = vec![
            raw(Some("2020-01-15"), None),
            raw(None, Some(5000.0)),
            raw(Some("someday"), Some(5000.0)),
            raw(Some("2020-01-15"), Some(5000.0)),
        ];

        let (cleaned, drops) = normalize(&records);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(drops.missing_price, 1);
        assert_eq!(drops.missing_date, 2);
        assert_eq!(drops.total(), 3);
    }

    #[test]
    fn test_normalize_derives_calendar_fields() {
        let (cleaned, _) = normalize(&[raw(Some("2024-01-31"), Some(9000.0))]);

        assert_eq!(
            cleaned,
            vec![PriceRecord {
                posted_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
                year: 2024,
                month: 1,
                month_year: "Jan 2024".to_string(),
                rate_sqft: 9000.0,
            }]
        );
    }
}
