//! Core data types for the ingestion pipeline
//! Pure data structures with no behavior

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// City tag stamped on every persisted document
pub const CITY: &str = "Gurgaon";

/// Raw data handed from fetch to parse - tagged union
#[derive(Debug)]
pub enum RawData {
    File(PathBuf),
    Csv(String),
}

/// One input row as read from the CSV, before any validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawPriceRecord {
    pub posted_on: Option<String>,
    pub rate_sqft: Option<f64>,
}

/// Row with a parsed posting date and a price - invalid rows never get here
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub posted_date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub month_year: String, // e.g. "Jan 2024"
    pub rate_sqft: f64,
}

/// Why rows were dropped during normalization
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DropStats {
    pub missing_date: usize,
    pub missing_price: usize,
}

impl DropStats {
    pub fn total(&self) -> usize {
        self.missing_date + self.missing_price
    }
}

impl std::fmt::Display for DropStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "missing/unparseable date: {}, missing price: {}",
            self.missing_date, self.missing_price
        )
    }
}

/// Mean reference-apartment cost for one (year, month), before income is attached
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyCost {
    pub year: i32,
    pub month: u32,
    pub month_year: String,
    pub month_start: NaiveDate,
    pub record_count: usize,
    pub mean_rate_sqft: f64,
    pub property_cost: f64, // lakhs
}

/// One summarized row per (year, month)
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    pub month_year: String,
    pub month_start: NaiveDate,
    pub record_count: usize,

    /// Mean cost of the reference apartment, lakhs (unrounded)
    pub property_cost: f64,

    /// Synthetic annual income, lakhs (rounded to 2 dp)
    pub annual_income: f64,

    /// property_cost / annual_income (rounded to 1 dp)
    pub affordability: f64,
}

/// Document written to the `pricetoincomes` collection.
///
/// `year` holds the month label ("Jan 2024"), not a numeric year. Consumers
/// read it that way, so it is kept as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceToIncomeDocument {
    #[serde(rename = "year")]
    pub month_year: String,
    pub property_cost: f64,
    pub affordability: f64,
    pub annual_income: f64,
    pub sort_date: DateTime<Utc>,
    pub city: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Write operation statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteStats {
    pub deleted: u64,
    pub inserted: usize,
}

impl std::fmt::Display for WriteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deleted: {}, inserted: {}", self.deleted, self.inserted)
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct IngestionReport {
    pub rows_read: usize,
    pub rows_dropped: DropStats,
    pub months: usize,
    pub months_skipped: usize,
    pub documents: Vec<PriceToIncomeDocument>,
    pub write: Option<WriteStats>, // None on dry run
}

impl std::fmt::Display for IngestionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows read: {}, rows dropped: {}, months: {} ({} skipped)",
            self.rows_read,
            self.rows_dropped.total(),
            self.months,
            self.months_skipped
        )?;
        match &self.write {
            Some(stats) => write!(f, ", {}", stats),
            None => write!(f, ", dry run (nothing written)"),
        }
    }
}
