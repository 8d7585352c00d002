//! Pipeline orchestration - load, normalize, aggregate, enrich, write

use crate::ingestion::config::Config;
use crate::ingestion::enrich::{aggregate_by_month, build_documents, enrich_all};
use crate::ingestion::fetch::fetch_price_csv;
use crate::ingestion::parse::{normalize, parse_price_csv};
use crate::ingestion::types::{
    DropStats, IngestionReport, MonthlyAggregate, PriceToIncomeDocument, RawData,
};
use crate::ingestion::write::{replace_collection, DocumentStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

const PREVIEW_ROWS: usize = 5;

/// Everything computed from the CSV, ready to persist
#[derive(Debug, Clone)]
pub struct PreparedImport {
    pub rows_read: usize,
    pub rows_dropped: DropStats,
    pub months_skipped: usize,
    pub aggregates: Vec<MonthlyAggregate>,
    pub documents: Vec<PriceToIncomeDocument>,
}

/// Pure part of the pipeline: raw CSV in, documents out
pub fn prepare_import(raw: RawData, written_at: DateTime<Utc>) -> Result<PreparedImport> {
    info!("Step 2/4: Processing data...");
    let records = parse_price_csv(raw)?;
    let (cleaned, rows_dropped) = normalize(&records);
    if rows_dropped.total() > 0 {
        warn!("Dropped {} rows ({})", rows_dropped.total(), rows_dropped);
    }
    info!("✓ {} of {} rows usable", cleaned.len(), records.len());

    info!("Step 3/4: Aggregating monthly statistics...");
    let costs = aggregate_by_month(&cleaned);
    let month_count = costs.len();
    let aggregates = enrich_all(costs)?;
    let months_skipped = month_count - aggregates.len();
    if months_skipped > 0 {
        warn!("Skipped {} months with zero synthetic income", months_skipped);
    }
    info!("✓ Calculated statistics for {} months", aggregates.len());
    log_preview(&aggregates);

    let documents = build_documents(&aggregates, written_at);

    Ok(PreparedImport {
        rows_read: records.len(),
        rows_dropped,
        months_skipped,
        aggregates,
        documents,
    })
}

/// Run the whole import. `store` is None on a dry run.
pub async fn run_import(
    config: &Config,
    store: Option<&dyn DocumentStore>,
) -> Result<IngestionReport> {
    info!("Step 1/4: Loading data...");
    // Missing input aborts here, before the store is touched
    let raw = fetch_price_csv(&config.csv_path)?;

    let prepared = prepare_import(raw, Utc::now())?;

    let write = match store {
        Some(store) => {
            info!("Step 4/4: Writing to {}.{}...", config.database_name, config.collection_name);
            Some(replace_collection(store, &prepared.documents).await?)
        }
        None => {
            info!("Step 4/4: Dry run, skipping database write");
            None
        }
    };

    Ok(IngestionReport {
        rows_read: prepared.rows_read,
        rows_dropped: prepared.rows_dropped,
        months: prepared.aggregates.len(),
        months_skipped: prepared.months_skipped,
        documents: prepared.documents,
        write,
    })
}

/// What the importer prints on stdout: the documents as JSON on a dry run,
/// otherwise the insert summary. Logs go to stderr.
pub fn render_output(report: &IngestionReport) -> Result<String> {
    match &report.write {
        None => Ok(serde_json::to_string_pretty(&report.documents)?),
        Some(stats) if stats.inserted > 0 => {
            Ok(format!("Inserted {} records successfully.", stats.inserted))
        }
        Some(_) => Ok("No data to insert".to_string()),
    }
}

fn log_preview(aggregates: &[MonthlyAggregate]) {
    if aggregates.is_empty() {
        return;
    }
    info!("Monthly Stats:");
    for agg in aggregates.iter().take(PREVIEW_ROWS) {
        info!(
            "  {:<10} propertyCost={:.0} affordability={:.1} annualIncome={:.2}",
            agg.month_year, agg.property_cost, agg.affordability, agg.annual_income
        );
    }
}
