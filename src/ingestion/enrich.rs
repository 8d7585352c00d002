//! Enrichment functions - monthly aggregation, synthetic income and affordability

use crate::ingestion::error::IngestionError;
use crate::ingestion::types::{
    MonthlyAggregate, MonthlyCost, PriceRecord, PriceToIncomeDocument, CITY,
};
use crate::ingestion::utils::round_to;
use crate::{calculate_affordability, estimate_annual_income, property_cost_for_reference_area};
use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

struct MonthGroup {
    month_year: String,
    month_start: chrono::NaiveDate,
    rate_sum: f64,
    cost_sum: f64,
    count: usize,
}

/// Group cleaned rows by (year, month) and average them.
/// Pure function - output is ascending by year then month.
pub fn aggregate_by_month(records: &[PriceRecord]) -> Vec<MonthlyCost> {
    let mut groups: BTreeMap<(i32, u32), MonthGroup> = BTreeMap::new();

    for record in records {
        let group = groups
            .entry((record.year, record.month))
            .or_insert_with(|| MonthGroup {
                month_year: record.month_year.clone(),
                month_start: record.posted_date - Days::new(u64::from(record.posted_date.day0())),
                rate_sum: 0.0,
                cost_sum: 0.0,
                count: 0,
            });

        group.rate_sum += record.rate_sqft;
        group.cost_sum += property_cost_for_reference_area(record.rate_sqft);
        group.count += 1;
    }

    groups
        .into_iter()
        .map(|((year, month), group)| MonthlyCost {
            year,
            month,
            month_year: group.month_year,
            month_start: group.month_start,
            record_count: group.count,
            mean_rate_sqft: group.rate_sum / group.count as f64,
            property_cost: group.cost_sum / group.count as f64,
        })
        .collect()
}

/// Synthetic annual income in lakhs, rounded to 2 dp.
/// The unrounded model value is always positive; rounding can still take
/// very old years (before ~1914) down to 0.00.
pub fn synthesize_income(year: i32, month: u32) -> Result<f64, IngestionError> {
    let income = estimate_annual_income(year, month);
    if !(income > 0.0 && income.is_finite()) {
        return Err(IngestionError::NonPositiveIncome { year });
    }
    Ok(round_to(income, 2))
}

/// Price-to-income ratio rounded to 1 dp; None when the rounded income is zero
pub fn affordability_ratio(property_cost: f64, annual_income: f64) -> Option<f64> {
    calculate_affordability(property_cost, annual_income).map(|ratio| round_to(ratio, 1))
}

/// Attach income and affordability to one month.
/// Returns None for a month whose income rounds to zero.
pub fn enrich_month(cost: MonthlyCost) -> Result<Option<MonthlyAggregate>, IngestionError> {
    let annual_income = synthesize_income(cost.year, cost.month)?;
    let Some(affordability) = affordability_ratio(cost.property_cost, annual_income) else {
        warn!(
            "Skipping {}: synthetic income rounds to {:.2} lakhs ({} rows)",
            cost.month_year, annual_income, cost.record_count
        );
        return Ok(None);
    };

    debug!(
        "{}: cost {:.2} lakhs, income {:.2} lakhs, affordability {:.1}",
        cost.month_year, cost.property_cost, annual_income, affordability
    );

    Ok(Some(MonthlyAggregate {
        year: cost.year,
        month: cost.month,
        month_year: cost.month_year,
        month_start: cost.month_start,
        record_count: cost.record_count,
        property_cost: cost.property_cost,
        annual_income,
        affordability,
    }))
}

/// Run all enrichment functions over the monthly costs, dropping skipped months
pub fn enrich_all(costs: Vec<MonthlyCost>) -> Result<Vec<MonthlyAggregate>, IngestionError> {
    info!("Enriching {} monthly aggregates", costs.len());

    let mut aggregates = Vec::with_capacity(costs.len());
    for cost in costs {
        if let Some(aggregate) = enrich_month(cost)? {
            aggregates.push(aggregate);
        }
    }

    Ok(aggregates)
}

/// One document per month; both timestamps are the write time
pub fn build_documents(
    aggregates: &[MonthlyAggregate],
    written_at: DateTime<Utc>,
) -> Vec<PriceToIncomeDocument> {
    aggregates
        .iter()
        .map(|agg| PriceToIncomeDocument {
            month_year: agg.month_year.clone(),
            property_cost: round_to(agg.property_cost, 0),
            affordability: agg.affordability,
            annual_income: agg.annual_income,
            sort_date: agg.month_start.and_time(NaiveTime::MIN).and_utc(),
            city: CITY.to_string(),
            created_at: written_at,
            updated_at: written_at,
        })
        .collect()
}
