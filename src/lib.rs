// Library module for testable functions

pub mod ingestion;

/// Reference apartment size the monthly cost is quoted for (sqft)
pub const REFERENCE_AREA_SQFT: f64 = 1000.0;

/// Rupees per lakh; property costs are reported in lakhs
pub const LAKH: f64 = 100_000.0;

/// Income model anchor: 2012 household income was ~9.6 lakhs
pub const BASE_INCOME_YEAR: i32 = 2012;
pub const BASE_ANNUAL_INCOME: f64 = 9.6;
pub const INCOME_GROWTH_RATE: f64 = 0.08;

/// Cost of the reference apartment in lakhs
/// Formula: rate_sqft × 1000 / 100000
pub fn property_cost_for_reference_area(rate_sqft: f64) -> f64 {
    rate_sqft * REFERENCE_AREA_SQFT / LAKH
}

/// Synthetic annual income (lakhs) for a given year, unrounded.
///
/// Compounds 8% a year forward from the 2012 anchor and discounts backward
/// before it. The model is annual-resolution only, so `_month` does not
/// change the result.
pub fn estimate_annual_income(year: i32, _month: u32) -> f64 {
    let growth = 1.0 + INCOME_GROWTH_RATE;

    if year < BASE_INCOME_YEAR {
        BASE_ANNUAL_INCOME / growth.powi(BASE_INCOME_YEAR - year)
    } else {
        BASE_ANNUAL_INCOME * growth.powi(year - BASE_INCOME_YEAR)
    }
}

/// Calculate the price-to-income ratio
/// Formula: property_cost / annual_income
pub fn calculate_affordability(property_cost: f64, annual_income: f64) -> Option<f64> {
    if annual_income <= 0.0 || !annual_income.is_finite() {
        return None;
    }
    Some(property_cost / annual_income)
}
