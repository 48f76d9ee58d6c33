use log::debug;

use crate::models::goal::GoalParameters;
use crate::models::projection::{CashflowPoint, GoalProjection, GrowthPoint};
use crate::models::settings::MAX_PROJECTION_YEARS;
use crate::services::valuation_service::percent_of;

/// Multi-year projections of the portfolio.
///
/// Every method is a pure function of its arguments: calling it twice with
/// the same inputs yields the same series.
pub struct ProjectionService;

impl ProjectionService {
    pub fn new() -> Self {
        Self
    }

    /// Compounding growth series for years `0..=years`.
    ///
    /// `asset(0) = total_assets`, `asset(y + 1) = asset(y) * (1 + rate)`.
    pub fn growth_series(&self, total_assets: f64, rate: f64, years: u32) -> Vec<GrowthPoint> {
        debug!("Growth series: assets={total_assets}, rate={rate}, years={years}");
        let mut series = Vec::with_capacity(series_capacity(years));
        let mut asset_value = total_assets;
        for year in 0..=years {
            series.push(GrowthPoint { year, asset_value });
            asset_value *= 1.0 + rate;
        }
        series
    }

    /// Cashflow coverage series for years `0..=years`.
    ///
    /// Each year records the balance at the start of the year, then applies
    /// `balance = balance * (1 + rate) + annual_income - monthly_living_cost * 12`.
    /// The balance is not floored; it may go negative and keep compounding.
    pub fn cashflow_series(
        &self,
        total_assets: f64,
        annual_income: f64,
        monthly_living_cost: f64,
        rate: f64,
        years: u32,
    ) -> Vec<CashflowPoint> {
        debug!(
            "Cashflow series: assets={total_assets}, income={annual_income}, \
             living_cost={monthly_living_cost}/month, rate={rate}, years={years}"
        );
        let annual_living_cost = monthly_living_cost * 12.0;
        let coverage_percent = percent_of(annual_income, annual_living_cost);

        let mut series = Vec::with_capacity(series_capacity(years));
        let mut asset_balance = total_assets;
        for year in 0..=years {
            series.push(CashflowPoint {
                year,
                asset_balance,
                annual_income,
                annual_living_cost,
                coverage_percent,
            });
            asset_balance = asset_balance * (1.0 + rate) + annual_income - annual_living_cost;
        }
        series
    }

    /// Linear (non-compounding) goal achievement estimate.
    pub fn goal_projection(&self, total_assets: f64, goal: &GoalParameters) -> GoalProjection {
        let years_to_retirement = goal.years_to_retirement();
        let total_contributions = goal.monthly_contribution * 12.0 * f64::from(years_to_retirement);
        let projected_amount = total_assets + total_contributions;
        let shortfall = (goal.target_amount - projected_amount).max(0.0);

        GoalProjection {
            years_to_retirement,
            total_contributions,
            projected_amount,
            shortfall,
            achievement_percent: percent_of(projected_amount, goal.target_amount),
        }
    }

    /// First year in which the cashflow balance turns negative, if any.
    pub fn depletion_year(&self, series: &[CashflowPoint]) -> Option<u32> {
        series.iter().find(|p| p.is_depleted()).map(|p| p.year)
    }
}

impl Default for ProjectionService {
    fn default() -> Self {
        Self::new()
    }
}

/// Initial capacity of a `0..=years` series, capped at `MAX_PROJECTION_YEARS + 1`.
fn series_capacity(years: u32) -> usize {
    years.min(MAX_PROJECTION_YEARS) as usize + 1
}
