use std::collections::BTreeMap;

use crate::models::analytics::{HoldingFigures, PortfolioSummary};
use crate::models::holding::Holding;
use crate::models::rates::RateTable;
use crate::models::settings::DepositInterestPolicy;
use crate::services::valuation_service::{percent_of, ValuationService};

/// Sort order for per-holding figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingSortOrder {
    /// Alphabetical by display name (case-insensitive)
    NameAsc,
    /// Reverse alphabetical by display name
    NameDesc,
    /// Highest income yield first
    IncomeYieldDesc,
    /// Largest quantity / units first
    QuantityDesc,
    /// Best profit rate first
    ProfitRateDesc,
}

/// Folds a holding snapshot into totals, per-class and per-risk sums,
/// and total income.
///
/// Invariant: `Σ by_class == total_assets == Σ by_risk`, since every
/// holding's evaluation is added to exactly one entry of each map.
pub struct AnalyticsService {
    valuation_service: ValuationService,
}

impl AnalyticsService {
    pub fn new() -> Self {
        Self {
            valuation_service: ValuationService::new(),
        }
    }

    pub fn with_policy(deposit_interest: DepositInterestPolicy) -> Self {
        Self {
            valuation_service: ValuationService::with_policy(deposit_interest),
        }
    }

    /// Summarize `holdings` in the base currency of `rates`.
    ///
    /// Per-holding figures keep the input order; use [`sort_figures`]
    /// for display ordering.
    ///
    /// [`sort_figures`]: AnalyticsService::sort_figures
    pub fn summarize(&self, holdings: &[Holding], rates: &RateTable) -> PortfolioSummary {
        let mut total_assets = 0.0;
        let mut annual_income = 0.0;
        let mut by_class = BTreeMap::new();
        let mut by_risk = BTreeMap::new();
        let mut figures = Vec::with_capacity(holdings.len());

        for holding in holdings {
            let valuation = self.valuation_service.valuate(holding, rates);

            total_assets += valuation.evaluation;
            annual_income += valuation.income;
            *by_class.entry(holding.kind()).or_insert(0.0) += valuation.evaluation;
            *by_risk.entry(holding.risk_tag).or_insert(0.0) += valuation.evaluation;

            figures.push(HoldingFigures {
                holding_id: holding.id,
                kind: holding.kind(),
                risk_tag: holding.risk_tag,
                name: holding.display_name().to_string(),
                quantity: holding.quantity(),
                valuation,
                allocation_percent: 0.0, // filled below
            });
        }

        for figure in &mut figures {
            figure.allocation_percent = percent_of(figure.valuation.evaluation, total_assets);
        }

        PortfolioSummary {
            currency: rates.base_currency().to_string(),
            holding_count: holdings.len(),
            total_assets,
            by_class,
            by_risk,
            annual_income,
            monthly_income: annual_income / 12.0,
            holdings: figures,
        }
    }

    /// Sort per-holding figures in place.
    /// Figures that lack the sort metric (e.g. a pension's quantity) go last.
    pub fn sort_figures(&self, figures: &mut [HoldingFigures], order: HoldingSortOrder) {
        match order {
            HoldingSortOrder::NameAsc => {
                figures.sort_by_key(|f| f.name.to_lowercase());
            }
            HoldingSortOrder::NameDesc => {
                figures.sort_by_key(|f| std::cmp::Reverse(f.name.to_lowercase()));
            }
            HoldingSortOrder::IncomeYieldDesc => {
                figures.sort_by(|a, b| {
                    desc_missing_last(a.valuation.income_yield_percent, b.valuation.income_yield_percent)
                });
            }
            HoldingSortOrder::QuantityDesc => {
                figures.sort_by(|a, b| desc_missing_last(a.quantity, b.quantity));
            }
            HoldingSortOrder::ProfitRateDesc => {
                figures.sort_by(|a, b| {
                    desc_missing_last(a.valuation.profit_rate_percent, b.valuation.profit_rate_percent)
                });
            }
        }
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}

fn desc_missing_last(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
