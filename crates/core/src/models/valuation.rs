use serde::{Deserialize, Serialize};

/// Per-holding figures, all in the base currency.
///
/// Optional fields are `None` when the figure is not defined for the kind:
/// bonds have no profit (held at cost), pensions and insurance policies
/// have no cost basis or yield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Current carrying value
    pub evaluation: f64,

    pub cost_basis: Option<f64>,

    /// `evaluation - cost_basis`
    pub profit: Option<f64>,

    /// `profit / cost_basis * 100`, 0 when the cost basis is 0
    pub profit_rate_percent: Option<f64>,

    /// Annualized cash income (dividend, coupon, distribution, interest, benefit)
    pub income: f64,

    /// `income / evaluation * 100`, 0 when the evaluation is 0
    pub income_yield_percent: Option<f64>,
}
