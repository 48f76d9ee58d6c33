use crate::models::holding::{Holding, Position};
use crate::models::rates::RateTable;
use crate::models::settings::DepositInterestPolicy;
use crate::models::valuation::Valuation;

use super::currency_service::CurrencyService;

/// Maps one holding + rate table to its valuation figures.
///
/// Pure business logic: no I/O, no state beyond the configured policy.
/// Any ratio with a zero denominator is 0, never NaN.
pub struct ValuationService {
    currency_service: CurrencyService,
    deposit_interest: DepositInterestPolicy,
}

impl ValuationService {
    pub fn new() -> Self {
        Self::with_policy(DepositInterestPolicy::default())
    }

    pub fn with_policy(deposit_interest: DepositInterestPolicy) -> Self {
        Self {
            currency_service: CurrencyService::new(),
            deposit_interest,
        }
    }

    /// Compute evaluation, cost basis, profit and income for a holding.
    ///
    /// - Equity/Reit: marked to `current_price`, falling back to cost
    /// - Fund: as above with a per-unit price; only distributions are
    ///   quoted per 10,000 units
    /// - Bond: carried at cost, income is the coupon on the redemption price
    /// - Deposit: the amount, plus interest income if the policy accrues it
    /// - Pension: evaluation 0, income = 12 × monthly benefit
    /// - Insurance: surrender value, no income
    pub fn valuate(&self, holding: &Holding, rates: &RateTable) -> Valuation {
        let base = |amount: f64| self.currency_service.holding_to_base(holding, amount, rates);

        match &holding.position {
            Position::Equity(p) | Position::Reit(p) => {
                let price = p.current_price.unwrap_or(p.acquisition_price);
                let evaluation = p.quantity * base(price);
                let cost_basis = p.quantity * base(p.acquisition_price);
                let income = p.quantity * base(p.income_per_unit.unwrap_or(0.0));
                marked_to_market(evaluation, cost_basis, income)
            }
            Position::Fund(p) => {
                let price = p.current_price.unwrap_or(p.acquisition_price);
                let evaluation = p.units * base(price);
                let cost_basis = p.units * base(p.acquisition_price);
                let income = (p.units / 10_000.0) * base(p.distribution_per_10k_units.unwrap_or(0.0));
                marked_to_market(evaluation, cost_basis, income)
            }
            Position::Bond(p) => {
                let evaluation = p.units * base(p.acquisition_price);
                let income = if p.is_zero_coupon {
                    0.0
                } else {
                    p.units * (p.coupon_rate_percent.unwrap_or(0.0) / 100.0) * base(p.redemption_price)
                };
                Valuation {
                    evaluation,
                    cost_basis: Some(evaluation),
                    profit: None,
                    profit_rate_percent: None,
                    income,
                    income_yield_percent: Some(percent_of(income, evaluation)),
                }
            }
            Position::Deposit(p) => {
                let evaluation = base(p.amount);
                let income = match (self.deposit_interest, p.interest_rate_percent) {
                    (DepositInterestPolicy::Accrue, Some(rate)) => evaluation * (rate / 100.0),
                    _ => 0.0,
                };
                Valuation {
                    evaluation,
                    cost_basis: Some(evaluation),
                    profit: None,
                    profit_rate_percent: None,
                    income,
                    income_yield_percent: Some(percent_of(income, evaluation)),
                }
            }
            Position::Pension(p) => Valuation {
                evaluation: 0.0,
                cost_basis: None,
                profit: None,
                profit_rate_percent: None,
                income: base(p.expected_monthly_benefit) * 12.0,
                income_yield_percent: None,
            },
            Position::Insurance(p) => Valuation {
                evaluation: base(p.surrender_value.unwrap_or(0.0)),
                cost_basis: None,
                profit: None,
                profit_rate_percent: None,
                income: 0.0,
                income_yield_percent: None,
            },
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}

fn marked_to_market(evaluation: f64, cost_basis: f64, income: f64) -> Valuation {
    let profit = evaluation - cost_basis;
    Valuation {
        evaluation,
        cost_basis: Some(cost_basis),
        profit: Some(profit),
        profit_rate_percent: Some(percent_of(profit, cost_basis)),
        income,
        income_yield_percent: Some(percent_of(income, evaluation)),
    }
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub(crate) fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
