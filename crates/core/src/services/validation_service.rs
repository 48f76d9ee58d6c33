use crate::errors::{FieldError, ValidationErrors};
use crate::models::goal::GoalParameters;
use crate::models::holding::{Holding, HoldingKind, Position};
use crate::models::rates::is_currency_code;

/// Per-kind required-field rules for holdings and goal parameters.
///
/// Never short-circuits: every broken field is reported in one pass so a
/// form can highlight all of them at once. Never mutates its input.
pub struct ValidationService;

impl ValidationService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a holding as it would be committed by an add or update.
    ///
    /// Rules:
    /// - Currency, when present, is a 3-letter code
    /// - Quantities, units, amounts and acquisition prices are `> 0`
    /// - Every other number is finite and `>= 0`
    /// - Names / bank names are not blank
    /// - Bonds need a maturity date, a redemption price `> 0`,
    ///   and a coupon rate unless they are zero-coupon
    pub fn validate(&self, holding: &Holding) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        if let Some(currency) = &holding.currency {
            if !currency.trim().is_empty() && !is_currency_code(currency) {
                errors.add("currency", FieldError::InvalidCurrency);
            }
        }

        match &holding.position {
            Position::Equity(p) | Position::Reit(p) => {
                require_text(&mut errors, "name", &p.name);
                require_positive(&mut errors, "quantity", p.quantity);
                require_positive(&mut errors, "acquisition_price", p.acquisition_price);
                optional_non_negative(&mut errors, "current_price", p.current_price);
                optional_non_negative(&mut errors, "income_per_unit", p.income_per_unit);
            }
            Position::Fund(p) => {
                require_text(&mut errors, "name", &p.name);
                require_positive(&mut errors, "units", p.units);
                require_positive(&mut errors, "acquisition_price", p.acquisition_price);
                optional_non_negative(&mut errors, "current_price", p.current_price);
                optional_non_negative(
                    &mut errors,
                    "distribution_per_10k_units",
                    p.distribution_per_10k_units,
                );
            }
            Position::Bond(p) => {
                require_text(&mut errors, "name", &p.name);
                require_positive(&mut errors, "units", p.units);
                require_positive(&mut errors, "acquisition_price", p.acquisition_price);
                if p.maturity_date.is_none() {
                    errors.add("maturity_date", FieldError::Required);
                }
                match p.coupon_rate_percent {
                    Some(rate) => require_non_negative(&mut errors, "coupon_rate_percent", rate),
                    None if !p.is_zero_coupon => {
                        errors.add("coupon_rate_percent", FieldError::Required)
                    }
                    None => {}
                }
                require_positive(&mut errors, "redemption_price", p.redemption_price);
            }
            Position::Deposit(p) => {
                require_text(&mut errors, "bank_name", &p.bank_name);
                require_positive(&mut errors, "amount", p.amount);
                optional_non_negative(&mut errors, "interest_rate_percent", p.interest_rate_percent);
            }
            Position::Pension(p) => {
                optional_non_negative(&mut errors, "total_contribution", p.total_contribution);
                require_non_negative(
                    &mut errors,
                    "expected_monthly_benefit",
                    p.expected_monthly_benefit,
                );
            }
            Position::Insurance(p) => {
                require_non_negative(&mut errors, "monthly_premium", p.monthly_premium);
                optional_non_negative(&mut errors, "surrender_value", p.surrender_value);
                optional_non_negative(&mut errors, "maturity_benefit", p.maturity_benefit);
            }
        }

        errors
    }

    /// Validate `holding` and additionally check it against the holdings
    /// already committed: a listed holding (Equity/Reit/Fund) may not repeat
    /// the `(kind, name, account_type)` of another holding.
    /// The holding's own id is ignored so an edit does not collide with itself.
    pub fn validate_against(&self, holding: &Holding, existing: &[Holding]) -> ValidationErrors {
        let mut errors = self.validate(holding);

        if let Some(key) = listing_key(holding) {
            let clash = existing
                .iter()
                .filter(|other| other.id != holding.id)
                .filter_map(listing_key)
                .any(|other_key| other_key == key);
            if clash {
                errors.add("name", FieldError::Duplicate);
            }
        }

        errors
    }

    /// Validate retirement goal parameters.
    pub fn validate_goal(&self, goal: &GoalParameters) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if goal.retirement_age < goal.current_age {
            errors.add("retirement_age", FieldError::OutOfRange);
        }
        require_non_negative(&mut errors, "target_amount", goal.target_amount);
        require_non_negative(&mut errors, "monthly_contribution", goal.monthly_contribution);
        require_non_negative(&mut errors, "monthly_living_cost", goal.monthly_living_cost);
        errors
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::new()
    }
}

fn listing_key(holding: &Holding) -> Option<(HoldingKind, String, String)> {
    let (name, account) = match &holding.position {
        Position::Equity(p) | Position::Reit(p) => (&p.name, &p.account_type),
        Position::Fund(p) => (&p.name, &p.account_type),
        _ => return None,
    };
    Some((
        holding.kind(),
        name.trim().to_lowercase(),
        account.trim().to_lowercase(),
    ))
}

fn require_text(errors: &mut ValidationErrors, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, FieldError::Required);
    }
}

fn require_positive(errors: &mut ValidationErrors, field: &'static str, value: f64) {
    if !value.is_finite() {
        errors.add(field, FieldError::NotFinite);
    } else if value < 0.0 {
        errors.add(field, FieldError::Negative);
    } else if value == 0.0 {
        errors.add(field, FieldError::NotPositive);
    }
}

fn require_non_negative(errors: &mut ValidationErrors, field: &'static str, value: f64) {
    if !value.is_finite() {
        errors.add(field, FieldError::NotFinite);
    } else if value < 0.0 {
        errors.add(field, FieldError::Negative);
    }
}

fn optional_non_negative(errors: &mut ValidationErrors, field: &'static str, value: Option<f64>) {
    if let Some(v) = value {
        require_non_negative(errors, field, v);
    }
}
