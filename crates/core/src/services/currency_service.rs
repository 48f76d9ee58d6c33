use log::debug;

use crate::models::holding::Holding;
use crate::models::rates::RateTable;

/// Converts holding amounts into the base currency of a [`RateTable`].
///
/// - Base currency (or no currency) → amount unchanged
/// - Known foreign currency → `amount * rate`
/// - Unknown currency → amount unchanged (identity fallback, never an error)
pub struct CurrencyService;

impl CurrencyService {
    pub fn new() -> Self {
        Self
    }

    /// Convert `amount` denominated in `currency` to the base currency.
    /// E.g. to_base(100.0, Some("USD"), {USD: 150}) → 15000.0
    pub fn to_base(&self, amount: f64, currency: Option<&str>, rates: &RateTable) -> f64 {
        let Some(code) = currency else {
            return amount;
        };
        if code.trim().is_empty() || rates.is_base(code) {
            return amount;
        }

        match rates.rate_for(code) {
            Some(rate) => amount * rate,
            None => {
                debug!(
                    "No rate for {} in table based on {}; using amount as-is",
                    code,
                    rates.base_currency()
                );
                amount
            }
        }
    }

    /// Convert an amount expressed in `holding`'s own currency.
    pub fn holding_to_base(&self, holding: &Holding, amount: f64, rates: &RateTable) -> f64 {
        self.to_base(amount, holding.currency.as_deref(), rates)
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
