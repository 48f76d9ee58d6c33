use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

pub const DEFAULT_BASE_CURRENCY: &str = "JPY";

/// Multipliers from foreign currencies to the base currency.
///
/// `amount_in_base = amount * rate`. The base currency always resolves to 1.
/// Every stored rate is finite and strictly positive; codes are upper-cased.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRateTable")]
pub struct RateTable {
    base_currency: String,
    rates: HashMap<String, f64>,
}

/// Unchecked wire shape; converted through [`RateTable::try_from`].
#[derive(Deserialize)]
struct RawRateTable {
    base_currency: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

impl TryFrom<RawRateTable> for RateTable {
    type Error = CoreError;

    fn try_from(raw: RawRateTable) -> Result<Self, Self::Error> {
        let mut table = RateTable::new(&raw.base_currency)?;
        for (code, rate) in raw.rates {
            table.set_rate(&code, rate)?;
        }
        Ok(table)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            base_currency: DEFAULT_BASE_CURRENCY.to_string(),
            rates: HashMap::new(),
        }
    }
}

impl RateTable {
    /// Create an empty table for the given base currency.
    pub fn new(base_currency: &str) -> Result<Self, CoreError> {
        Ok(Self {
            base_currency: normalize_code(base_currency)?,
            rates: HashMap::new(),
        })
    }

    /// Builder-style [`RateTable::set_rate`].
    pub fn with_rate(mut self, currency: &str, rate: f64) -> Result<Self, CoreError> {
        self.set_rate(currency, rate)?;
        Ok(self)
    }

    /// Insert or replace the multiplier for `currency`.
    /// Setting the base currency itself is accepted only with a rate of 1.
    pub fn set_rate(&mut self, currency: &str, rate: f64) -> Result<(), CoreError> {
        let code = normalize_code(currency)?;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(CoreError::InvalidRate {
                currency: code,
                rate,
            });
        }
        if code == self.base_currency {
            if rate != 1.0 {
                return Err(CoreError::InvalidRate {
                    currency: code,
                    rate,
                });
            }
            return Ok(());
        }
        self.rates.insert(code, rate);
        Ok(())
    }

    pub fn remove_rate(&mut self, currency: &str) -> Option<f64> {
        self.rates.remove(&currency.trim().to_uppercase())
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    /// Multiplier for `currency`, `Some(1.0)` for the base currency,
    /// `None` when the table has no entry.
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        let code = currency.trim().to_uppercase();
        if code == self.base_currency {
            return Some(1.0);
        }
        self.rates.get(&code).copied()
    }

    pub fn is_base(&self, currency: &str) -> bool {
        currency.trim().eq_ignore_ascii_case(&self.base_currency)
    }

    /// Number of non-base rates.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// All non-base codes, sorted.
    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}

/// Trim and upper-case a currency code, rejecting anything but 3 ASCII letters.
pub fn normalize_code(code: &str) -> Result<String, CoreError> {
    let trimmed = code.trim().to_uppercase();
    if is_currency_code(&trimmed) {
        Ok(trimmed)
    } else {
        Err(CoreError::InvalidCurrency(code.to_string()))
    }
}

pub fn is_currency_code(code: &str) -> bool {
    let trimmed = code.trim();
    trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic())
}
