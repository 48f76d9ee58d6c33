use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, FieldError, ValidationErrors};

use super::projection::ProjectionStrategy;

/// Whether a deposit's interest rate counts as periodic income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepositInterestPolicy {
    /// `income = amount * rate / 100` when a rate is set
    #[default]
    Accrue,
    /// Deposits never produce income
    Ignore,
}

/// Longest projection horizon accepted, in years.
pub const MAX_PROJECTION_YEARS: u32 = 100;

/// Lowest growth rate accepted: -100% wipes the assets out in one year.
pub const MIN_GROWTH_RATE: f64 = -1.0;

/// User-configurable settings, stored inside the portfolio snapshot.
///
/// Deserialization fills missing keys with defaults and then runs
/// [`Settings::validate`], so an out-of-range snapshot cannot load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSettings")]
pub struct Settings {
    /// Annual rate used by both projection series (0.03 = 3%), `>= -1`.
    pub growth_rate: f64,

    /// Projection horizon in years, at most [`MAX_PROJECTION_YEARS`].
    pub projection_years: u32,

    /// Model used by `WealthPlanner::project`.
    pub projection_strategy: ProjectionStrategy,

    pub deposit_interest: DepositInterestPolicy,

    /// How long a fetched quote stays fresh, in seconds.
    pub quote_ttl_secs: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            growth_rate: 0.03,
            projection_years: 30,
            projection_strategy: ProjectionStrategy::default(),
            deposit_interest: DepositInterestPolicy::default(),
            quote_ttl_secs: 300,
        }
    }
}

/// Unchecked wire shape; converted through [`Settings::try_from`].
#[derive(Deserialize)]
#[serde(default)]
struct RawSettings {
    growth_rate: f64,
    projection_years: u32,
    projection_strategy: ProjectionStrategy,
    deposit_interest: DepositInterestPolicy,
    quote_ttl_secs: i64,
}

impl Default for RawSettings {
    fn default() -> Self {
        let defaults = Settings::default();
        Self {
            growth_rate: defaults.growth_rate,
            projection_years: defaults.projection_years,
            projection_strategy: defaults.projection_strategy,
            deposit_interest: defaults.deposit_interest,
            quote_ttl_secs: defaults.quote_ttl_secs,
        }
    }
}

impl TryFrom<RawSettings> for Settings {
    type Error = CoreError;

    fn try_from(raw: RawSettings) -> Result<Self, Self::Error> {
        let settings = Settings {
            growth_rate: raw.growth_rate,
            projection_years: raw.projection_years,
            projection_strategy: raw.projection_strategy,
            deposit_interest: raw.deposit_interest,
            quote_ttl_secs: raw.quote_ttl_secs,
        };
        settings.validate().into_result()?;
        Ok(settings)
    }
}

impl Settings {
    /// Parse settings from JSON. Missing keys take their defaults;
    /// out-of-range values are rejected.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Range checks for every field. Empty means the settings are usable.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if !self.growth_rate.is_finite() {
            errors.add("growth_rate", FieldError::NotFinite);
        } else if self.growth_rate < MIN_GROWTH_RATE {
            errors.add("growth_rate", FieldError::OutOfRange);
        }
        if self.projection_years > MAX_PROJECTION_YEARS {
            errors.add("projection_years", FieldError::OutOfRange);
        }
        if self.quote_ttl_secs < 0 {
            errors.add("quote_ttl_secs", FieldError::Negative);
        }
        errors
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize settings: {e}")))
    }
}
