use serde::{Deserialize, Serialize};

use super::goal::GoalParameters;
use super::holding::Holding;
use super::rates::RateTable;
use super::settings::Settings;

/// The application state snapshot handed to the engine.
///
/// Contains: the holdings, the rate table (which also fixes the base
/// currency), the optional retirement goal and user settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// All tracked holdings, in insertion order
    pub holdings: Vec<Holding>,

    /// Conversion rates into the base currency
    #[serde(default)]
    pub rate_table: RateTable,

    /// Retirement goal, if the user configured one
    #[serde(default)]
    pub goal: Option<GoalParameters>,

    #[serde(default)]
    pub settings: Settings,
}

impl Portfolio {
    pub fn base_currency(&self) -> &str {
        self.rate_table.base_currency()
    }
}
