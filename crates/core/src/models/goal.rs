use serde::{Deserialize, Serialize};

/// Retirement goal inputs supplied by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalParameters {
    pub current_age: u32,
    /// Must be `>= current_age`
    pub retirement_age: u32,
    /// Amount wanted at retirement, in the base currency
    pub target_amount: f64,
    pub monthly_contribution: f64,
    pub monthly_living_cost: f64,
}

impl GoalParameters {
    /// Whole years left until retirement (0 if already past it).
    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    pub fn annual_living_cost(&self) -> f64 {
        self.monthly_living_cost * 12.0
    }
}

impl Default for GoalParameters {
    fn default() -> Self {
        Self {
            current_age: 30,
            retirement_age: 65,
            target_amount: 0.0,
            monthly_contribution: 0.0,
            monthly_living_cost: 0.0,
        }
    }
}
