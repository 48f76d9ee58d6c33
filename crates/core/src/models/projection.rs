use serde::{Deserialize, Serialize};

/// Which projection model to run.
///
/// The models are independent; none is a refinement of another.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionStrategy {
    /// Assets compound at a fixed annual rate
    CompoundingGrowth,
    /// Assets compound while income is added and living costs withdrawn
    #[default]
    CashflowCoverage,
    /// Current assets plus contributions until retirement, no compounding
    LinearGoal,
}

impl std::fmt::Display for ProjectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionStrategy::CompoundingGrowth => write!(f, "CompoundingGrowth"),
            ProjectionStrategy::CashflowCoverage => write!(f, "CashflowCoverage"),
            ProjectionStrategy::LinearGoal => write!(f, "LinearGoal"),
        }
    }
}

/// One year of the compounding growth series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    /// Years from now (0 = today)
    pub year: u32,
    pub asset_value: f64,
}

/// One year of the cashflow coverage series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashflowPoint {
    pub year: u32,

    /// Simulated balance at the start of the year. May be negative.
    pub asset_balance: f64,

    pub annual_income: f64,

    pub annual_living_cost: f64,

    /// `annual_income / annual_living_cost * 100`, 0 when there is no living cost
    pub coverage_percent: f64,
}

impl CashflowPoint {
    /// Balance floored at zero, for charts that should not dip below the axis.
    pub fn display_balance(&self) -> f64 {
        self.asset_balance.max(0.0)
    }

    /// `true` once withdrawals have exhausted the assets.
    pub fn is_depleted(&self) -> bool {
        self.asset_balance < 0.0
    }
}

/// Result of the linear goal-achievement model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalProjection {
    pub years_to_retirement: u32,
    pub total_contributions: f64,
    pub projected_amount: f64,
    /// `max(0, target - projected)`
    pub shortfall: f64,
    pub achievement_percent: f64,
}

impl GoalProjection {
    pub fn is_achieved(&self) -> bool {
        self.shortfall <= 0.0
    }
}

/// Output of whichever [`ProjectionStrategy`] was run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", content = "result")]
pub enum Projection {
    Growth(Vec<GrowthPoint>),
    Cashflow(Vec<CashflowPoint>),
    Goal(GoalProjection),
}
