use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::holding::{HoldingKind, RiskTag};
use super::valuation::Valuation;

/// Summary of the whole holding set, in the base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Currency used for all monetary values
    pub currency: String,

    /// Number of holdings summarized
    pub holding_count: usize,

    /// Sum of all evaluations (pensions contribute 0)
    pub total_assets: f64,

    /// Evaluation grouped by asset class
    pub by_class: BTreeMap<HoldingKind, f64>,

    /// Evaluation grouped by risk tier
    pub by_risk: BTreeMap<RiskTag, f64>,

    /// Sum of annualized income across holdings
    pub annual_income: f64,

    /// `annual_income / 12`
    pub monthly_income: f64,

    /// Per-holding figures, in the same order as the input holdings
    pub holdings: Vec<HoldingFigures>,
}

impl PortfolioSummary {
    /// Share of `total_assets` held in `kind`, as a percentage.
    pub fn class_percent(&self, kind: HoldingKind) -> f64 {
        let value = self.by_class.get(&kind).copied().unwrap_or(0.0);
        if self.total_assets > 0.0 {
            value / self.total_assets * 100.0
        } else {
            0.0
        }
    }

    /// Share of `total_assets` in the given risk tier, as a percentage.
    pub fn risk_percent(&self, tier: RiskTag) -> f64 {
        let value = self.by_risk.get(&tier).copied().unwrap_or(0.0);
        if self.total_assets > 0.0 {
            value / self.total_assets * 100.0
        } else {
            0.0
        }
    }
}

/// Figures for a single holding, aligned with the input snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingFigures {
    pub holding_id: Uuid,
    pub kind: HoldingKind,
    pub risk_tag: RiskTag,

    /// Display name (security, bank, pension or policy type)
    pub name: String,

    /// Quantity or units, when the kind has one
    pub quantity: Option<f64>,

    pub valuation: Valuation,

    /// This holding's evaluation / total assets × 100
    pub allocation_percent: f64,
}
