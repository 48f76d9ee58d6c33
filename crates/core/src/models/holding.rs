use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The asset class of a holding.
/// Fixed at creation: an edit can never turn one kind into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HoldingKind {
    /// Listed shares
    Equity,
    /// Listed real-estate investment trusts
    Reit,
    /// Investment trusts / mutual funds
    Fund,
    /// Bonds, carried at acquisition cost
    Bond,
    /// Bank deposits
    Deposit,
    /// Pension entitlements (future income only)
    Pension,
    /// Insurance policies
    Insurance,
}

impl HoldingKind {
    pub const ALL: [HoldingKind; 7] = [
        HoldingKind::Equity,
        HoldingKind::Reit,
        HoldingKind::Fund,
        HoldingKind::Bond,
        HoldingKind::Deposit,
        HoldingKind::Pension,
        HoldingKind::Insurance,
    ];

    /// Parse a kind name case-insensitively (e.g. "equity", "REIT").
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.to_string().eq_ignore_ascii_case(trimmed))
    }

    /// Kinds that carry a market price and can be refreshed from a quote.
    pub fn is_listed(&self) -> bool {
        matches!(self, HoldingKind::Equity | HoldingKind::Reit | HoldingKind::Fund)
    }
}

impl std::fmt::Display for HoldingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldingKind::Equity => write!(f, "Equity"),
            HoldingKind::Reit => write!(f, "Reit"),
            HoldingKind::Fund => write!(f, "Fund"),
            HoldingKind::Bond => write!(f, "Bond"),
            HoldingKind::Deposit => write!(f, "Deposit"),
            HoldingKind::Pension => write!(f, "Pension"),
            HoldingKind::Insurance => write!(f, "Insurance"),
        }
    }
}

/// Coarse qualitative risk classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskTag {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTag {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(RiskTag::Low),
            "medium" => Some(RiskTag::Medium),
            "high" => Some(RiskTag::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTag::Low => write!(f, "Low"),
            RiskTag::Medium => write!(f, "Medium"),
            RiskTag::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepositType {
    #[default]
    Ordinary,
    Term,
}

impl DepositType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordinary" => Some(DepositType::Ordinary),
            "term" => Some(DepositType::Term),
            _ => None,
        }
    }
}

impl std::fmt::Display for DepositType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DepositType::Ordinary => write!(f, "Ordinary"),
            DepositType::Term => write!(f, "Term"),
        }
    }
}

/// An Equity or REIT position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListedPosition {
    /// Ticker or display name; also used as the quote symbol
    pub name: String,
    pub quantity: f64,
    pub acquisition_price: f64,
    /// Latest known market price; falls back to the acquisition price when absent
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Annual dividend per share
    #[serde(default)]
    pub income_per_unit: Option<f64>,
    /// Brokerage account type (e.g. "NISA", "Specific", "General")
    #[serde(default)]
    pub account_type: String,
}

/// A fund position. Prices are per unit; distributions are quoted per
/// 10,000 units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FundPosition {
    pub name: String,
    pub units: f64,
    pub acquisition_price: f64,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub distribution_per_10k_units: Option<f64>,
    #[serde(default)]
    pub account_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BondPosition {
    pub name: String,
    pub units: f64,
    pub acquisition_price: f64,
    /// Required; optional here only so an incomplete form can be validated
    #[serde(default)]
    pub maturity_date: Option<NaiveDate>,
    /// Required unless `is_zero_coupon`
    #[serde(default)]
    pub coupon_rate_percent: Option<f64>,
    #[serde(default)]
    pub is_zero_coupon: bool,
    pub redemption_price: f64,
    #[serde(default)]
    pub rating: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepositPosition {
    pub bank_name: String,
    pub amount: f64,
    #[serde(default)]
    pub deposit_type: DepositType,
    #[serde(default)]
    pub interest_rate_percent: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PensionPosition {
    #[serde(default)]
    pub pension_type: String,
    #[serde(default)]
    pub total_contribution: Option<f64>,
    #[serde(default)]
    pub benefit_start_age: Option<u32>,
    pub expected_monthly_benefit: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsurancePosition {
    #[serde(default)]
    pub insurance_type: String,
    pub monthly_premium: f64,
    #[serde(default)]
    pub surrender_value: Option<f64>,
    #[serde(default)]
    pub maturity_benefit: Option<f64>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub maturity_date: Option<NaiveDate>,
}

/// Kind-specific part of a holding. One variant per [`HoldingKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Position {
    Equity(ListedPosition),
    Reit(ListedPosition),
    Fund(FundPosition),
    Bond(BondPosition),
    Deposit(DepositPosition),
    Pension(PensionPosition),
    Insurance(InsurancePosition),
}

impl Position {
    pub fn kind(&self) -> HoldingKind {
        match self {
            Position::Equity(_) => HoldingKind::Equity,
            Position::Reit(_) => HoldingKind::Reit,
            Position::Fund(_) => HoldingKind::Fund,
            Position::Bond(_) => HoldingKind::Bond,
            Position::Deposit(_) => HoldingKind::Deposit,
            Position::Pension(_) => HoldingKind::Pension,
            Position::Insurance(_) => HoldingKind::Insurance,
        }
    }
}

/// A single tracked financial position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Unique identifier
    pub id: Uuid,

    #[serde(default)]
    pub risk_tag: RiskTag,

    /// Free-text user label
    #[serde(default)]
    pub label: String,

    /// ISO currency code; `None` means the base currency
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(flatten)]
    pub position: Position,
}

impl Holding {
    pub fn new(position: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            risk_tag: RiskTag::default(),
            label: String::new(),
            currency: None,
            position,
        }
    }

    pub fn kind(&self) -> HoldingKind {
        self.position.kind()
    }

    pub fn with_risk(mut self, risk_tag: RiskTag) -> Self {
        self.risk_tag = risk_tag;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the currency; codes are stored upper-cased.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into().trim().to_uppercase());
        self
    }

    /// Human-readable name for listings: the security name, bank, pension
    /// type or insurance type depending on the kind.
    pub fn display_name(&self) -> &str {
        match &self.position {
            Position::Equity(p) | Position::Reit(p) => &p.name,
            Position::Fund(p) => &p.name,
            Position::Bond(p) => &p.name,
            Position::Deposit(p) => &p.bank_name,
            Position::Pension(p) => &p.pension_type,
            Position::Insurance(p) => &p.insurance_type,
        }
    }

    /// Quantity or units held, for kinds that have one.
    pub fn quantity(&self) -> Option<f64> {
        match &self.position {
            Position::Equity(p) | Position::Reit(p) => Some(p.quantity),
            Position::Fund(p) => Some(p.units),
            Position::Bond(p) => Some(p.units),
            Position::Deposit(_) | Position::Pension(_) | Position::Insurance(_) => None,
        }
    }

    /// Replace the market price of a listed holding. Returns `false` for
    /// kinds that are not marked to market.
    pub fn set_current_price(&mut self, price: f64) -> bool {
        match &mut self.position {
            Position::Equity(p) | Position::Reit(p) => {
                p.current_price = Some(price);
                true
            }
            Position::Fund(p) => {
                p.current_price = Some(price);
                true
            }
            Position::Bond(_) | Position::Deposit(_) | Position::Pension(_) | Position::Insurance(_) => {
                false
            }
        }
    }

    // ── Convenience constructors ────────────────────────────────────

    pub fn equity(name: impl Into<String>, quantity: f64, acquisition_price: f64) -> Self {
        Self::new(Position::Equity(ListedPosition {
            name: name.into(),
            quantity,
            acquisition_price,
            ..Default::default()
        }))
    }

    pub fn reit(name: impl Into<String>, quantity: f64, acquisition_price: f64) -> Self {
        Self::new(Position::Reit(ListedPosition {
            name: name.into(),
            quantity,
            acquisition_price,
            ..Default::default()
        }))
    }

    pub fn fund(name: impl Into<String>, units: f64, acquisition_price: f64) -> Self {
        Self::new(Position::Fund(FundPosition {
            name: name.into(),
            units,
            acquisition_price,
            ..Default::default()
        }))
    }

    pub fn deposit(bank_name: impl Into<String>, amount: f64) -> Self {
        Self::new(Position::Deposit(DepositPosition {
            bank_name: bank_name.into(),
            amount,
            ..Default::default()
        }))
    }

    pub fn pension(pension_type: impl Into<String>, expected_monthly_benefit: f64) -> Self {
        Self::new(Position::Pension(PensionPosition {
            pension_type: pension_type.into(),
            expected_monthly_benefit,
            ..Default::default()
        }))
    }
}
