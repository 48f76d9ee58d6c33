pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::Utc;
use log::{debug, warn};
use uuid::Uuid;

use errors::{CoreError, ValidationErrors};
use models::{
    analytics::{HoldingFigures, PortfolioSummary},
    goal::GoalParameters,
    holding::{Holding, HoldingKind},
    portfolio::Portfolio,
    projection::{CashflowPoint, GoalProjection, GrowthPoint, Projection, ProjectionStrategy},
    quote::QuoteCache,
    rates::RateTable,
    settings::Settings,
};
use providers::traits::QuoteProvider;
use services::{
    analytics_service::{AnalyticsService, HoldingSortOrder},
    portfolio_service::PortfolioService,
    projection_service::ProjectionService,
    quote_service::{QuoteRefreshReport, QuoteService},
    validation_service::ValidationService,
};
use storage::csv_format::{self, ImportReport, MalformedRow};

/// Main entry point for the Wealth Planner core library.
///
/// Owns the application state snapshot and the services that operate on
/// it. Every read (summary, projections) is recomputed from the current
/// snapshot; nothing is cached between calls except market quotes.
#[must_use]
pub struct WealthPlanner {
    portfolio: Portfolio,
    portfolio_service: PortfolioService,
    validation_service: ValidationService,
    analytics_service: AnalyticsService,
    projection_service: ProjectionService,
    quote_service: QuoteService,
    /// Tracks whether any mutation has occurred since the last export/load.
    dirty: bool,
}

impl std::fmt::Debug for WealthPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WealthPlanner")
            .field("holdings", &self.portfolio.holdings.len())
            .field("base_currency", &self.portfolio.base_currency())
            .field("settings", &self.portfolio.settings)
            .field("cached_quotes", &self.quote_service.cache().len())
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl WealthPlanner {
    /// Create an empty planner with default settings and a JPY base.
    pub fn create_new() -> Self {
        Self::build(Portfolio::default())
    }

    /// Start from an existing snapshot (e.g. one restored by the host app).
    ///
    /// Every holding goes through the same checks as [`WealthPlanner::add_holding`]
    /// (field rules, duplicate ids and listings, currency normalization) and the
    /// goal through [`WealthPlanner::set_goal`]'s. The first failure rejects the
    /// whole snapshot.
    pub fn from_portfolio(portfolio: Portfolio) -> Result<Self, CoreError> {
        let Portfolio {
            holdings,
            rate_table,
            goal,
            settings,
        } = portfolio;

        settings.validate().into_result()?;
        let validation_service = ValidationService::new();
        if let Some(goal) = &goal {
            validation_service.validate_goal(goal).into_result()?;
        }

        let mut checked = Portfolio {
            holdings: Vec::with_capacity(holdings.len()),
            rate_table,
            goal,
            settings,
        };
        let portfolio_service = PortfolioService::new();
        for holding in holdings {
            let id = holding.id;
            portfolio_service
                .add_holding(&mut checked, holding)
                .inspect_err(|e| warn!("Rejecting snapshot at holding {id}: {e}"))?;
        }
        Ok(Self::build(checked))
    }

    /// Restore a snapshot previously produced by [`WealthPlanner::to_json`].
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let portfolio: Portfolio = serde_json::from_str(json)?;
        Self::from_portfolio(portfolio)
    }

    /// Serialize the whole snapshot. Clears the unsaved-changes flag.
    pub fn to_json(&mut self) -> Result<String, CoreError> {
        let json = serde_json::to_string_pretty(&self.portfolio)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize portfolio: {e}")))?;
        self.dirty = false;
        Ok(json)
    }

    #[must_use]
    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    // ── Holding Management ──────────────────────────────────────────

    /// Check a holding without committing it.
    /// Returns every field problem at once; empty means it can be added.
    pub fn validate_holding(&self, holding: &Holding) -> ValidationErrors {
        self.validation_service
            .validate_against(holding, &self.portfolio.holdings)
    }

    /// Add a holding. Rejected with `CoreError::Validation` if any field is invalid.
    pub fn add_holding(&mut self, holding: Holding) -> Result<Uuid, CoreError> {
        let id = self.portfolio_service.add_holding(&mut self.portfolio, holding)?;
        self.dirty = true;
        Ok(id)
    }

    /// Replace a holding by id. The kind cannot change.
    pub fn update_holding(&mut self, holding_id: Uuid, holding: Holding) -> Result<(), CoreError> {
        self.portfolio_service
            .update_holding(&mut self.portfolio, holding_id, holding)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove a holding by id and return it.
    pub fn remove_holding(&mut self, holding_id: Uuid) -> Result<Holding, CoreError> {
        let removed = self
            .portfolio_service
            .remove_holding(&mut self.portfolio, holding_id)?;
        self.dirty = true;
        Ok(removed)
    }

    #[must_use]
    pub fn get_holding(&self, holding_id: Uuid) -> Option<&Holding> {
        self.portfolio_service.get_holding(&self.portfolio, holding_id)
    }

    /// All holdings, in insertion order.
    #[must_use]
    pub fn get_holdings(&self) -> &[Holding] {
        &self.portfolio.holdings
    }

    #[must_use]
    pub fn get_holdings_of_kind(&self, kind: HoldingKind) -> Vec<&Holding> {
        self.portfolio
            .holdings
            .iter()
            .filter(|h| h.kind() == kind)
            .collect()
    }

    #[must_use]
    pub fn holding_count(&self) -> usize {
        self.portfolio.holdings.len()
    }

    // ── Rates, Goal & Settings ──────────────────────────────────────

    #[must_use]
    pub fn rate_table(&self) -> &RateTable {
        &self.portfolio.rate_table
    }

    /// Replace the rate table (and with it the base currency).
    pub fn set_rate_table(&mut self, rate_table: RateTable) {
        self.portfolio.rate_table = rate_table;
        self.dirty = true;
    }

    /// Set a single conversion rate into the base currency.
    pub fn set_rate(&mut self, currency: &str, rate: f64) -> Result<(), CoreError> {
        self.portfolio.rate_table.set_rate(currency, rate)?;
        self.dirty = true;
        Ok(())
    }

    #[must_use]
    pub fn goal(&self) -> Option<&GoalParameters> {
        self.portfolio.goal.as_ref()
    }

    /// Set the retirement goal after validating it.
    pub fn set_goal(&mut self, goal: GoalParameters) -> Result<(), CoreError> {
        self.validation_service.validate_goal(&goal).into_result()?;
        self.portfolio.goal = Some(goal);
        self.dirty = true;
        Ok(())
    }

    pub fn clear_goal(&mut self) {
        if self.portfolio.goal.take().is_some() {
            self.dirty = true;
        }
    }

    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.portfolio.settings
    }

    /// Replace the settings after range-checking them.
    /// Valuation policy and quote TTL take effect immediately.
    pub fn set_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        settings.validate().into_result()?;
        let ttl_changed = settings.quote_ttl_secs != self.portfolio.settings.quote_ttl_secs;
        self.portfolio.settings = settings;
        self.analytics_service =
            AnalyticsService::with_policy(self.portfolio.settings.deposit_interest);
        if ttl_changed {
            self.quote_service =
                QuoteService::new(QuoteCache::with_ttl_secs(self.portfolio.settings.quote_ttl_secs));
        }
        self.dirty = true;
        Ok(())
    }

    /// Returns `true` if the snapshot changed since it was created, loaded or exported.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Totals, per-class and per-risk sums, income and per-holding figures.
    #[must_use]
    pub fn get_summary(&self) -> PortfolioSummary {
        self.analytics_service
            .summarize(&self.portfolio.holdings, &self.portfolio.rate_table)
    }

    /// Per-holding figures in the requested display order.
    #[must_use]
    pub fn get_holding_figures(&self, order: HoldingSortOrder) -> Vec<HoldingFigures> {
        let mut figures = self.get_summary().holdings;
        self.analytics_service.sort_figures(&mut figures, order);
        figures
    }

    // ── Projections ─────────────────────────────────────────────────

    /// Compounding growth of current total assets at the configured rate.
    #[must_use]
    pub fn growth_series(&self) -> Vec<GrowthPoint> {
        let settings = &self.portfolio.settings;
        self.projection_service.growth_series(
            self.get_summary().total_assets,
            settings.growth_rate,
            settings.projection_years,
        )
    }

    /// Cashflow coverage against the goal's monthly living cost.
    pub fn cashflow_series(&self) -> Result<Vec<CashflowPoint>, CoreError> {
        let goal = self.portfolio.goal.as_ref().ok_or(CoreError::GoalNotSet)?;
        let settings = &self.portfolio.settings;
        let summary = self.get_summary();
        Ok(self.projection_service.cashflow_series(
            summary.total_assets,
            summary.annual_income,
            goal.monthly_living_cost,
            settings.growth_rate,
            settings.projection_years,
        ))
    }

    /// Linear goal-achievement estimate.
    pub fn goal_projection(&self) -> Result<GoalProjection, CoreError> {
        let goal = self.portfolio.goal.as_ref().ok_or(CoreError::GoalNotSet)?;
        Ok(self
            .projection_service
            .goal_projection(self.get_summary().total_assets, goal))
    }

    /// Run the projection model selected in settings.
    pub fn project(&self) -> Result<Projection, CoreError> {
        self.project_with(self.portfolio.settings.projection_strategy)
    }

    /// Run a specific projection model.
    pub fn project_with(&self, strategy: ProjectionStrategy) -> Result<Projection, CoreError> {
        debug!("Running {strategy} projection");
        match strategy {
            ProjectionStrategy::CompoundingGrowth => Ok(Projection::Growth(self.growth_series())),
            ProjectionStrategy::CashflowCoverage => self.cashflow_series().map(Projection::Cashflow),
            ProjectionStrategy::LinearGoal => self.goal_projection().map(Projection::Goal),
        }
    }

    // ── Quotes ──────────────────────────────────────────────────────

    /// Refresh `current_price` of listed holdings from `provider`.
    /// Individual failures are reported, never fatal.
    pub async fn refresh_quotes(&mut self, provider: &dyn QuoteProvider) -> QuoteRefreshReport {
        let report = self
            .quote_service
            .refresh_holdings(provider, &mut self.portfolio.holdings, Utc::now())
            .await;
        if !report.updated.is_empty() {
            self.dirty = true;
        }
        report
    }

    /// Number of quotes currently held in the cache (fresh or not).
    #[must_use]
    pub fn cached_quote_count(&self) -> usize {
        self.quote_service.cache().len()
    }

    pub fn clear_quote_cache(&mut self) {
        self.quote_service.cache_mut().clear();
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export all holdings in the fixed CSV column layout.
    pub fn export_csv(&self) -> Result<String, CoreError> {
        csv_format::export_holdings(&self.portfolio.holdings)
    }

    /// Import holdings from CSV.
    ///
    /// Rows that fail to parse or validate are skipped and reported;
    /// every other row is added.
    pub fn import_csv(&mut self, csv: &str) -> Result<ImportReport, CoreError> {
        let (rows, skipped) = csv_format::parse_rows(csv)?;
        let mut report = ImportReport {
            holdings: Vec::with_capacity(rows.len()),
            skipped,
        };

        for row in rows {
            match self
                .portfolio_service
                .add_holding(&mut self.portfolio, row.holding.clone())
            {
                Ok(_) => report.holdings.push(row.holding),
                Err(e) => {
                    warn!("Skipping CSV line {}: {e}", row.line);
                    report.skipped.push(MalformedRow {
                        line: row.line,
                        message: e.to_string(),
                    });
                }
            }
        }
        report.skipped.sort_by_key(|r| r.line);

        if !report.holdings.is_empty() {
            self.dirty = true;
        }
        Ok(report)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(portfolio: Portfolio) -> Self {
        let analytics_service = AnalyticsService::with_policy(portfolio.settings.deposit_interest);
        let quote_service =
            QuoteService::new(QuoteCache::with_ttl_secs(portfolio.settings.quote_ttl_secs));

        Self {
            portfolio,
            portfolio_service: PortfolioService::new(),
            validation_service: ValidationService::new(),
            analytics_service,
            projection_service: ProjectionService::new(),
            quote_service,
            dirty: false,
        }
    }
}
