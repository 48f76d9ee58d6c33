// ═══════════════════════════════════════════════════════════════════
// Integration Tests — WealthPlanner facade end to end
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::HashMap;

use wealth_planner_core::errors::{CoreError, FieldError};
use wealth_planner_core::models::goal::GoalParameters;
use wealth_planner_core::models::holding::{Holding, HoldingKind, Position, RiskTag};
use wealth_planner_core::models::portfolio::Portfolio;
use wealth_planner_core::models::projection::{Projection, ProjectionStrategy};
use wealth_planner_core::models::rates::RateTable;
use wealth_planner_core::models::settings::{DepositInterestPolicy, Settings};
use wealth_planner_core::providers::traits::QuoteProvider;
use wealth_planner_core::services::analytics_service::HoldingSortOrder;
use wealth_planner_core::storage::csv_format::COLUMNS;
use wealth_planner_core::WealthPlanner;

fn approx(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() < tol
}

struct FixedProvider {
    prices: HashMap<String, f64>,
}

impl FixedProvider {
    fn new(prices: &[(&str, f64)]) -> Self {
        Self {
            prices: prices.iter().map(|(s, p)| (s.to_string(), *p)).collect(),
        }
    }
}

#[async_trait]
impl QuoteProvider for FixedProvider {
    fn name(&self) -> &str {
        "Fixed"
    }

    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| CoreError::QuoteNotAvailable(symbol.to_string()))
    }
}

fn retirement_goal() -> GoalParameters {
    GoalParameters {
        current_age: 30,
        retirement_age: 65,
        target_amount: 50_000_000.0,
        monthly_contribution: 100_000.0,
        monthly_living_cost: 250_000.0,
    }
}

/// 5M JPY of assets and 600k JPY of yearly income.
fn planner_with_holdings() -> WealthPlanner {
    let mut planner = WealthPlanner::create_new();
    planner
        .add_holding(Holding::deposit("MUFG", 4_000_000.0).with_risk(RiskTag::Low))
        .unwrap();
    planner
        .add_holding(Holding::equity("7203", 400.0, 2_500.0).with_risk(RiskTag::High))
        .unwrap();
    planner
        .add_holding(Holding::pension("National", 50_000.0))
        .unwrap();
    planner
}

// ═══════════════════════════════════════════════════════════════════
//  Lifecycle
// ═══════════════════════════════════════════════════════════════════

mod lifecycle {
    use super::*;

    #[test]
    fn new_planner_is_empty_and_clean() {
        let planner = WealthPlanner::create_new();
        assert_eq!(planner.holding_count(), 0);
        assert!(!planner.has_unsaved_changes());
        assert!(planner.goal().is_none());
        assert_eq!(planner.rate_table().base_currency(), "JPY");
        assert_eq!(planner.get_settings(), &Settings::default());
    }

    #[test]
    fn mutations_mark_dirty_and_export_clears() {
        let mut planner = WealthPlanner::create_new();
        planner.add_holding(Holding::deposit("MUFG", 100.0)).unwrap();
        assert!(planner.has_unsaved_changes());

        planner.to_json().unwrap();
        assert!(!planner.has_unsaved_changes());

        planner.set_rate("USD", 150.0).unwrap();
        assert!(planner.has_unsaved_changes());
    }

    #[test]
    fn rejected_mutation_does_not_mark_dirty() {
        let mut planner = WealthPlanner::create_new();
        assert!(planner.add_holding(Holding::deposit("", 0.0)).is_err());
        assert!(planner.set_rate("USD", 0.0).is_err());
        assert!(!planner.has_unsaved_changes());
    }

    #[test]
    fn clearing_missing_goal_is_not_a_change() {
        let mut planner = WealthPlanner::create_new();
        planner.clear_goal();
        assert!(!planner.has_unsaved_changes());
    }

    #[test]
    fn json_round_trip() {
        let mut planner = planner_with_holdings();
        planner.set_goal(retirement_goal()).unwrap();
        planner.set_rate("USD", 150.0).unwrap();
        let json = planner.to_json().unwrap();

        let restored = WealthPlanner::from_json(&json).unwrap();
        assert_eq!(restored.portfolio(), planner.portfolio());
        assert!(!restored.has_unsaved_changes());
    }

    #[test]
    fn from_json_rejects_invalid_rate_table() {
        let json = r#"{"holdings": [], "rate_table": {"base_currency": "JPY", "rates": {"USD": -1}}}"#;
        assert!(matches!(
            WealthPlanner::from_json(json),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn from_json_rejects_out_of_range_settings() {
        let json = r#"{"holdings": [], "settings": {"growth_rate": -5.0, "projection_years": 4000000000}}"#;
        assert!(matches!(
            WealthPlanner::from_json(json),
            Err(CoreError::Deserialization(_))
        ));
    }

    #[test]
    fn from_json_rejects_invalid_holding() {
        let json = r#"{"holdings": [{
            "id": "8c1f4a8e-55b2-4f57-9f2f-6d1b8f1f2a10",
            "kind": "Deposit",
            "bank_name": "",
            "amount": -100
        }]}"#;
        match WealthPlanner::from_json(json) {
            Err(CoreError::Validation(errors)) => {
                assert_eq!(errors.get("bank_name"), Some(FieldError::Required));
                assert_eq!(errors.get("amount"), Some(FieldError::Negative));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn from_json_rejects_duplicate_ids() {
        let mut planner = WealthPlanner::create_new();
        planner.add_holding(Holding::deposit("MUFG", 100.0)).unwrap();
        let mut snapshot: serde_json::Value =
            serde_json::from_str(&planner.to_json().unwrap()).unwrap();
        let holdings = snapshot["holdings"].as_array_mut().unwrap();
        let mut twin = holdings[0].clone();
        twin["bank_name"] = "SMBC".into();
        holdings.push(twin);

        assert!(matches!(
            WealthPlanner::from_json(&snapshot.to_string()),
            Err(CoreError::DuplicateHolding(_))
        ));
    }

    #[test]
    fn from_portfolio_rejects_invalid_goal() {
        let portfolio = Portfolio {
            goal: Some(GoalParameters {
                current_age: 70,
                retirement_age: 65,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(matches!(
            WealthPlanner::from_portfolio(portfolio),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn from_portfolio_rejects_out_of_range_settings() {
        let portfolio = Portfolio {
            settings: Settings {
                projection_years: 4_000_000_000,
                ..Settings::default()
            },
            ..Default::default()
        };
        match WealthPlanner::from_portfolio(portfolio) {
            Err(CoreError::Validation(errors)) => {
                assert_eq!(errors.get("projection_years"), Some(FieldError::OutOfRange));
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn from_portfolio_normalizes_holdings() {
        let mut holding = Holding::equity("AAPL", 10.0, 150.0);
        holding.currency = Some(" usd ".into());
        let id = holding.id;
        let portfolio = Portfolio {
            holdings: vec![holding],
            ..Default::default()
        };

        let planner = WealthPlanner::from_portfolio(portfolio).unwrap();
        assert_eq!(planner.get_holding(id).unwrap().currency.as_deref(), Some("USD"));
        assert!(!planner.has_unsaved_changes());
    }

    #[test]
    fn debug_output_is_compact() {
        let planner = planner_with_holdings();
        let debug = format!("{planner:?}");
        assert!(debug.contains("WealthPlanner"));
        assert!(debug.contains("holdings: 3"));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Holdings
// ═══════════════════════════════════════════════════════════════════

mod holdings {
    use super::*;

    #[test]
    fn add_get_update_remove() {
        let mut planner = WealthPlanner::create_new();
        let id = planner.add_holding(Holding::deposit("MUFG", 100.0)).unwrap();
        assert_eq!(planner.get_holding(id).unwrap().display_name(), "MUFG");

        planner
            .update_holding(id, Holding::deposit("MUFG", 250.0))
            .unwrap();
        assert_eq!(planner.get_summary().total_assets, 250.0);

        let removed = planner.remove_holding(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(planner.get_holding(id).is_none());
    }

    #[test]
    fn validate_holding_reports_duplicates() {
        let mut planner = WealthPlanner::create_new();
        planner.add_holding(Holding::equity("AAPL", 1.0, 1.0)).unwrap();
        let errors = planner.validate_holding(&Holding::equity("AAPL", 2.0, 2.0));
        assert_eq!(errors.get("name"), Some(FieldError::Duplicate));
        assert_eq!(planner.holding_count(), 1);
    }

    #[test]
    fn kind_cannot_change_through_facade() {
        let mut planner = WealthPlanner::create_new();
        let id = planner.add_holding(Holding::deposit("MUFG", 100.0)).unwrap();
        assert!(matches!(
            planner.update_holding(id, Holding::equity("AAPL", 1.0, 1.0)),
            Err(CoreError::KindChanged { .. })
        ));
    }

    #[test]
    fn filter_by_kind() {
        let planner = planner_with_holdings();
        assert_eq!(planner.get_holdings_of_kind(HoldingKind::Deposit).len(), 1);
        assert!(planner.get_holdings_of_kind(HoldingKind::Bond).is_empty());
        assert_eq!(planner.get_holdings().len(), 3);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Analytics
// ═══════════════════════════════════════════════════════════════════

mod analytics {
    use super::*;

    #[test]
    fn summary_excludes_pension_from_assets() {
        let planner = planner_with_holdings();
        let summary = planner.get_summary();
        assert_eq!(summary.total_assets, 5_000_000.0);
        assert_eq!(summary.annual_income, 600_000.0);
        assert_eq!(summary.monthly_income, 50_000.0);
        assert!(approx(summary.class_percent(HoldingKind::Deposit), 80.0, 1e-9));
        assert!(approx(summary.risk_percent(RiskTag::High), 20.0, 1e-9));
    }

    #[test]
    fn foreign_holdings_use_rate_table() {
        let mut planner = WealthPlanner::create_new();
        planner.add_holding(Holding::equity("AAPL", 10.0, 100.0).with_currency("usd")).unwrap();
        assert_eq!(planner.get_summary().total_assets, 1_000.0);

        planner.set_rate("USD", 150.0).unwrap();
        assert_eq!(planner.get_summary().total_assets, 150_000.0);

        let table = RateTable::new("USD").unwrap();
        planner.set_rate_table(table);
        assert_eq!(planner.get_summary().currency, "USD");
        assert_eq!(planner.get_summary().total_assets, 1_000.0);
    }

    #[test]
    fn deposit_policy_follows_settings() {
        let mut planner = WealthPlanner::create_new();
        let mut deposit = Holding::deposit("MUFG", 1_000_000.0);
        if let Position::Deposit(p) = &mut deposit.position {
            p.interest_rate_percent = Some(1.0);
        }
        planner.add_holding(deposit).unwrap();
        assert!(approx(planner.get_summary().annual_income, 10_000.0, 1e-6));

        planner.set_settings(Settings {
            deposit_interest: DepositInterestPolicy::Ignore,
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(planner.get_summary().annual_income, 0.0);
    }

    #[test]
    fn figures_sorted_on_request() {
        let planner = planner_with_holdings();
        let names: Vec<String> = planner
            .get_holding_figures(HoldingSortOrder::NameAsc)
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["7203", "MUFG", "National"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Projections
// ═══════════════════════════════════════════════════════════════════

mod projections {
    use super::*;

    #[test]
    fn growth_does_not_need_goal() {
        let planner = planner_with_holdings();
        let series = planner.growth_series();
        assert_eq!(series.len(), 31);
        assert_eq!(series[0].asset_value, 5_000_000.0);
        assert!(approx(series[1].asset_value, 5_150_000.0, 1e-6));
    }

    #[test]
    fn goal_based_models_need_goal() {
        let planner = planner_with_holdings();
        assert!(matches!(planner.cashflow_series(), Err(CoreError::GoalNotSet)));
        assert!(matches!(planner.goal_projection(), Err(CoreError::GoalNotSet)));
        assert!(matches!(planner.project(), Err(CoreError::GoalNotSet)));
    }

    #[test]
    fn invalid_goal_is_rejected() {
        let mut planner = WealthPlanner::create_new();
        let goal = GoalParameters {
            current_age: 70,
            retirement_age: 65,
            ..Default::default()
        };
        assert!(matches!(planner.set_goal(goal), Err(CoreError::Validation(_))));
        assert!(planner.goal().is_none());
    }

    #[test]
    fn cashflow_coverage_from_summary() {
        let mut planner = planner_with_holdings();
        planner.set_goal(retirement_goal()).unwrap();
        let series = planner.cashflow_series().unwrap();
        assert_eq!(series.len(), 31);
        assert!(approx(series[0].coverage_percent, 20.0, 1e-9));
        assert_eq!(series[0].asset_balance, 5_000_000.0);
    }

    #[test]
    fn goal_projection_from_summary() {
        let mut planner = planner_with_holdings();
        planner.set_goal(retirement_goal()).unwrap();
        let g = planner.goal_projection().unwrap();
        assert_eq!(g.total_contributions, 42_000_000.0);
        assert_eq!(g.projected_amount, 47_000_000.0);
        assert_eq!(g.shortfall, 3_000_000.0);
        assert!(approx(g.achievement_percent, 94.0, 1e-9));
    }

    #[test]
    fn project_uses_configured_strategy() {
        let mut planner = planner_with_holdings();
        planner.set_goal(retirement_goal()).unwrap();
        assert!(matches!(planner.project().unwrap(), Projection::Cashflow(_)));

        planner.set_settings(Settings {
            projection_strategy: ProjectionStrategy::LinearGoal,
            ..Settings::default()
        })
        .unwrap();
        assert!(matches!(planner.project().unwrap(), Projection::Goal(_)));
    }

    #[test]
    fn project_with_each_strategy() {
        let mut planner = planner_with_holdings();
        planner.set_goal(retirement_goal()).unwrap();
        match planner.project_with(ProjectionStrategy::CompoundingGrowth).unwrap() {
            Projection::Growth(series) => assert_eq!(series.len(), 31),
            other => panic!("unexpected projection {other:?}"),
        }
        assert!(matches!(
            planner.project_with(ProjectionStrategy::CashflowCoverage).unwrap(),
            Projection::Cashflow(_)
        ));
        assert!(matches!(
            planner.project_with(ProjectionStrategy::LinearGoal).unwrap(),
            Projection::Goal(_)
        ));
    }

    #[test]
    fn set_settings_rejects_out_of_range_values() {
        let mut planner = planner_with_holdings();
        planner.to_json().unwrap();

        let result = planner.set_settings(Settings {
            growth_rate: -2.0,
            projection_years: 3,
            ..Settings::default()
        });
        match result {
            Err(CoreError::Validation(errors)) => {
                assert_eq!(errors.get("growth_rate"), Some(FieldError::OutOfRange));
            }
            other => panic!("unexpected result {other:?}"),
        }
        assert!(planner
            .set_settings(Settings {
                projection_years: 101,
                ..Settings::default()
            })
            .is_err());

        assert_eq!(planner.get_settings(), &Settings::default());
        assert!(!planner.has_unsaved_changes());
    }

    #[test]
    fn total_loss_rate_never_flips_sign() {
        let mut planner = WealthPlanner::create_new();
        planner.add_holding(Holding::deposit("MUFG", 1_000.0)).unwrap();
        planner.set_settings(Settings {
            growth_rate: -1.0,
            projection_years: 3,
            ..Settings::default()
        })
        .unwrap();

        let values: Vec<f64> = planner.growth_series().iter().map(|p| p.asset_value).collect();
        assert_eq!(values, vec![1_000.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn horizon_follows_settings() {
        let mut planner = planner_with_holdings();
        planner.set_settings(Settings {
            projection_years: 5,
            growth_rate: 0.0,
            ..Settings::default()
        })
        .unwrap();
        let series = planner.growth_series();
        assert_eq!(series.len(), 6);
        assert!(series.iter().all(|p| p.asset_value == 5_000_000.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Quotes
// ═══════════════════════════════════════════════════════════════════

mod quotes {
    use super::*;

    #[tokio::test]
    async fn refresh_updates_prices_and_summary() {
        let mut planner = planner_with_holdings();
        planner.to_json().unwrap();

        let provider = FixedProvider::new(&[("7203", 3_000.0)]);
        let report = planner.refresh_quotes(&provider).await;

        assert_eq!(report.updated.len(), 1);
        assert!(report.failed.is_empty());
        assert!(planner.has_unsaved_changes());
        assert_eq!(planner.get_summary().total_assets, 5_200_000.0);
        assert_eq!(planner.cached_quote_count(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_changes_nothing() {
        let mut planner = planner_with_holdings();
        planner.to_json().unwrap();

        let report = planner.refresh_quotes(&FixedProvider::new(&[])).await;

        assert!(report.updated.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(!planner.has_unsaved_changes());
        assert_eq!(planner.get_summary().total_assets, 5_000_000.0);
    }

    #[tokio::test]
    async fn ttl_change_resets_cache() {
        let mut planner = planner_with_holdings();
        planner
            .refresh_quotes(&FixedProvider::new(&[("7203", 3_000.0)]))
            .await;
        assert_eq!(planner.cached_quote_count(), 1);

        planner.set_settings(Settings {
            growth_rate: 0.05,
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(planner.cached_quote_count(), 1);

        planner.set_settings(Settings {
            quote_ttl_secs: 10,
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(planner.cached_quote_count(), 0);
    }

    #[tokio::test]
    async fn clear_quote_cache() {
        let mut planner = planner_with_holdings();
        planner
            .refresh_quotes(&FixedProvider::new(&[("7203", 3_000.0)]))
            .await;
        planner.clear_quote_cache();
        assert_eq!(planner.cached_quote_count(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  CSV
// ═══════════════════════════════════════════════════════════════════

mod csv_exchange {
    use super::*;

    fn line(cells: &[(&str, &str)]) -> String {
        let mut row = vec![""; COLUMNS.len()];
        for (column, value) in cells {
            let idx = COLUMNS.iter().position(|c| c == column).unwrap();
            row[idx] = value;
        }
        row.join(",")
    }

    #[test]
    fn export_then_import_into_new_planner() {
        let source = planner_with_holdings();
        let csv = source.export_csv().unwrap();

        let mut target = WealthPlanner::create_new();
        let report = target.import_csv(&csv).unwrap();

        assert_eq!(report.holdings.len(), 3);
        assert!(report.skipped.is_empty());
        assert_eq!(target.holding_count(), 3);
        assert_eq!(target.get_summary().total_assets, source.get_summary().total_assets);
        assert!(target.has_unsaved_changes());
    }

    #[test]
    fn import_skips_rows_failing_validation() {
        let csv = [
            COLUMNS.join(","),
            line(&[("assetType", "Deposit"), ("name", "MUFG"), ("amount", "1000")]),
            line(&[("assetType", "Deposit"), ("name", "SMBC"), ("amount", "0")]),
            line(&[("assetType", "Equity"), ("name", "AAPL"), ("quantityOrUnits", "1"), ("acquisitionOrFacePrice", "150")]),
            line(&[("assetType", "Crypto"), ("name", "BTC")]),
            line(&[("assetType", "Equity"), ("name", "aapl"), ("quantityOrUnits", "2"), ("acquisitionOrFacePrice", "160")]),
        ]
        .join("\n");

        let mut planner = WealthPlanner::create_new();
        let report = planner.import_csv(&csv).unwrap();

        assert_eq!(report.holdings.len(), 2);
        assert_eq!(planner.holding_count(), 2);
        let lines: Vec<u64> = report.skipped.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 5, 6]);
        assert!(report.skipped[0].message.contains("amount"));
        assert!(report.skipped[2].message.contains("already in use"));
    }

    #[test]
    fn wrong_header_imports_nothing() {
        let mut planner = WealthPlanner::create_new();
        assert!(matches!(planner.import_csv("a,b\n1,2\n"), Err(CoreError::Csv(_))));
        assert_eq!(planner.holding_count(), 0);
        assert!(!planner.has_unsaved_changes());
    }
}
