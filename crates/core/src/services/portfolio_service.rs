use log::debug;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::{Holding, Position};
use crate::models::portfolio::Portfolio;
use crate::services::validation_service::ValidationService;

/// Manages the holding list of a portfolio snapshot: add, update, remove.
///
/// Every mutation is gated by the validator; nothing is committed when any
/// field is invalid.
pub struct PortfolioService {
    validation_service: ValidationService,
}

impl PortfolioService {
    pub fn new() -> Self {
        Self {
            validation_service: ValidationService::new(),
        }
    }

    /// Add a new holding to the portfolio.
    /// Validates the holding (including duplicate listings) before adding.
    pub fn add_holding(&self, portfolio: &mut Portfolio, holding: Holding) -> Result<Uuid, CoreError> {
        if portfolio.holdings.iter().any(|h| h.id == holding.id) {
            return Err(CoreError::DuplicateHolding(holding.id.to_string()));
        }

        self.validation_service
            .validate_against(&holding, &portfolio.holdings)
            .into_result()?;

        let id = holding.id;
        debug!("Adding {} holding {}", holding.kind(), id);
        portfolio.holdings.push(normalized(holding));
        Ok(id)
    }

    /// Replace an existing holding by id.
    ///
    /// The kind is immutable: an update carrying a different kind is rejected.
    /// The stored id is kept even if `updated.id` differs.
    pub fn update_holding(
        &self,
        portfolio: &mut Portfolio,
        holding_id: Uuid,
        mut updated: Holding,
    ) -> Result<(), CoreError> {
        let idx = Self::position_of(portfolio, holding_id)?;

        let existing_kind = portfolio.holdings[idx].kind();
        if updated.kind() != existing_kind {
            return Err(CoreError::KindChanged {
                expected: existing_kind.to_string(),
                found: updated.kind().to_string(),
            });
        }

        updated.id = holding_id;
        self.validation_service
            .validate_against(&updated, &portfolio.holdings)
            .into_result()?;

        debug!("Updating {} holding {}", existing_kind, holding_id);
        portfolio.holdings[idx] = normalized(updated);
        Ok(())
    }

    /// Remove a holding by id and return it.
    pub fn remove_holding(&self, portfolio: &mut Portfolio, holding_id: Uuid) -> Result<Holding, CoreError> {
        let idx = Self::position_of(portfolio, holding_id)?;
        let removed = portfolio.holdings.remove(idx);
        debug!("Removed {} holding {}", removed.kind(), holding_id);
        Ok(removed)
    }

    pub fn get_holding<'a>(&self, portfolio: &'a Portfolio, holding_id: Uuid) -> Option<&'a Holding> {
        portfolio.holdings.iter().find(|h| h.id == holding_id)
    }

    fn position_of(portfolio: &Portfolio, holding_id: Uuid) -> Result<usize, CoreError> {
        portfolio
            .holdings
            .iter()
            .position(|h| h.id == holding_id)
            .ok_or_else(|| CoreError::HoldingNotFound(holding_id.to_string()))
    }
}

impl Default for PortfolioService {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper-case the currency code; blank codes mean the base currency.
/// Blank optional text (bond rating, insurer) is stored as `None`.
fn normalized(mut holding: Holding) -> Holding {
    holding.currency = holding
        .currency
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty());
    match &mut holding.position {
        Position::Bond(p) => p.rating = non_blank(p.rating.take()),
        Position::Insurance(p) => p.company = non_blank(p.company.take()),
        _ => {}
    }
    holding
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
