use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::holding::Holding;
use crate::models::quote::QuoteCache;
use crate::providers::traits::QuoteProvider;

/// Outcome of refreshing the market prices of a holding set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuoteRefreshReport {
    /// Holdings whose `current_price` was set
    pub updated: Vec<Uuid>,
    /// Holdings whose quote could not be resolved, with the reason
    pub failed: Vec<(Uuid, String)>,
}

/// Resolves current prices through a provider with a TTL cache in front.
///
/// Cache strategy: a quote younger than the TTL is served from the cache;
/// anything older (or missing) is fetched and re-cached.
pub struct QuoteService {
    cache: QuoteCache,
}

impl QuoteService {
    pub fn new(cache: QuoteCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &QuoteCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut QuoteCache {
        &mut self.cache
    }

    /// Current price of `symbol`, from the cache if fresh, otherwise from `provider`.
    pub async fn get_price(
        &mut self,
        provider: &dyn QuoteProvider,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Result<f64, CoreError> {
        if let Some(price) = self.cache.get(symbol, now) {
            debug!("Quote cache hit for {symbol}");
            return Ok(price);
        }

        debug!("Quote cache miss for {symbol}; asking {}", provider.name());
        let price = provider.get_current_price(symbol).await?;
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::Quote {
                provider: provider.name().to_string(),
                message: format!("invalid price {price} for {symbol}"),
            });
        }

        self.cache.put(symbol, price, now);
        Ok(price)
    }

    /// Set `current_price` on every listed holding (Equity/Reit/Fund) whose
    /// name resolves to a quote. Failures are collected, never fatal;
    /// the failed holding keeps its previous price.
    pub async fn refresh_holdings(
        &mut self,
        provider: &dyn QuoteProvider,
        holdings: &mut [Holding],
        now: DateTime<Utc>,
    ) -> QuoteRefreshReport {
        let mut report = QuoteRefreshReport::default();

        for holding in holdings.iter_mut().filter(|h| h.kind().is_listed()) {
            let symbol = holding.display_name().trim().to_string();
            if symbol.is_empty() {
                continue;
            }

            match self.get_price(provider, &symbol, now).await {
                Ok(price) => {
                    holding.set_current_price(price);
                    report.updated.push(holding.id);
                }
                Err(e) => {
                    warn!("Quote refresh failed for {symbol}: {e}");
                    report.failed.push((holding.id, e.to_string()));
                }
            }
        }

        report
    }
}

impl Default for QuoteService {
    fn default() -> Self {
        Self::new(QuoteCache::default())
    }
}
