use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A market price fetched for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedQuote {
    pub price: f64,
    pub fetched_at: DateTime<Utc>,
}

/// In-memory quote cache with a fixed time-to-live.
///
/// Lives outside the valuation core: callers resolve a price through it and
/// hand only the plain value to the engine. Every lookup takes an explicit
/// `now` so expiry is deterministic.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    ttl: Duration,
    entries: HashMap<String, CachedQuote>,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn with_ttl_secs(secs: i64) -> Self {
        Self::new(Duration::seconds(secs.max(0)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh price for `symbol`, or `None` if missing or expired.
    pub fn get(&self, symbol: &str, now: DateTime<Utc>) -> Option<f64> {
        let quote = self.entries.get(&symbol.trim().to_uppercase())?;
        if now - quote.fetched_at < self.ttl {
            Some(quote.price)
        } else {
            None
        }
    }

    /// Insert or replace the price for `symbol`.
    pub fn put(&mut self, symbol: &str, price: f64, now: DateTime<Utc>) {
        self.entries.insert(
            symbol.trim().to_uppercase(),
            CachedQuote {
                price,
                fetched_at: now,
            },
        );
    }

    /// Drop every expired entry. Returns the number removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, q| now - q.fetched_at < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::with_ttl_secs(300)
    }
}
