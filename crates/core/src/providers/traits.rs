use async_trait::async_trait;

use crate::errors::CoreError;

/// Source of current market prices for listed holdings.
///
/// The core ships no network implementation; the embedding application
/// plugs one in (or a fixed table for offline use).
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Latest price of `symbol`, in the currency the holding is quoted in.
    async fn get_current_price(&self, symbol: &str) -> Result<f64, CoreError>;
}
