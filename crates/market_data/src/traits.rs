use async_trait::async_trait;
use common::AdvisorError;
use common::models::PriceSeries;

/// Source of daily closing prices.
///
/// Anything that goes wrong for a single instrument surfaces as
/// `AdvisorError::DataUnavailable` so callers can skip it.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_history(&self, symbol: &str) -> Result<PriceSeries, AdvisorError>;
}
