use std::sync::Arc;

use futures_util::{StreamExt, stream};
use tracing::{debug, info, warn};

use common::AdvisorError;
use common::config::{AppConfig, PicksConfig};
use common::models::{Analysis, Holding, HoldingEvaluation, PriceSeries};
use market_data::{MarketDataProvider, normalize_symbol};
use strategy::{analyze, evaluate_portfolio_holdings, rank_candidates};

/// Runs the signal and ranking engines over freshly fetched prices.
pub struct AdvisorService {
    provider: Arc<dyn MarketDataProvider>,
    portfolio: Vec<Holding>,
    universe: Vec<String>,
    picks: PicksConfig,
    symbol_suffix: String,
    concurrency: usize,
}

impl AdvisorService {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        config: &AppConfig,
        portfolio: Vec<Holding>,
        universe: Vec<String>,
    ) -> Self {
        Self {
            provider,
            portfolio,
            universe,
            picks: config.picks,
            symbol_suffix: config.market.symbol_suffix.clone(),
            concurrency: config.market.fetch_concurrency.max(1),
        }
    }

    pub fn picks_config(&self) -> PicksConfig {
        self.picks
    }

    pub fn portfolio(&self) -> &[Holding] {
        &self.portfolio
    }

    pub fn universe_len(&self) -> usize {
        self.universe.len()
    }

    pub async fn analyze(&self, ticker: &str) -> Result<Analysis, AdvisorError> {
        let symbol = normalize_symbol(ticker, &self.symbol_suffix);
        let series = self.provider.fetch_history(&symbol).await?;
        Ok(analyze(&series))
    }

    /// Ranked picks from the ticker universe inside the configured price band.
    pub async fn monthly_picks(&self) -> Vec<Analysis> {
        let candidates: Vec<Analysis> = self
            .fetch_all(self.universe.clone())
            .await
            .into_iter()
            .filter_map(|series| series.map(|s| analyze(&s)))
            .collect();

        let total = candidates.len();
        let picks = rank_candidates(candidates, self.picks.min_price, self.picks.max_price);
        info!(
            "Ranked {} of {} tickers, kept {} picks",
            total,
            self.universe.len(),
            picks.len()
        );
        picks
    }

    /// Every holding with available data, with target and stop levels.
    pub async fn check_portfolio(&self) -> Vec<HoldingEvaluation> {
        let tickers = self.portfolio.iter().map(|h| h.ticker.clone()).collect();
        let fetched = self.fetch_all(tickers).await;

        let holdings = self
            .portfolio
            .iter()
            .cloned()
            .zip(fetched)
            .collect();

        let evaluations = evaluate_portfolio_holdings(holdings);
        info!(
            "Evaluated {} of {} holdings",
            evaluations.len(),
            self.portfolio.len()
        );
        evaluations
    }

    /// Fetches in input order with at most `concurrency` requests in flight.
    /// Unavailable instruments come back as `None`.
    async fn fetch_all(&self, tickers: Vec<String>) -> Vec<Option<PriceSeries>> {
        let provider = &self.provider;
        let suffix = self.symbol_suffix.as_str();

        stream::iter(tickers)
            .map(|ticker| async move {
                let symbol = normalize_symbol(&ticker, suffix);
                match provider.fetch_history(&symbol).await {
                    Ok(series) => Some(series),
                    Err(e) if e.is_unavailable() => {
                        debug!("Skipping {}: {}", symbol, e);
                        None
                    }
                    Err(e) => {
                        warn!("Skipping {} after unexpected error: {}", symbol, e);
                        None
                    }
                }
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use common::models::{PricePoint, SignalKind};
    use mockall::mock;

    mock! {
        Provider {}

        #[async_trait]
        impl MarketDataProvider for Provider {
            async fn fetch_history(&self, symbol: &str) -> Result<PriceSeries, AdvisorError>;
        }
    }

    fn config() -> AppConfig {
        AppConfig::from_lookup(|key| match key {
            "BOT_TOKEN" => Some("token".to_string()),
            "CHAT_ID" => Some("42".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn series(symbol: &str, closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + Duration::days(i as i64),
                close,
            })
            .collect();
        PriceSeries::new(symbol, points).unwrap()
    }

    fn holding(ticker: &str, shares: f64) -> Holding {
        Holding {
            ticker: ticker.to_string(),
            shares,
        }
    }

    fn service(provider: MockProvider, portfolio: Vec<Holding>, universe: &[&str]) -> AdvisorService {
        AdvisorService::new(
            Arc::new(provider),
            &config(),
            portfolio,
            universe.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_analyze_normalizes_ticker() {
        let mut provider = MockProvider::new();
        provider
            .expect_fetch_history()
            .withf(|symbol| symbol == "INFY.NS")
            .times(1)
            .returning(|symbol| Ok(series(symbol, &[100.0, 101.0])));

        let analysis = service(provider, vec![], &[]).analyze("infy").await.unwrap();

        assert_eq!(analysis.symbol, "INFY.NS");
        assert_eq!(analysis.last(), 101.0);
        assert_eq!(analysis.signal.kind, SignalKind::Hold);
    }

    #[tokio::test]
    async fn test_analyze_surfaces_unavailable() {
        let mut provider = MockProvider::new();
        provider
            .expect_fetch_history()
            .returning(|symbol| Err(AdvisorError::unavailable(symbol, "not found")));

        let err = service(provider, vec![], &[]).analyze("NOPE").await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_check_portfolio_skips_unavailable_holdings() {
        let mut provider = MockProvider::new();
        provider.expect_fetch_history().returning(|symbol| match symbol {
            "DELISTED.NS" => Err(AdvisorError::unavailable(symbol, "no data")),
            _ => Ok(series(symbol, &[100.0])),
        });

        let evaluations = service(
            provider,
            vec![holding("INFY", 4.0), holding("DELISTED", 1.0), holding("TCS.NS", 9.0)],
            &[],
        )
        .check_portfolio()
        .await;

        let tickers: Vec<&str> = evaluations.iter().map(|e| e.holding.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["INFY", "TCS.NS"]);
        assert_eq!(evaluations[1].holding.shares, 9.0);
        assert_eq!((evaluations[0].target, evaluations[0].stop), (110.0, 95.0));
    }

    #[tokio::test]
    async fn test_monthly_picks_filters_band_and_ranks() {
        let mut provider = MockProvider::new();
        provider.expect_fetch_history().returning(|symbol| match symbol {
            // 15 falling closes: rsi ~0, oversold BUY
            "FALLING.NS" => Ok(series(symbol, &(0..15).map(|i| 300.0 - i as f64).collect::<Vec<_>>())),
            "PENNY.NS" => Ok(series(symbol, &[12.0])),
            "GIANT.NS" => Ok(series(symbol, &[2500.0])),
            "MISSING.NS" => Err(AdvisorError::unavailable(symbol, "no data")),
            _ => Ok(series(symbol, &[150.0])),
        });

        let picks = service(
            provider,
            vec![],
            &["PENNY", "STEADY", "FALLING", "GIANT", "MISSING"],
        )
        .monthly_picks()
        .await;

        let symbols: Vec<&str> = picks.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["FALLING.NS", "STEADY.NS"]);
        assert_eq!(picks[0].signal.kind, SignalKind::Buy);
    }

    #[tokio::test]
    async fn test_monthly_picks_with_empty_universe() {
        let provider = MockProvider::new();
        assert!(service(provider, vec![], &[]).monthly_picks().await.is_empty());
    }
}
