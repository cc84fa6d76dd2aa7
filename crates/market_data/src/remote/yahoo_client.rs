use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use common::AdvisorError;
use common::config::MarketConfig;
use common::models::PriceSeries;

use crate::remote::ChartResponse;
use crate::traits::MarketDataProvider;

#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
    range: String,
    interval: String,
}

impl YahooClient {
    pub fn new(config: &MarketConfig) -> Result<Self, AdvisorError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; nse-advisor-bot/0.1)")
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AdvisorError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            range: config.history_range.clone(),
            interval: config.history_interval.clone(),
        })
    }

    async fn request(&self, symbol: &str) -> Result<ChartResponse, AdvisorError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", self.range.as_str()),
                ("interval", self.interval.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AdvisorError::unavailable(symbol, e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Yahoo rate limit hit while fetching {}", symbol);
            return Err(AdvisorError::unavailable(symbol, "HTTP 429: Too Many Requests"));
        }

        // Unknown symbols come back as 404 with a chart error body.
        if !status.is_success() && status != StatusCode::NOT_FOUND {
            return Err(AdvisorError::unavailable(symbol, format!("HTTP {}", status)));
        }

        response
            .json::<ChartResponse>()
            .await
            .map_err(|e| AdvisorError::unavailable(symbol, format!("bad chart payload: {}", e)))
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_history(&self, symbol: &str) -> Result<PriceSeries, AdvisorError> {
        let series = self.request(symbol).await?.into_price_series(symbol)?;
        debug!("Fetched {} closes for {}", series.len(), symbol);
        Ok(series)
    }
}
