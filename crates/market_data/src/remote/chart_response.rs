use chrono::DateTime;
use serde::Deserialize;

use common::AdvisorError;
use common::models::{PricePoint, PriceSeries};

/// Body of `GET /v8/finance/chart/{symbol}`.
#[derive(Deserialize, Debug)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Deserialize, Debug)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct ChartResult {
    // absent when the range holds no trading days
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResponse {
    pub fn into_price_series(self, symbol: &str) -> Result<PriceSeries, AdvisorError> {
        if let Some(error) = self.chart.error {
            return Err(AdvisorError::unavailable(
                symbol,
                format!("{}: {}", error.code, error.description),
            ));
        }

        let result = self
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| AdvisorError::unavailable(symbol, "empty chart result"))?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|quote| quote.close)
            .unwrap_or_default();

        // Yahoo pads halted sessions with nulls
        let points = result
            .timestamp
            .iter()
            .zip(closes)
            .filter_map(|(&ts, close)| {
                let date = DateTime::from_timestamp(ts, 0)?.date_naive();
                Some(PricePoint {
                    date,
                    close: close?,
                })
            })
            .collect();

        PriceSeries::new(symbol, points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<PriceSeries, AdvisorError> {
        serde_json::from_str::<ChartResponse>(json)
            .unwrap()
            .into_price_series("INFY.NS")
    }

    #[test]
    fn test_parses_closes_and_skips_nulls() {
        let series = parse(
            r#"{"chart":{"result":[{
                "meta":{"currency":"INR","symbol":"INFY.NS"},
                "timestamp":[1735786800,1735873200,1735959600],
                "indicators":{"quote":[{"open":[1,2,3],"close":[1890.5,null,1902.25]}]}
            }],"error":null}}"#,
        )
        .unwrap();

        assert_eq!(series.symbol(), "INFY.NS");
        assert_eq!(series.closes(), vec![1890.5, 1902.25]);
        assert_eq!(series.last().date.to_string(), "2025-01-04");
    }

    #[test]
    fn test_chart_error_is_unavailable() {
        let err = parse(
            r#"{"chart":{"result":null,"error":{
                "code":"Not Found",
                "description":"No data found, symbol may be delisted"
            }}}"#,
        )
        .unwrap_err();

        assert!(err.is_unavailable());
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_result_without_timestamps_is_unavailable() {
        let err = parse(
            r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#,
        )
        .unwrap_err();
        assert!(err.is_unavailable());
    }
}
