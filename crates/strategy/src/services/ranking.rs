use common::models::{Analysis, Holding, HoldingEvaluation, PriceSeries, SignalKind};
use tracing::debug;

use crate::services::signal_engine::analyze;

pub const TOP_N: usize = 10;

// Ranking treats this as "cheap enough to be interesting", looser than OVERSOLD.
const RANK_RSI_CEILING: f64 = 40.0;

/// Inclusive price range a pick must trade in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: f64,
    pub max: f64,
}

impl PriceBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min && price <= self.max
    }
}

struct RankedCandidate {
    score: i32,
    analysis: Analysis,
}

pub fn score(analysis: &Analysis) -> i32 {
    let mut score = 0;
    if analysis.signal.kind == SignalKind::Buy {
        score += 2;
    }
    if analysis.snapshot.rsi.is_some_and(|rsi| rsi < RANK_RSI_CEILING) {
        score += 1;
    }
    if analysis.snapshot.has_golden_trend() {
        score += 1;
    }
    score
}

/// Best `TOP_N` candidates priced inside `[min_price, max_price]`: highest
/// score first, cheaper first on equal scores.
pub fn rank_candidates(candidates: Vec<Analysis>, min_price: f64, max_price: f64) -> Vec<Analysis> {
    let band = PriceBand::new(min_price, max_price);

    let mut ranked: Vec<RankedCandidate> = candidates
        .into_iter()
        .filter(|analysis| band.contains(analysis.last()))
        .map(|analysis| RankedCandidate {
            score: score(&analysis),
            analysis,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.analysis.last().total_cmp(&b.analysis.last()))
    });

    debug!("Ranked {} candidates inside {:?}", ranked.len(), band);

    ranked
        .into_iter()
        .take(TOP_N)
        .map(|ranked| ranked.analysis)
        .collect()
}

/// Target and stop prices for a position, rounded to paise.
pub fn price_levels(last: f64, kind: SignalKind) -> (f64, f64) {
    let (target, stop) = match kind {
        SignalKind::Buy => (1.25, 0.90),
        SignalKind::Sell => (1.05, 0.97),
        SignalKind::Hold => (1.10, 0.95),
    };
    (round2(last * target), round2(last * stop))
}

pub fn evaluate_holding(holding: Holding, analysis: Analysis) -> HoldingEvaluation {
    let (target, stop) = price_levels(analysis.last(), analysis.signal.kind);
    HoldingEvaluation {
        holding,
        analysis,
        target,
        stop,
    }
}

/// Holdings without price data are dropped, the rest keep their order.
pub fn evaluate_portfolio_holdings(
    holdings: Vec<(Holding, Option<PriceSeries>)>,
) -> Vec<HoldingEvaluation> {
    holdings
        .into_iter()
        .filter_map(|(holding, series)| match series {
            Some(series) => Some(evaluate_holding(holding, analyze(&series))),
            None => {
                debug!("No price data for {}, skipping", holding.ticker);
                None
            }
        })
        .collect()
}

/// Exact halves go to the even cent.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use common::models::{IndicatorSnapshot, PricePoint, Signal};

    fn candidate(symbol: &str, last: f64, kind: SignalKind, rsi: Option<f64>) -> Analysis {
        Analysis {
            symbol: symbol.to_string(),
            snapshot: IndicatorSnapshot {
                last,
                sma50: None,
                sma200: None,
                rsi,
            },
            signal: Signal {
                kind,
                reasons: vec![],
            },
        }
    }

    fn holding(ticker: &str, shares: f64) -> Holding {
        Holding {
            ticker: ticker.to_string(),
            shares,
        }
    }

    fn flat_series(symbol: &str, close: f64) -> PriceSeries {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        PriceSeries::new(symbol, vec![PricePoint { date, close }]).unwrap()
    }

    fn symbols(picks: &[Analysis]) -> Vec<&str> {
        picks.iter().map(|p| p.symbol.as_str()).collect()
    }

    #[test]
    fn test_score_components() {
        let mut golden = candidate("A", 200.0, SignalKind::Buy, Some(35.0));
        golden.snapshot.sma50 = Some(190.0);
        golden.snapshot.sma200 = Some(180.0);
        assert_eq!(score(&golden), 4);

        assert_eq!(score(&candidate("B", 200.0, SignalKind::Hold, None)), 0);
        assert_eq!(score(&candidate("C", 200.0, SignalKind::Sell, Some(39.9))), 1);
        assert_eq!(score(&candidate("D", 200.0, SignalKind::Hold, Some(40.0))), 0);
    }

    #[test]
    fn test_empty_candidates_yield_empty_picks() {
        assert!(rank_candidates(vec![], 100.0, 500.0).is_empty());
    }

    #[test]
    fn test_band_is_inclusive() {
        let picks = rank_candidates(
            vec![
                candidate("LOW", 99.99, SignalKind::Buy, None),
                candidate("MIN", 100.0, SignalKind::Hold, None),
                candidate("MAX", 500.0, SignalKind::Hold, None),
                candidate("HIGH", 500.01, SignalKind::Buy, None),
            ],
            100.0,
            500.0,
        );
        assert_eq!(symbols(&picks), vec!["MIN", "MAX"]);
    }

    #[test]
    fn test_orders_by_score_then_cheapest() {
        let picks = rank_candidates(
            vec![
                candidate("HOLD_CHEAP", 110.0, SignalKind::Hold, None),
                candidate("BUY_PRICEY", 450.0, SignalKind::Buy, None),
                candidate("BUY_CHEAP", 150.0, SignalKind::Buy, None),
                candidate("SELL_LOW_RSI", 300.0, SignalKind::Sell, Some(35.0)),
            ],
            100.0,
            500.0,
        );
        assert_eq!(
            symbols(&picks),
            vec!["BUY_CHEAP", "BUY_PRICEY", "SELL_LOW_RSI", "HOLD_CHEAP"]
        );
    }

    #[test]
    fn test_never_more_than_top_n() {
        let candidates = (0..25)
            .map(|i| candidate(&format!("S{}", i), 100.0 + i as f64, SignalKind::Hold, None))
            .collect();
        let picks = rank_candidates(candidates, 100.0, 500.0);

        assert_eq!(picks.len(), TOP_N);
        assert!(picks.iter().all(|p| (100.0..=500.0).contains(&p.last())));
        assert_eq!(picks[0].symbol, "S0");
    }

    #[test]
    fn test_price_levels_per_signal() {
        assert_eq!(price_levels(100.0, SignalKind::Buy), (125.0, 90.0));
        assert_eq!(price_levels(100.0, SignalKind::Sell), (105.0, 97.0));
        assert_eq!(price_levels(100.0, SignalKind::Hold), (110.0, 95.0));
        assert_eq!(price_levels(123.456, SignalKind::Hold), (135.8, 117.28));
    }

    #[test]
    fn test_price_levels_round_half_cent_to_even() {
        assert_eq!(price_levels(100.5, SignalKind::Buy), (125.62, 90.45));
        assert_eq!(price_levels(0.5, SignalKind::Buy), (0.62, 0.45));
        assert_eq!(price_levels(101.5, SignalKind::Buy), (126.88, 91.35));
    }

    #[test]
    fn test_holdings_without_data_are_omitted() {
        let evaluations = evaluate_portfolio_holdings(vec![
            (holding("INFY", 10.0), Some(flat_series("INFY.NS", 100.0))),
            (holding("GONE", 5.0), None),
            (holding("TCS", 2.0), Some(flat_series("TCS.NS", 200.0))),
        ]);

        assert_eq!(evaluations.len(), 2);
        assert_eq!(evaluations[0].holding.ticker, "INFY");
        assert_eq!(evaluations[0].holding.shares, 10.0);
        // one point: no indicators, so HOLD levels
        assert_eq!((evaluations[0].target, evaluations[0].stop), (110.0, 95.0));
        assert_eq!(evaluations[1].analysis.symbol, "TCS.NS");
    }

    #[test]
    fn test_evaluate_buy_holding() {
        let evaluation = evaluate_holding(
            holding("HDFCBANK", 3.0),
            candidate("HDFCBANK.NS", 100.0, SignalKind::Buy, None),
        );
        assert_eq!(evaluation.target, 125.0);
        assert_eq!(evaluation.stop, 90.0);
    }
}
