use common::models::{Analysis, IndicatorSnapshot, PriceSeries, Signal, SignalKind};
use ta::Next;
use ta::indicators::SimpleMovingAverage;

pub const FAST_MA: usize = 50;
pub const SLOW_MA: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const OVERBOUGHT: f64 = 75.0;
pub const OVERSOLD: f64 = 30.0;

// Keeps the ratio finite on series with no down days.
const RSI_EPSILON: f64 = 1e-9;

/// Mean of the last `window` closes, `None` with fewer points.
pub fn sma(closes: &[f64], window: usize) -> Option<f64> {
    if window == 0 || closes.len() < window {
        return None;
    }
    let mut indicator = SimpleMovingAverage::new(window).ok()?;
    closes[closes.len() - window..]
        .iter()
        .fold(None, |_, &close| Some(indicator.next(close)))
}

/// Cutler's RSI: plain means of gains and losses over the last `period` deltas.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }
    let (gains, losses) = closes[closes.len() - period - 1..]
        .windows(2)
        .map(|pair| pair[1] - pair[0])
        .fold((0.0, 0.0), |(gains, losses), delta| {
            if delta > 0.0 {
                (gains + delta, losses)
            } else {
                (gains, losses - delta)
            }
        });

    let n = period as f64;
    let rs = (gains / n) / (losses / n + RSI_EPSILON);
    Some(100.0 - 100.0 / (1.0 + rs))
}

pub fn compute_indicators(series: &PriceSeries) -> IndicatorSnapshot {
    let closes = series.closes();
    IndicatorSnapshot {
        last: series.last().close,
        sma50: sma(&closes, FAST_MA),
        sma200: sma(&closes, SLOW_MA),
        rsi: rsi(&closes, RSI_PERIOD),
    }
}

struct Rule {
    applies: fn(&IndicatorSnapshot, SignalKind) -> bool,
    verdict: SignalKind,
    reason: &'static str,
}

fn trend_confirmed(s: &IndicatorSnapshot, _: SignalKind) -> bool {
    s.has_golden_trend() && s.sma50.is_some_and(|fast| s.last > fast)
}

fn below_fast_ma(s: &IndicatorSnapshot, _: SignalKind) -> bool {
    s.sma50.is_some_and(|fast| s.last < fast)
}

fn overbought(s: &IndicatorSnapshot, _: SignalKind) -> bool {
    s.rsi.is_some_and(|rsi| rsi > OVERBOUGHT)
}

fn oversold_unless_buy(s: &IndicatorSnapshot, current: SignalKind) -> bool {
    current != SignalKind::Buy && s.rsi.is_some_and(|rsi| rsi < OVERSOLD)
}

/// Evaluated top to bottom. The signal is last-write-wins, reasons only
/// accumulate, so reordering these rows changes results.
const RULES: [Rule; 4] = [
    Rule {
        applies: trend_confirmed,
        verdict: SignalKind::Buy,
        reason: "fast MA above slow MA and price above fast MA",
    },
    Rule {
        applies: below_fast_ma,
        verdict: SignalKind::Sell,
        reason: "price below fast MA",
    },
    Rule {
        applies: overbought,
        verdict: SignalKind::Sell,
        reason: "overbought (rsi>75)",
    },
    Rule {
        applies: oversold_unless_buy,
        verdict: SignalKind::Buy,
        reason: "oversold (rsi<30)",
    },
];

pub fn classify(snapshot: &IndicatorSnapshot) -> Signal {
    RULES.iter().fold(Signal::hold(), |mut signal, rule| {
        if (rule.applies)(snapshot, signal.kind) {
            signal.kind = rule.verdict;
            signal.reasons.push(rule.reason.to_string());
        }
        signal
    })
}

pub fn analyze(series: &PriceSeries) -> Analysis {
    let snapshot = compute_indicators(series);
    Analysis {
        symbol: series.symbol().to_string(),
        signal: classify(&snapshot),
        snapshot,
    }
}
