use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification plus every reason that fired on the way to it, in rule order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    pub reasons: Vec<String>,
}

impl Signal {
    pub fn hold() -> Self {
        Self {
            kind: SignalKind::Hold,
            reasons: Vec::new(),
        }
    }
}

/// Indicator values at the most recent point of a series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub last: f64,
    pub sma50: Option<f64>,
    pub sma200: Option<f64>,
    pub rsi: Option<f64>,
}

impl IndicatorSnapshot {
    /// Fast average above slow average, both present.
    pub fn has_golden_trend(&self) -> bool {
        matches!((self.sma50, self.sma200), (Some(fast), Some(slow)) if fast > slow)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub symbol: String,
    pub snapshot: IndicatorSnapshot,
    pub signal: Signal,
}

impl Analysis {
    pub fn last(&self) -> f64 {
        self.snapshot.last
    }

    pub fn reasons_joined(&self, sep: &str) -> String {
        self.signal.reasons.join(sep)
    }
}
