use serde::{Deserialize, Serialize};

use super::signal::Analysis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    /// Fractional quantities are allowed.
    #[serde(default)]
    pub shares: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingEvaluation {
    pub holding: Holding,
    pub analysis: Analysis,
    pub target: f64,
    pub stop: f64,
}
