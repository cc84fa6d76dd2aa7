use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundSuggestion {
    pub name: String,
    pub reason: String,
}

impl FundSuggestion {
    pub fn new(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Used when no fund catalog file is configured.
pub fn default_catalog() -> Vec<FundSuggestion> {
    vec![
        FundSuggestion::new(
            "SBI Small Cap Fund",
            "Strong 3Y returns, diversified small-cap exposure",
        ),
        FundSuggestion::new("HDFC Index Fund - Nifty 50", "Low cost broad-market exposure"),
        FundSuggestion::new(
            "Axis Long Term Equity ELSS",
            "Tax saving + growth potential",
        ),
    ]
}
