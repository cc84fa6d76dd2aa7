use std::fs;
use std::path::Path;

use common::AdvisorError;
use common::models::Holding;
use tracing::info;

pub struct PortfolioRepository;

impl PortfolioRepository {
    /// Reads a JSON array of `{"ticker": "...", "shares": n}` entries.
    pub fn load(path: &Path) -> Result<Vec<Holding>, AdvisorError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AdvisorError::Config(format!("cannot read portfolio {}: {}", path.display(), e))
        })?;

        let holdings: Vec<Holding> = serde_json::from_str(&raw)?;
        let holdings: Vec<Holding> = holdings
            .into_iter()
            .filter(|h| !h.ticker.trim().is_empty())
            .collect();

        info!("Loaded {} holdings from {}", holdings.len(), path.display());
        Ok(holdings)
    }
}
