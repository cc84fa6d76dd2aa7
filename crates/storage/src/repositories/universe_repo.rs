use std::fs;
use std::path::Path;

use common::AdvisorError;
use tracing::info;

pub struct UniverseRepository;

impl UniverseRepository {
    /// One ticker per line. Blank lines and `#` comments are skipped.
    pub fn load(path: &Path) -> Result<Vec<String>, AdvisorError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AdvisorError::Config(format!("cannot read tickers {}: {}", path.display(), e))
        })?;

        let tickers: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();

        info!("Loaded {} tickers from {}", tickers.len(), path.display());
        Ok(tickers)
    }
}
