use std::fs;
use std::path::Path;

use common::AdvisorError;
use common::models::{FundSuggestion, default_catalog};

pub struct FundCatalogRepository;

impl FundCatalogRepository {
    /// JSON array of `{"name", "reason"}`; the built-in list when no file is set.
    pub fn load(path: Option<&Path>) -> Result<Vec<FundSuggestion>, AdvisorError> {
        let Some(path) = path else {
            return Ok(default_catalog());
        };
        let raw = fs::read_to_string(path).map_err(|e| {
            AdvisorError::Config(format!("cannot read funds {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::scratch_file;

    #[test]
    fn test_no_file_uses_builtin_catalog() {
        assert_eq!(FundCatalogRepository::load(None).unwrap(), default_catalog());
    }

    #[test]
    fn test_load_catalog_file() {
        let path = scratch_file(
            "funds.json",
            r#"[{"name":"Parag Parikh Flexi Cap","reason":"Global diversification"}]"#,
        );
        let funds = FundCatalogRepository::load(Some(&path)).unwrap();
        assert_eq!(funds.len(), 1);
        assert_eq!(funds[0].name, "Parag Parikh Flexi Cap");
    }
}
