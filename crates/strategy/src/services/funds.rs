use common::models::FundSuggestion;

/// Case-insensitive substring match on the fund name; a blank query keeps all.
pub fn suggest_funds<'a>(catalog: &'a [FundSuggestion], query: &str) -> Vec<&'a FundSuggestion> {
    let query = query.trim().to_lowercase();
    catalog
        .iter()
        .filter(|fund| query.is_empty() || fund.name.to_lowercase().contains(&query))
        .collect()
}
