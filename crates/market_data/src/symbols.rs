/// Upper-cases a ticker and appends the exchange suffix when it is missing,
/// so `infy`, `INFY` and `INFY.NS` all resolve to `INFY.NS`.
pub fn normalize_symbol(ticker: &str, suffix: &str) -> String {
    let ticker = ticker.trim().to_uppercase();
    let suffix = suffix.to_uppercase();
    if suffix.is_empty() || ticker.ends_with(&suffix) {
        ticker
    } else {
        format!("{}{}", ticker, suffix)
    }
}
