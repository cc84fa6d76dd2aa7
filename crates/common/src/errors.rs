use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// The provider returned nothing for this instrument, or it is unknown.
    /// Never fatal: the instrument is dropped from aggregate results.
    #[error("no market data for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// A message or an export could not be delivered. Logged and swallowed
    /// where it happens; the next scheduled run tries again.
    #[error("delivery failed: {reason}")]
    DeliveryFailure { reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl AdvisorError {
    pub fn unavailable(symbol: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }

    pub fn delivery(reason: impl ToString) -> Self {
        Self::DeliveryFailure {
            reason: reason.to_string(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::DataUnavailable { .. })
    }
}
