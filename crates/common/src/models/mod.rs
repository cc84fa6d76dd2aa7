pub mod fund;
pub mod portfolio;
pub mod price_series;
pub mod signal;

pub use fund::{FundSuggestion, default_catalog};
pub use portfolio::{Holding, HoldingEvaluation};
pub use price_series::{PricePoint, PriceSeries};
pub use signal::{Analysis, IndicatorSnapshot, Signal, SignalKind};
