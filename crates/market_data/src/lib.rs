pub mod remote;
pub mod symbols;
pub mod traits;

pub use remote::YahooClient;
pub use symbols::normalize_symbol;
pub use traits::MarketDataProvider;
