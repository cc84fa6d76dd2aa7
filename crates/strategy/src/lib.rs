pub mod services;

pub use services::funds::suggest_funds;
pub use services::ranking::{
    PriceBand, TOP_N, evaluate_holding, evaluate_portfolio_holdings, price_levels,
    rank_candidates, score,
};
pub use services::signal_engine::{analyze, classify, compute_indicators, rsi, sma};
