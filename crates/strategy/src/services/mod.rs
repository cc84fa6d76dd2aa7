pub mod funds;
pub mod ranking;
pub mod signal_engine;
