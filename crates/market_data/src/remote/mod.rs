pub mod chart_response;
pub mod yahoo_client;

pub use chart_response::ChartResponse;
pub use yahoo_client::YahooClient;
