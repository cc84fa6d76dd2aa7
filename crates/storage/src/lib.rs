pub mod report_writer;
pub mod repositories;

pub use report_writer::{ExportError, ReportWriter};
pub use repositories::{FundCatalogRepository, PortfolioRepository, UniverseRepository};
