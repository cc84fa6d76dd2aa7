pub mod fund_repo;
pub mod portfolio_repo;
pub mod universe_repo;

pub use fund_repo::FundCatalogRepository;
pub use portfolio_repo::PortfolioRepository;
pub use universe_repo::UniverseRepository;

#[cfg(test)]
pub(crate) fn scratch_file(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("advisor-storage-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
