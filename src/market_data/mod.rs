pub mod bar_store;
pub mod fetcher;
pub mod freshness;

pub use bar_store::BarStore;
pub use fetcher::BarFetcher;
pub use freshness::FreshnessTracker;
