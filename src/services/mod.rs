//! Services for fetching, aggregating and exporting poster data

pub mod aggregator;
pub mod capital;
pub mod export;
pub mod format;
pub mod market_data;
pub mod ranker;

pub use aggregator::Aggregator;
pub use capital::fetch_and_process_capital_data;
pub use export::{PosterDocument, PosterExportService};
pub use market_data::{MarketDataClient, MarketDataConfig, MarketDataSource};
pub use ranker::Ranker;
