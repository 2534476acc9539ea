pub mod aggregator;
pub mod stats_service;

pub use aggregator::StatsAggregator;
pub use stats_service::StatsService;
