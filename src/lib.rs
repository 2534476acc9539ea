pub mod config;
pub mod error;
pub mod models;
pub mod github;
pub mod analysis;
pub mod cache;
pub mod server;

pub use config::Config;
pub use error::{Error, Result};
pub use github::{GitHubClient, ProfileSource};
pub use analysis::{StatsAggregator, StatsService};
pub use cache::{MemoryCache, PayloadCache};
pub use models::StatsPayload;
