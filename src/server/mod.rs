pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::analysis::StatsService;
use crate::cache::MemoryCache;
use crate::config::Config;
use crate::error::Result;
use crate::github::{GitHubClient, RateLimiter};

#[derive(Clone)]
pub struct AppState {
    pub stats: Arc<StatsService>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(stats: Arc<StatsService>, rate_limiter: RateLimiter) -> Self {
        Self {
            stats,
            rate_limiter,
        }
    }

    /// Wires the GitHub client, in-memory cache and stats service from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let github = GitHubClient::from_config(config)?;
        let rate_limiter = github.rate_limiter().clone();

        let stats = StatsService::new(
            Arc::new(github),
            Arc::new(MemoryCache::new()),
            config.github_username.clone(),
        )
        .with_ttl(config.cache_ttl);

        Ok(Self::new(Arc::new(stats), rate_limiter))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/github", get(handlers::github_stats))
        .route("/api/health", get(handlers::health))
        .with_state(state)
}

pub async fn serve(config: &Config) -> Result<()> {
    let state = AppState::from_config(config)?;
    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
