use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GitHubUser, Repository};

/// Credential mode a request is sent with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Token,
    Anonymous,
}

/// Where profile and repository data comes from.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetches the account profile. Returns the credential mode that succeeded
    /// so the repository listing can reuse it.
    async fn fetch_profile(&self, account: &str) -> Result<(GitHubUser, AuthMode)>;

    async fn fetch_all_repositories(&self, account: &str, auth: AuthMode) -> Result<Vec<Repository>>;
}
