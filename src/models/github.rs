use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Subset of `GET /users/{login}` that the stats payload needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    #[serde(default)]
    pub public_repos: u32,
}

/// One entry of `GET /users/{login}/repos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    pub language: Option<String>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub fork: bool,
    /// Null upstream for repositories that never received a push.
    pub pushed_at: Option<DateTime<Utc>>,
}

impl Repository {
    /// Neither private nor archived.
    pub fn is_eligible(&self) -> bool {
        !self.private && !self.archived
    }
}
