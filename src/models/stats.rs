use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::github::{GitHubUser, Repository};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub html_url: String,
    pub followers: u32,
    pub following: u32,
    pub public_repos: u32,
}

impl From<&GitHubUser> for ProfileSummary {
    fn from(user: &GitHubUser) -> Self {
        Self {
            login: user.login.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
            html_url: user.html_url.clone(),
            followers: user.followers,
            following: user.following,
            public_repos: user.public_repos,
        }
    }
}

/// Totals over eligible repositories.
///
/// `total_watchers` is not GitHub's watcher count: it is the sum of
/// stars plus forks for each eligible repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub total_stars: u64,
    pub total_forks: u64,
    pub total_watchers: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageCount {
    pub name: String,
    pub count: u32,
}

/// Reduced repository shape shown on the portfolio cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoCard {
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub stars: u32,
    pub forks: u32,
    pub language: Option<String>,
}

impl From<&Repository> for RepoCard {
    fn from(repo: &Repository) -> Self {
        Self {
            name: repo.name.clone(),
            url: repo.html_url.clone(),
            description: repo.description.clone(),
            stars: repo.stargazers_count,
            forks: repo.forks_count,
            language: repo.language.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub profile: ProfileSummary,
    pub stats: Totals,
    pub top_languages: Vec<LanguageCount>,
    pub repo_count: usize,
    pub latest: Vec<RepoCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ConfigurationError,
    UpstreamError,
    TransportError,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::ConfigurationError => write!(f, "configuration_error"),
            FailureKind::UpstreamError => write!(f, "upstream_error"),
            FailureKind::TransportError => write!(f, "transport_error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsFailure {
    #[serde(rename = "error")]
    pub kind: FailureKind,
    pub detail: String,
}

impl StatsFailure {
    pub fn configuration(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ConfigurationError,
            detail: detail.into(),
        }
    }
}

impl From<&Error> for StatsFailure {
    fn from(err: &Error) -> Self {
        let kind = match err {
            Error::Config(_) => FailureKind::ConfigurationError,
            Error::GitHubApi { .. } | Error::ParseError(_) => FailureKind::UpstreamError,
            Error::Network(_) | Error::Io(_) | Error::InvalidHeader(_) => {
                FailureKind::TransportError
            }
        };
        Self {
            kind,
            detail: err.to_string(),
        }
    }
}

/// Result of one stats request: the cached or fresh payload, or why it failed.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsPayload {
    Ready(Arc<ProfileStats>),
    Failed(StatsFailure),
}

impl StatsPayload {
    pub fn is_ok(&self) -> bool {
        matches!(self, StatsPayload::Ready(_))
    }

    pub fn stats(&self) -> Option<&Arc<ProfileStats>> {
        match self {
            StatsPayload::Ready(stats) => Some(stats),
            StatsPayload::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&StatsFailure> {
        match self {
            StatsPayload::Ready(_) => None,
            StatsPayload::Failed(failure) => Some(failure),
        }
    }
}

#[derive(Serialize)]
struct ReadyBody<'a> {
    ok: bool,
    #[serde(flatten)]
    stats: &'a ProfileStats,
}

#[derive(Serialize)]
struct FailedBody<'a> {
    ok: bool,
    #[serde(flatten)]
    failure: &'a StatsFailure,
}

impl Serialize for StatsPayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatsPayload::Ready(stats) => ReadyBody { ok: true, stats }.serialize(serializer),
            StatsPayload::Failed(failure) => FailedBody { ok: false, failure }.serialize(serializer),
        }
    }
}
