use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::config::{Config, DEFAULT_API_URL};
use crate::error::{Error, Result};
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::RateLimiter;
use crate::github::source::{AuthMode, ProfileSource};
use crate::models::{GitHubUser, Repository};

const PER_PAGE: u32 = 100;

pub struct GitHubClient {
    client: Client,
    token: Option<header::HeaderValue>,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("gitfolio/", env!("CARGO_PKG_VERSION"))),
        );

        let token = token
            .map(|token| {
                let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))?;
                value.set_sensitive(true);
                Ok::<_, Error>(value)
            })
            .transpose()?;

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            token,
            rate_limiter: RateLimiter::new(),
            base_url: DEFAULT_API_URL.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.github_token.as_deref(), config.request_timeout)?
            .with_base_url(&config.api_base_url))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Credentialed when a token is configured, anonymous otherwise.
    pub fn initial_auth(&self) -> AuthMode {
        if self.token.is_some() {
            AuthMode::Token
        } else {
            AuthMode::Anonymous
        }
    }

    pub(crate) async fn get(&self, url: &str, auth: AuthMode) -> Result<Response> {
        let mut request = self.client.get(url);
        if let (AuthMode::Token, Some(token)) = (auth, &self.token) {
            request = request.header(header::AUTHORIZATION, token.clone());
        }

        let response = request.send().await?;
        self.rate_limiter.update_from_headers(response.headers()).await;
        Ok(response)
    }

    /// `{base}/users/{login}` plus any trailing segments, with each segment
    /// percent-encoded so a login can never change the path or query.
    fn user_url(&self, username: &str, tail: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Config(format!("Invalid GitHub API URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid GitHub API URL {}", self.base_url)))?
            .pop_if_empty()
            .push("users")
            .push(username)
            .extend(tail);
        Ok(url)
    }

    pub async fn get_user(&self, username: &str) -> Result<(GitHubUser, AuthMode)> {
        let url = self.user_url(username, &[])?;
        tracing::info!("Fetching user: {}", username);

        let auth = self.initial_auth();
        match read_json(self.get(url.as_str(), auth).await?).await {
            Err(e) if auth == AuthMode::Token && e.is_auth_rejection() => {
                tracing::warn!("Token rejected for user {} ({}), retrying without credentials", username, e);
                let response = self.get(url.as_str(), AuthMode::Anonymous).await?;
                Ok((read_json(response).await?, AuthMode::Anonymous))
            }
            result => Ok((result?, auth)),
        }
    }

    pub async fn get_user_repos(&self, username: &str, auth: AuthMode) -> Result<Vec<Repository>> {
        let mut url = self.user_url(username, &["repos"])?;
        url.query_pairs_mut()
            .append_pair("type", "owner")
            .append_pair("sort", "updated");

        let paginator = Paginator::new(self, auth);
        tracing::info!("Fetching repositories for: {}", username);
        paginator.fetch_all(url.as_str(), PER_PAGE).await
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

#[async_trait]
impl ProfileSource for GitHubClient {
    async fn fetch_profile(&self, account: &str) -> Result<(GitHubUser, AuthMode)> {
        self.get_user(account).await
    }

    async fn fetch_all_repositories(&self, account: &str, auth: AuthMode) -> Result<Vec<Repository>> {
        self.get_user_repos(account, auth).await
    }
}

/// Reads the body as text, then maps non-success statuses to
/// [`Error::GitHubApi`] and undecodable bodies to [`Error::ParseError`].
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(Error::GitHubApi {
            status: status.as_u16(),
            detail: upstream_detail(status, &body),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| Error::ParseError(format!("unexpected GitHub response body: {}", e)))
}

fn upstream_detail(status: StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json.get("message")?.as_str().map(str::to_owned));

    match message {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => format!("HTTP {}", status.as_u16()),
    }
}
