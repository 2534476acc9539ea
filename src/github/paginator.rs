use reqwest::header::LINK;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::github::client::{read_json, GitHubClient};
use crate::github::source::AuthMode;

pub struct Paginator<'a> {
    github: &'a GitHubClient,
    auth: AuthMode,
}

impl<'a> Paginator<'a> {
    pub fn new(github: &'a GitHubClient, auth: AuthMode) -> Self {
        Self { github, auth }
    }

    /// Walks `page=1..` until a page is empty, short, or the `Link` header
    /// is present without `rel="next"`. A full page with no `Link` header is
    /// treated as a continuation.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        base_url: &str,
        per_page: u32,
    ) -> Result<Vec<T>> {
        let mut all_items = Vec::new();
        let mut page = 1;

        loop {
            let separator = if base_url.contains('?') { "&" } else { "?" };
            let url = format!("{}{}per_page={}&page={}", base_url, separator, per_page, page);

            tracing::debug!("Fetching: {}", url);
            let response = self.github.get(&url, self.auth).await?;

            let link = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let items: Vec<T> = read_json(response).await?;
            let items_count = items.len();
            all_items.extend(items);

            if is_last_page(items_count, per_page, link.as_deref()) {
                break;
            }

            page += 1;
        }

        Ok(all_items)
    }
}

fn is_last_page(items_count: usize, per_page: u32, link: Option<&str>) -> bool {
    if items_count == 0 || items_count < per_page as usize {
        return true;
    }

    match link {
        Some(link) => !link.contains("rel=\"next\""),
        None => false,
    }
}
