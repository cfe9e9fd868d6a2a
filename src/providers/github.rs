//! GitHub REST API client.
//!
//! See: <https://docs.github.com/en/rest>
//!
//! Only the first page of every list endpoint is read; the engine needs a
//! representative sample, not the full relation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::http::{DEFAULT_TIMEOUT, build_client, handle_response_errors};
use super::traits::{EntitySource, TrendingQuery};
use crate::types::{OwnedRepo, Repo, User};
use crate::{HuginnError, Result};

/// Default base URL for the GitHub REST API
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Page size for repository and contributor lists.
const LIST_PAGE_SIZE: usize = 100;

/// Popularity floor of the active-user search.
const ACTIVE_USER_MIN_FOLLOWERS: u64 = 1_000;

/// Client for the GitHub REST API.
///
/// Holds one `reqwest` connection pool shared by all concurrent calls.
#[derive(Clone)]
pub struct GitHubClient {
    token: Option<String>,
    http: Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client for api.github.com, authenticated when a token is given.
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(
        token: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            token: token.filter(|t| !t.is_empty()),
            http: build_client(timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// GET a JSON resource. `Ok(None)` for 204 No Content.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        handle_response_errors(&response, path)?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| HuginnError::InvalidPayload(format!("{path}: {e}")))
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        Ok(self.get_json(path, query).await?.unwrap_or_default())
    }
}

#[async_trait]
impl EntitySource for GitHubClient {
    fn name(&self) -> &str {
        "github"
    }

    async fn user(&self, login: &str) -> Result<User> {
        let path = format!("/users/{login}");
        self.get_json(&path, &[])
            .await?
            .ok_or_else(|| HuginnError::InvalidPayload(format!("{path}: empty body")))
    }

    async fn repo(&self, full_name: &str) -> Result<Repo> {
        let path = format!("/repos/{full_name}");
        self.get_json(&path, &[])
            .await?
            .ok_or_else(|| HuginnError::InvalidPayload(format!("{path}: empty body")))
    }

    async fn user_repos(&self, login: &str) -> Result<Vec<OwnedRepo>> {
        self.get_list(
            &format!("/users/{login}/repos"),
            &[("per_page", LIST_PAGE_SIZE.to_string())],
        )
        .await
    }

    async fn followers(&self, login: &str) -> Result<Vec<String>> {
        let followers: Vec<LoginItem> = self
            .get_list(&format!("/users/{login}/followers"), &[])
            .await?;
        Ok(logins(followers))
    }

    async fn contributors(&self, full_name: &str) -> Result<Vec<String>> {
        let contributors: Vec<LoginItem> = self
            .get_list(
                &format!("/repos/{full_name}/contributors"),
                &[("per_page", LIST_PAGE_SIZE.to_string())],
            )
            .await?;
        Ok(logins(contributors))
    }

    async fn active_users(&self, limit: usize) -> Result<Vec<String>> {
        let query = [
            ("q", format!("followers:>{ACTIVE_USER_MIN_FOLLOWERS}")),
            ("sort", "followers".to_string()),
            ("order", "desc".to_string()),
            ("per_page", limit.clamp(1, LIST_PAGE_SIZE).to_string()),
        ];
        let page: Option<SearchPage<LoginItem>> = self.get_json("/search/users", &query).await?;
        Ok(page.map(|p| logins(p.items)).unwrap_or_default())
    }

    async fn search_repos(&self, query: &TrendingQuery) -> Result<Vec<Repo>> {
        let params = [
            ("q", search_qualifiers(query)),
            ("sort", "stars".to_string()),
            ("order", "desc".to_string()),
            ("per_page", query.per_page.clamp(1, LIST_PAGE_SIZE).to_string()),
        ];
        let page: Option<SearchPage<Repo>> =
            self.get_json("/search/repositories", &params).await?;
        Ok(page.map(|p| p.items).unwrap_or_default())
    }
}

/// `stars:>N` plus an optional `language:` qualifier, quoted when the
/// language name has spaces.
fn search_qualifiers(query: &TrendingQuery) -> String {
    let mut q = format!("stars:>{}", query.min_stars);
    if let Some(language) = query.language.as_deref().filter(|l| !l.is_empty()) {
        if language.contains(char::is_whitespace) {
            q.push_str(&format!(" language:\"{language}\""));
        } else {
            q.push_str(&format!(" language:{language}"));
        }
    }
    q
}

fn logins(items: Vec<LoginItem>) -> Vec<String> {
    items.into_iter().filter_map(|item| item.login).collect()
}

#[derive(Deserialize)]
struct SearchPage<T> {
    items: Vec<T>,
}

/// Anonymous contributors carry no login and are skipped.
#[derive(Deserialize)]
struct LoginItem {
    #[serde(default)]
    login: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualifiers_without_language() {
        let query = TrendingQuery {
            language: None,
            min_stars: 10,
            per_page: 30,
        };
        assert_eq!(search_qualifiers(&query), "stars:>10");
    }

    #[test]
    fn qualifiers_quote_multiword_languages() {
        let query = TrendingQuery {
            language: Some("Jupyter Notebook".into()),
            min_stars: 10,
            per_page: 30,
        };
        assert_eq!(
            search_qualifiers(&query),
            "stars:>10 language:\"Jupyter Notebook\""
        );

        let go = TrendingQuery {
            language: Some("Go".into()),
            ..query
        };
        assert_eq!(search_qualifiers(&go), "stars:>10 language:Go");
    }
}
