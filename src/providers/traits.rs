//! Remote source traits.
//!
//! Each remote collaborator is a narrow trait so the gateway can wrap any
//! implementation with caching and retries, and tests can swap in counting
//! mocks.
//!
//! # Error contract
//!
//! - `Err(HuginnError::NotFound)` means the remote answered "does not exist".
//!   The gateway caches that as a negative entry.
//! - Transient errors (`RateLimited`, `Http`, `Timeout`, 5xx `Api`) are
//!   retried by the gateway.
//! - Anything else is a permanent failure for that call.
//!
//! Sources never cache and never retry on their own.

use async_trait::async_trait;

use crate::Result;
use crate::types::{HealthMetric, OwnedRepo, Repo, User};

/// Parameters of a trending repository search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingQuery {
    /// Restrict to one primary language.
    pub language: Option<String>,
    /// Popularity floor: only repositories with more stars than this.
    pub min_stars: u64,
    /// Page size requested from the search API.
    pub per_page: usize,
}

/// Entity data on the hosting platform.
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Source name for logging/debugging.
    fn name(&self) -> &str;

    /// User profile.
    async fn user(&self, login: &str) -> Result<User>;

    /// Repository metadata by `owner/name`.
    async fn repo(&self, full_name: &str) -> Result<Repo>;

    /// Repositories owned by a user (first page).
    async fn user_repos(&self, login: &str) -> Result<Vec<OwnedRepo>>;

    /// Logins following a user (first page).
    async fn followers(&self, login: &str) -> Result<Vec<String>>;

    /// Logins contributing to a repository (first page).
    async fn contributors(&self, full_name: &str) -> Result<Vec<String>>;

    /// Most-followed users on the platform.
    async fn active_users(&self, limit: usize) -> Result<Vec<String>>;

    /// Repository search sorted by stars, descending.
    async fn search_repos(&self, query: &TrendingQuery) -> Result<Vec<Repo>>;
}

/// Open-source health metrics per repository.
#[async_trait]
pub trait HealthMetricsSource: Send + Sync {
    fn name(&self) -> &str;

    /// Latest value of a metric series. `Ok(None)` when the series has no
    /// numeric value.
    async fn latest(&self, full_name: &str, metric: HealthMetric) -> Result<Option<f64>>;
}

/// Free-text explanation of why two nodes are related.
///
/// Treated as opaque: the core never retries it and only surfaces failures
/// as messages.
#[async_trait]
pub trait RelationAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, node_a: &str, node_b: &str) -> Result<String>;
}
