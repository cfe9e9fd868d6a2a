//! Memoizing, retrying access to remote entity data.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::cache::{CacheKey, CachedValue, EntityCache};
use crate::providers::{
    EntitySource, HealthMetricsSource, RetryConfig, TrendingQuery, with_retry,
};
use crate::telemetry;
use crate::types::{HealthMetric, OwnedRepo, Repo, User};
use crate::{HuginnError, Result};

/// Popularity floor of the trending search.
const TRENDING_MIN_STARS: u64 = 10;

/// Default size of the active-user pool.
pub const DEFAULT_ACTIVE_USER_POOL: usize = 30;

/// Default page size of the trending search.
pub const DEFAULT_TRENDING_PAGE_SIZE: usize = 30;

/// Typed access to remote entity data.
///
/// Every lookup goes cache first, then the remote source under the injected
/// [`RetryConfig`]:
///
/// - a hit returns without a network call;
/// - "not found" is cached as a negative entry and returned as `None` or an
///   empty list;
/// - a failure (exhausted retries, invalid payload) is logged and returned
///   as the negative value, without caching it.
///
/// No operation returns an error.
pub struct EntityGateway {
    source: Arc<dyn EntitySource>,
    health: Arc<dyn HealthMetricsSource>,
    cache: Arc<EntityCache>,
    retry: RetryConfig,
    active_user_pool: usize,
    trending_page_size: usize,
}

impl EntityGateway {
    pub fn new(
        source: Arc<dyn EntitySource>,
        health: Arc<dyn HealthMetricsSource>,
        cache: Arc<EntityCache>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            source,
            health,
            cache,
            retry,
            active_user_pool: DEFAULT_ACTIVE_USER_POOL,
            trending_page_size: DEFAULT_TRENDING_PAGE_SIZE,
        }
    }

    /// Number of most-followed users fetched as the fallback user pool.
    pub fn active_user_pool(mut self, n: usize) -> Self {
        self.active_user_pool = n.max(1);
        self
    }

    /// Page size of the trending repository search.
    pub fn trending_page_size(mut self, n: usize) -> Self {
        self.trending_page_size = n.max(1);
        self
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.cache
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    pub async fn fetch_user(&self, login: &str) -> Option<User> {
        let source = self.source.as_ref();
        let value = self
            .memoized(CacheKey::user(login), CachedValue::User(None), move || async move {
                source.user(login).await.map(|u| CachedValue::User(Some(u)))
            })
            .await;
        match value {
            CachedValue::User(user) => user,
            _ => None,
        }
    }

    pub async fn fetch_repo(&self, full_name: &str) -> Option<Repo> {
        let source = self.source.as_ref();
        let value = self
            .memoized(CacheKey::repo(full_name), CachedValue::Repo(None), move || async move {
                source.repo(full_name).await.map(|r| CachedValue::Repo(Some(r)))
            })
            .await;
        match value {
            CachedValue::Repo(repo) => repo,
            _ => None,
        }
    }

    pub async fn fetch_user_repos(&self, login: &str) -> Vec<OwnedRepo> {
        let source = self.source.as_ref();
        let value = self
            .memoized(
                CacheKey::user_repos(login),
                CachedValue::Repos(Vec::new()),
                move || async move { source.user_repos(login).await.map(CachedValue::Repos) },
            )
            .await;
        match value {
            CachedValue::Repos(repos) => repos,
            _ => Vec::new(),
        }
    }

    pub async fn fetch_followers(&self, login: &str) -> Vec<String> {
        let source = self.source.as_ref();
        let value = self
            .memoized(
                CacheKey::followers(login),
                CachedValue::Logins(Vec::new()),
                move || async move { source.followers(login).await.map(CachedValue::Logins) },
            )
            .await;
        into_logins(value)
    }

    pub async fn fetch_contributors(&self, full_name: &str) -> Vec<String> {
        let source = self.source.as_ref();
        let value = self
            .memoized(
                CacheKey::contributors(full_name),
                CachedValue::Logins(Vec::new()),
                move || async move {
                    source
                        .contributors(full_name)
                        .await
                        .map(CachedValue::Logins)
                },
            )
            .await;
        into_logins(value)
    }

    /// Most-followed users on the platform, the fallback pool for user finds.
    pub async fn fetch_active_users(&self) -> Vec<String> {
        let source = self.source.as_ref();
        let limit = self.active_user_pool;
        let value = self
            .memoized(
                CacheKey::ActiveUsers,
                CachedValue::Logins(Vec::new()),
                move || async move { source.active_users(limit).await.map(CachedValue::Logins) },
            )
            .await;
        into_logins(value)
    }

    /// Popular non-fork repositories, optionally in one language.
    ///
    /// Each hit seeds the repository cache where no entry exists yet. When
    /// the search fails outright a built-in list of well-known repositories
    /// is returned; it is never cached.
    pub async fn fetch_trending_repos(&self, language: Option<&str>) -> Vec<Repo> {
        let language = language.map(str::trim).filter(|l| !l.is_empty());
        let key = CacheKey::trending(language);
        if let Some(CachedValue::Trending(repos)) = self.cache.get(&key) {
            return repos;
        }

        let query = TrendingQuery {
            language: language.map(str::to_string),
            min_stars: TRENDING_MIN_STARS,
            per_page: self.trending_page_size,
        };
        let source = self.source.as_ref();
        let query = &query;
        let result = self
            .remote(key.operation(), move || async move {
                source.search_repos(query).await
            })
            .await;

        match result {
            Ok(repos) => {
                let repos: Vec<Repo> = repos.into_iter().filter(|r| !r.fork).collect();
                for repo in &repos {
                    self.cache.insert_if_absent(
                        CacheKey::repo(&repo.full_name),
                        CachedValue::Repo(Some(repo.clone())),
                    );
                }
                debug!(language, count = repos.len(), "trending search");
                match self.cache.insert_if_absent(key, CachedValue::Trending(repos.clone())) {
                    CachedValue::Trending(stored) => stored,
                    _ => repos,
                }
            }
            Err(HuginnError::NotFound(_)) => {
                self.cache.insert_if_absent(key, CachedValue::Trending(Vec::new()));
                Vec::new()
            }
            Err(e) => {
                warn!(language, error = %e, "trending search failed, using built-in list");
                fallback_repos()
            }
        }
    }

    /// Repository by name, preferring a stored entry over `known` and
    /// `known` over the remote. `known` is never stored.
    pub async fn fetch_repo_or(&self, full_name: &str, known: Option<&Repo>) -> Option<Repo> {
        let Some(known) = known else {
            return self.fetch_repo(full_name).await;
        };
        match self.cache.get(&CacheKey::repo(full_name)) {
            Some(CachedValue::Repo(repo)) => repo,
            _ => Some(known.clone()),
        }
    }

    /// Latest value of a health metric, `None` when unavailable.
    pub async fn fetch_health_metric(&self, full_name: &str, metric: HealthMetric) -> Option<f64> {
        let health = self.health.as_ref();
        let value = self
            .memoized(
                CacheKey::health(full_name, metric),
                CachedValue::Metric(None),
                move || async move {
                    health
                        .latest(full_name, metric)
                        .await
                        .map(CachedValue::Metric)
                },
            )
            .await;
        match value {
            CachedValue::Metric(v) => v,
            _ => None,
        }
    }

    /// Cache-first lookup with negative caching. Failures yield `negative`
    /// without caching it.
    async fn memoized<F, Fut>(&self, key: CacheKey, negative: CachedValue, fetch: F) -> CachedValue
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<CachedValue>>,
    {
        if let Some(value) = self.cache.get(&key) {
            return value;
        }

        match self.remote(key.operation(), fetch).await {
            // a concurrent writer may have stored the key first; its entry wins
            Ok(value) => self.cache.insert_if_absent(key, value),
            Err(HuginnError::NotFound(resource)) => {
                debug!(%resource, "not found, caching negative entry");
                self.cache.insert_if_absent(key, negative)
            }
            Err(e) => {
                warn!(key = ?key, error = %e, "remote lookup failed");
                negative
            }
        }
    }

    /// One remote call under the retry policy, with per-attempt metrics.
    async fn remote<T, F, Fut>(&self, operation: &'static str, fetch: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let start = Instant::now();
        let result = with_retry(&self.retry, operation, || {
            let attempt = fetch();
            async move {
                let result = attempt.await;
                let status = match &result {
                    Ok(_) => "ok",
                    Err(HuginnError::NotFound(_)) => "not_found",
                    Err(_) => "error",
                };
                metrics::counter!(telemetry::REMOTE_REQUESTS_TOTAL,
                    "operation" => operation,
                    "status" => status,
                )
                .increment(1);
                result
            }
        })
        .await;
        metrics::histogram!(telemetry::REMOTE_REQUEST_DURATION_SECONDS,
            "operation" => operation,
        )
        .record(start.elapsed().as_secs_f64());
        result
    }
}

fn into_logins(value: CachedValue) -> Vec<String> {
    match value {
        CachedValue::Logins(logins) => logins,
        _ => Vec::new(),
    }
}

/// Well-known repositories served when the trending search is unavailable.
pub fn fallback_repos() -> Vec<Repo> {
    [
        (
            "facebook/react",
            "JavaScript",
            200_000,
            40_000,
            "A declarative, efficient, and flexible JavaScript library for building user interfaces.",
        ),
        (
            "tensorflow/tensorflow",
            "Python",
            170_000,
            30_000,
            "An Open Source Machine Learning Framework for Everyone",
        ),
        (
            "microsoft/vscode",
            "TypeScript",
            140_000,
            25_000,
            "Visual Studio Code",
        ),
    ]
    .into_iter()
    .map(|(full_name, language, stars, forks, description)| Repo {
        full_name: full_name.to_string(),
        language: Some(language.to_string()),
        topics: Vec::new(),
        stars,
        forks,
        watchers: stars,
        size: 0,
        description: Some(description.to_string()),
        fork: false,
    })
    .collect()
}
