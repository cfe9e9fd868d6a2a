//! In-memory sources shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use huginn::providers::{EntitySource, HealthMetricsSource, TrendingQuery};
use huginn::{
    HealthMetric, Huginn, HuginnError, OwnedRepo, RecommendConfig, Repo, Result, RetryConfig,
    User,
};

/// Entity source backed by maps. Unknown ids are "not found"; ids listed in
/// `failing` answer with a transport error on every call.
#[derive(Default)]
pub struct MockSource {
    pub users: HashMap<String, User>,
    pub user_repos: HashMap<String, Vec<OwnedRepo>>,
    pub repos: HashMap<String, Repo>,
    pub followers: HashMap<String, Vec<String>>,
    pub contributors: HashMap<String, Vec<String>>,
    pub active: Vec<String>,
    pub trending: Vec<Repo>,
    pub failing: HashSet<String>,
    /// Sleep before answering `user`, to exercise deadlines.
    pub user_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(mut self, login: &str, repos: Vec<OwnedRepo>) -> Self {
        self.users.insert(
            login.to_string(),
            User {
                login: login.to_string(),
                followers: 10,
                following: 5,
                public_repos: repos.len() as u64,
            },
        );
        self.user_repos.insert(login.to_string(), repos);
        self
    }

    pub fn repo(mut self, repo: Repo) -> Self {
        self.repos.insert(repo.full_name.clone(), repo);
        self
    }

    pub fn followers(mut self, login: &str, followers: &[&str]) -> Self {
        self.followers
            .insert(login.to_string(), followers.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn contributors(mut self, full_name: &str, logins: &[&str]) -> Self {
        self.contributors
            .insert(full_name.to_string(), logins.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn active(mut self, logins: &[&str]) -> Self {
        self.active = logins.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn trending(mut self, repos: Vec<Repo>) -> Self {
        self.trending = repos;
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    pub fn user_delay(mut self, delay: Duration) -> Self {
        self.user_delay = Some(delay);
        self
    }

    /// Every remote call so far, as `operation:argument`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_to(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    fn record(&self, operation: &str, argument: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{operation}:{argument}"));
        if self.failing.contains(argument) {
            return Err(HuginnError::Http(format!("connection reset: {argument}")));
        }
        Ok(())
    }
}

fn found<T: Clone>(value: Option<&T>, id: &str) -> Result<T> {
    value
        .cloned()
        .ok_or_else(|| HuginnError::NotFound(id.to_string()))
}

#[async_trait]
impl EntitySource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn user(&self, login: &str) -> Result<User> {
        if let Some(delay) = self.user_delay {
            tokio::time::sleep(delay).await;
        }
        self.record("user", login)?;
        found(self.users.get(login), login)
    }

    async fn repo(&self, full_name: &str) -> Result<Repo> {
        self.record("repo", full_name)?;
        found(self.repos.get(full_name), full_name)
    }

    async fn user_repos(&self, login: &str) -> Result<Vec<OwnedRepo>> {
        self.record("user_repos", login)?;
        found(self.user_repos.get(login), login)
    }

    async fn followers(&self, login: &str) -> Result<Vec<String>> {
        self.record("followers", login)?;
        Ok(self.followers.get(login).cloned().unwrap_or_default())
    }

    async fn contributors(&self, full_name: &str) -> Result<Vec<String>> {
        self.record("contributors", full_name)?;
        Ok(self.contributors.get(full_name).cloned().unwrap_or_default())
    }

    async fn active_users(&self, limit: usize) -> Result<Vec<String>> {
        self.record("active_users", "")?;
        Ok(self.active.iter().take(limit).cloned().collect())
    }

    async fn search_repos(&self, query: &TrendingQuery) -> Result<Vec<Repo>> {
        let language = query.language.clone().unwrap_or_default();
        self.record("search_repos", &language)?;
        Ok(self
            .trending
            .iter()
            .filter(|r| query.language.is_none() || r.language == query.language)
            .take(query.per_page)
            .cloned()
            .collect())
    }
}

/// Health source with fixed answers per repository.
#[derive(Default)]
pub struct MockHealth {
    pub openrank: HashMap<String, f64>,
    calls: AtomicU32,
}

impl MockHealth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn openrank(mut self, full_name: &str, value: f64) -> Self {
        self.openrank.insert(full_name.to_string(), value);
        self
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl HealthMetricsSource for MockHealth {
    fn name(&self) -> &str {
        "mock-health"
    }

    async fn latest(&self, full_name: &str, metric: HealthMetric) -> Result<Option<f64>> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match metric {
            HealthMetric::OpenRank => Ok(self.openrank.get(full_name).copied()),
            HealthMetric::Activity => Ok(None),
        }
    }
}

pub fn owned(full_name: &str, language: Option<&str>, topics: &[&str], size: u64) -> OwnedRepo {
    OwnedRepo {
        full_name: full_name.to_string(),
        language: language.map(String::from),
        topics: topics.iter().map(|t| t.to_string()).collect(),
        size,
        fork: false,
    }
}

pub fn repo(full_name: &str, language: Option<&str>, topics: &[&str], stars: u64) -> Repo {
    Repo {
        full_name: full_name.to_string(),
        language: language.map(String::from),
        topics: topics.iter().map(|t| t.to_string()).collect(),
        stars,
        forks: stars / 10,
        watchers: stars,
        size: 1_000,
        description: Some(format!("{full_name} project")),
        fork: false,
    }
}

/// Retries without waiting.
pub fn fast_retry() -> RetryConfig {
    RetryConfig::new().initial_delay(Duration::ZERO)
}

/// Service over the given sources with instant retries.
pub fn service(source: Arc<MockSource>, config: RecommendConfig) -> Huginn {
    Huginn::builder()
        .entity_source(source)
        .health_source(Arc::new(MockHealth::new()))
        .retry(fast_retry())
        .recommend(config)
        .build()
        .unwrap()
}
