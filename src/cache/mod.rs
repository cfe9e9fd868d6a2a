//! Process-lifetime entity cache.
//!
//! [`EntityCache`] memoizes every gateway lookup: profiles, repositories,
//! relation lists and health metrics. It is constructed once and injected
//! into [`EntityGateway`](crate::gateway::EntityGateway); nothing in the
//! crate keeps a hidden global.
//!
//! # Semantics
//!
//! - Bounded: at most `max_entries` entries, least-recently-used eviction.
//! - No TTL: an entry lives until capacity pressure evicts it.
//! - Negative entries: a "does not exist" answer is cached like any other
//!   (e.g. `CachedValue::User(None)`), so repeated lookups of a missing
//!   login cost nothing.
//! - Thread-safe: moka handles concurrent readers and writers internally and
//!   applies evictions atomically with respect to them.
//!
//! Logins and repository names are case-insensitive on GitHub, so keys are
//! normalized to lowercase.

use moka::policy::EvictionPolicy;
use moka::sync::Cache;

use crate::telemetry;
use crate::types::{HealthMetric, OwnedRepo, Repo, User};

/// Default maximum number of entries.
const DEFAULT_MAX_ENTRIES: u64 = 1_000;

/// Configuration for the entity cache.
///
/// ```rust
/// # use huginn::CacheConfig;
/// let config = CacheConfig::new().max_entries(256);
/// assert_eq!(config.max_entries, 256);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 1,000.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }
}

/// What a cached value answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    User(String),
    Repo(String),
    UserRepos(String),
    Followers(String),
    Contributors(String),
    ActiveUsers,
    /// Trending search, optionally restricted to a language.
    Trending(Option<String>),
    Health(String, HealthMetric),
}

impl CacheKey {
    pub fn user(login: &str) -> Self {
        CacheKey::User(login.to_lowercase())
    }

    pub fn repo(full_name: &str) -> Self {
        CacheKey::Repo(full_name.to_lowercase())
    }

    pub fn user_repos(login: &str) -> Self {
        CacheKey::UserRepos(login.to_lowercase())
    }

    pub fn followers(login: &str) -> Self {
        CacheKey::Followers(login.to_lowercase())
    }

    pub fn contributors(full_name: &str) -> Self {
        CacheKey::Contributors(full_name.to_lowercase())
    }

    pub fn trending(language: Option<&str>) -> Self {
        CacheKey::Trending(language.map(str::to_lowercase))
    }

    pub fn health(full_name: &str, metric: HealthMetric) -> Self {
        CacheKey::Health(full_name.to_lowercase(), metric)
    }

    /// Operation label used in metrics and logs.
    pub fn operation(&self) -> &'static str {
        match self {
            CacheKey::User(_) => "user",
            CacheKey::Repo(_) => "repo",
            CacheKey::UserRepos(_) => "user_repos",
            CacheKey::Followers(_) => "followers",
            CacheKey::Contributors(_) => "contributors",
            CacheKey::ActiveUsers => "active_users",
            CacheKey::Trending(_) => "trending",
            CacheKey::Health(_, _) => "health",
        }
    }
}

/// A cached answer. `None` variants are negative entries.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    User(Option<User>),
    Repo(Option<Repo>),
    Repos(Vec<OwnedRepo>),
    Logins(Vec<String>),
    Trending(Vec<Repo>),
    Metric(Option<f64>),
}

/// Bounded, thread-safe LRU store for gateway lookups.
pub struct EntityCache {
    entries: Cache<CacheKey, CachedValue>,
    max_entries: u64,
}

impl EntityCache {
    /// Create a cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .eviction_policy(EvictionPolicy::lru())
            .build();
        Self {
            entries,
            max_entries: config.max_entries,
        }
    }

    /// Look up a key. Emits cache hit/miss metrics.
    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let value = self.entries.get(key);
        let counter = if value.is_some() {
            telemetry::CACHE_HITS_TOTAL
        } else {
            telemetry::CACHE_MISSES_TOTAL
        };
        metrics::counter!(counter, "operation" => key.operation()).increment(1);
        value
    }

    /// Insert (or overwrite) an entry.
    pub fn insert(&self, key: CacheKey, value: CachedValue) {
        self.entries.insert(key, value);
    }

    /// Insert only when the key is absent. Returns the entry that ends up
    /// stored, which is the existing one if there was one.
    pub fn insert_if_absent(&self, key: CacheKey, value: CachedValue) -> CachedValue {
        self.entries.entry(key).or_insert(value).into_value()
    }

    /// Whether the key is cached, without touching recency or metrics.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries after pending evictions have been applied.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> u64 {
        self.max_entries
    }

    /// Evict all entries.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(CacheKey::user("Alice"), CacheKey::user("alice"));
        assert_eq!(CacheKey::repo("Rust-Lang/Rust"), CacheKey::repo("rust-lang/rust"));
        assert_eq!(CacheKey::trending(Some("Go")), CacheKey::trending(Some("go")));
    }

    #[test]
    fn keys_differ_by_kind() {
        assert_ne!(CacheKey::user("alice"), CacheKey::user_repos("alice"));
        assert_ne!(CacheKey::followers("alice"), CacheKey::user("alice"));
        assert_ne!(CacheKey::trending(None), CacheKey::trending(Some("go")));
        assert_ne!(
            CacheKey::health("a/b", HealthMetric::OpenRank),
            CacheKey::health("a/b", HealthMetric::Activity)
        );
    }

    #[test]
    fn negative_entries_are_hits() {
        let cache = EntityCache::default();
        cache.insert(CacheKey::user("ghost"), CachedValue::User(None));
        assert_eq!(cache.get(&CacheKey::user("ghost")), Some(CachedValue::User(None)));
    }

    #[test]
    fn insert_if_absent_keeps_existing_entry() {
        let cache = EntityCache::default();
        cache.insert_if_absent(CacheKey::repo("a/b"), CachedValue::Repo(None));
        let stored = cache.insert_if_absent(CacheKey::repo("A/B"), CachedValue::Metric(Some(1.0)));
        assert_eq!(stored, CachedValue::Repo(None));
        assert_eq!(cache.get(&CacheKey::repo("a/b")), Some(CachedValue::Repo(None)));
    }
}
