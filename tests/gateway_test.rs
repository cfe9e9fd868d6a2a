//! EntityGateway: memoization, negative caching, retries and trending.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockHealth, MockSource, fast_retry, owned, repo};
use huginn::cache::{CacheKey, CachedValue};
use huginn::gateway::fallback_repos;
use huginn::{CacheConfig, EntityCache, EntityGateway, HealthMetric, RetryConfig};

fn gateway(source: Arc<MockSource>, retry: RetryConfig) -> EntityGateway {
    EntityGateway::new(
        source,
        Arc::new(MockHealth::new().openrank("acme/core", 4.5)),
        Arc::new(EntityCache::new(&CacheConfig::default())),
        retry,
    )
}

#[tokio::test]
async fn second_fetch_is_served_from_cache() {
    let source = Arc::new(MockSource::new().user("alice", vec![owned("alice/a", Some("Go"), &[], 10)]));
    let gw = gateway(source.clone(), fast_retry());

    let first = gw.fetch_user("alice").await;
    let second = gw.fetch_user("alice").await;

    assert_eq!(first, second);
    assert_eq!(first.unwrap().login, "alice");
    assert_eq!(source.calls_to("user:alice"), 1);
}

#[tokio::test]
async fn cache_keys_ignore_case() {
    let source = Arc::new(MockSource::new().user("alice", vec![]));
    let gw = gateway(source.clone(), fast_retry());

    assert!(gw.fetch_user("alice").await.is_some());
    assert!(gw.fetch_user("Alice").await.is_some());
    assert_eq!(source.call_count(), 1);
}

#[tokio::test]
async fn not_found_is_cached_as_negative_entry() {
    let source = Arc::new(MockSource::new());
    let gw = gateway(source.clone(), fast_retry());

    assert!(gw.fetch_user("ghost").await.is_none());
    assert!(gw.fetch_user("ghost").await.is_none());
    assert!(gw.fetch_user_repos("ghost").await.is_empty());

    assert_eq!(source.calls_to("user:ghost"), 1, "not found must not be retried or refetched");
    assert_eq!(
        gw.cache().get(&CacheKey::user("ghost")),
        Some(CachedValue::User(None))
    );
}

#[tokio::test(start_paused = true)]
async fn transient_failures_retry_three_times_with_fixed_delay() {
    let source = Arc::new(MockSource::new().failing("flaky"));
    let gw = gateway(source.clone(), RetryConfig::default());

    let start = tokio::time::Instant::now();
    assert!(gw.fetch_user("flaky").await.is_none());

    assert_eq!(source.calls_to("user:flaky"), 3);
    // two waits of 2s between three attempts
    assert_eq!(start.elapsed(), Duration::from_secs(4));
}

#[tokio::test]
async fn exhausted_retries_are_not_cached() {
    let source = Arc::new(MockSource::new().failing("flaky"));
    let gw = gateway(source.clone(), fast_retry());

    assert!(gw.fetch_followers("flaky").await.is_empty());
    assert!(!gw.cache().contains(&CacheKey::followers("flaky")));

    assert!(gw.fetch_followers("flaky").await.is_empty());
    assert_eq!(source.calls_to("followers:flaky"), 6);
}

#[tokio::test]
async fn disabled_retry_makes_a_single_attempt() {
    let source = Arc::new(MockSource::new().failing("flaky"));
    let gw = gateway(source.clone(), RetryConfig::disabled());

    assert!(gw.fetch_user("flaky").await.is_none());
    assert_eq!(source.calls_to("user:flaky"), 1);
}

#[tokio::test]
async fn trending_excludes_forks_and_seeds_repo_cache() {
    let mut fork = repo("someone/react-fork", Some("Go"), &[], 50);
    fork.fork = true;
    let source = Arc::new(MockSource::new().trending(vec![
        repo("golang/go", Some("Go"), &["language"], 120_000),
        fork,
        repo("gohugoio/hugo", Some("Go"), &["static-site"], 70_000),
        repo("rust-lang/rust", Some("Rust"), &[], 90_000),
    ]));
    let gw = gateway(source.clone(), fast_retry());

    let trending = gw.fetch_trending_repos(Some("Go")).await;
    let names: Vec<_> = trending.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, ["golang/go", "gohugoio/hugo"]);

    // seeded: no repo call needed
    let hugo = gw.fetch_repo("gohugoio/hugo").await.unwrap();
    assert_eq!(hugo.stars, 70_000);
    assert_eq!(source.calls_to("repo:gohugoio/hugo"), 0);

    // memoized per language
    gw.fetch_trending_repos(Some("go")).await;
    assert_eq!(source.calls_to("search_repos:Go"), 1);
}

#[tokio::test]
async fn search_hits_never_replace_cached_repos() {
    let source = Arc::new(
        MockSource::new()
            .repo(repo("golang/go", Some("Go"), &["language"], 120_000))
            .trending(vec![
                repo("golang/go", Some("Go"), &[], 1),
                repo("ghost/gone", Some("Go"), &[], 5_000),
            ]),
    );
    let gw = gateway(source.clone(), fast_retry());

    assert_eq!(gw.fetch_repo("golang/go").await.unwrap().stars, 120_000);
    assert!(gw.fetch_repo("ghost/gone").await.is_none());

    gw.fetch_trending_repos(Some("Go")).await;

    let go = gw.fetch_repo("golang/go").await.unwrap();
    assert_eq!(go.stars, 120_000);
    assert_eq!(go.topics, ["language"]);
    // negative entries stay negative
    assert!(gw.fetch_repo("ghost/gone").await.is_none());
    assert_eq!(source.calls_to("repo:golang/go"), 1);
    assert_eq!(source.calls_to("repo:ghost/gone"), 1);
}

#[tokio::test]
async fn trending_failure_serves_builtin_list_without_caching_it() {
    let mut react = repo("facebook/react", Some("JavaScript"), &["ui"], 220_000);
    react.size = 400_000;
    // the unfiltered search records an empty argument
    let source = Arc::new(MockSource::new().repo(react.clone()).failing(""));
    let gw = gateway(source.clone(), fast_retry());

    let trending = gw.fetch_trending_repos(None).await;
    assert_eq!(trending, fallback_repos());
    assert!(!gw.cache().contains(&CacheKey::trending(None)));
    assert!(!gw.cache().contains(&CacheKey::repo("facebook/react")));

    // once the outage is over the real record is fetched
    assert_eq!(gw.fetch_repo("facebook/react").await, Some(react));
    assert_eq!(source.calls_to("repo:facebook/react"), 1);
}

#[tokio::test]
async fn known_repo_is_used_only_when_nothing_is_cached() {
    let mut react = repo("facebook/react", Some("JavaScript"), &["ui"], 220_000);
    react.size = 400_000;
    let source = Arc::new(MockSource::new().repo(react.clone()));
    let gw = gateway(source.clone(), fast_retry());
    let builtin = fallback_repos().into_iter().next().unwrap();

    let scored = gw.fetch_repo_or("facebook/react", Some(&builtin)).await;
    assert_eq!(scored, Some(builtin.clone()));
    assert!(!gw.cache().contains(&CacheKey::repo("facebook/react")));
    assert_eq!(source.calls_to("repo:facebook/react"), 0);

    gw.fetch_repo("facebook/react").await;
    let scored = gw.fetch_repo_or("facebook/react", Some(&builtin)).await;
    assert_eq!(scored, Some(react));

    // without a known record the remote is asked
    assert!(gw.fetch_repo_or("ghost/gone", None).await.is_none());
    assert_eq!(source.calls_to("repo:ghost/gone"), 1);
}

#[tokio::test]
async fn health_metrics_are_memoized() {
    let health = Arc::new(MockHealth::new().openrank("acme/core", 4.5));
    let gw = EntityGateway::new(
        Arc::new(MockSource::new()),
        health.clone(),
        Arc::new(EntityCache::default()),
        fast_retry(),
    );

    assert_eq!(
        gw.fetch_health_metric("acme/core", HealthMetric::OpenRank).await,
        Some(4.5)
    );
    assert_eq!(
        gw.fetch_health_metric("acme/core", HealthMetric::OpenRank).await,
        Some(4.5)
    );
    assert_eq!(
        gw.fetch_health_metric("acme/core", HealthMetric::Activity).await,
        None
    );
    assert_eq!(health.call_count(), 2);
}

#[tokio::test]
async fn active_users_respect_pool_size() {
    let source = Arc::new(MockSource::new().active(&["a", "b", "c", "d"]));
    let gw = gateway(source.clone(), fast_retry()).active_user_pool(2);

    assert_eq!(gw.fetch_active_users().await, ["a", "b"]);
    assert_eq!(gw.fetch_active_users().await, ["a", "b"]);
    assert_eq!(source.calls_to("active_users:"), 1);
}
