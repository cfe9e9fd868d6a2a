//! Builder for configuring [`Huginn`] instances

use std::sync::Arc;
use std::time::Duration;

use super::{EntityGateway, Huginn};
use crate::Result;
use crate::cache::{CacheConfig, EntityCache};
use crate::engine::{RecommendConfig, Recommender};
use crate::providers::http::DEFAULT_TIMEOUT;
use crate::providers::{
    ChatAnalyzer, EntitySource, GitHubClient, HealthMetricsSource, OpenDiggerClient,
    RelationAnalyzer, RetryConfig, analyzer, github, opendigger,
};

/// Builder for configuring [`Huginn`] instances.
///
/// Every setting has a default; `Huginn::builder().build()` gives an
/// unauthenticated GitHub client, OpenDigger health metrics and no
/// relationship analysis.
pub struct HuginnBuilder {
    github_token: Option<String>,
    github_url: Option<String>,
    opendigger_url: Option<String>,
    analysis_key: Option<String>,
    analysis_url: Option<String>,
    analysis_model: Option<String>,
    entity_source: Option<Arc<dyn EntitySource>>,
    health_source: Option<Arc<dyn HealthMetricsSource>>,
    analyzer: Option<Arc<dyn RelationAnalyzer>>,
    cache: CacheConfig,
    retry: RetryConfig,
    timeout: Duration,
    recommend: RecommendConfig,
}

impl HuginnBuilder {
    pub fn new() -> Self {
        Self {
            github_token: None,
            github_url: None,
            opendigger_url: None,
            analysis_key: None,
            analysis_url: None,
            analysis_model: None,
            entity_source: None,
            health_source: None,
            analyzer: None,
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            timeout: DEFAULT_TIMEOUT,
            recommend: RecommendConfig::default(),
        }
    }

    /// Authenticate GitHub calls with a personal access token.
    pub fn github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    /// Override the GitHub API base URL (GitHub Enterprise, tests).
    pub fn github_url(mut self, url: impl Into<String>) -> Self {
        self.github_url = Some(url.into());
        self
    }

    /// Override the OpenDigger base URL.
    pub fn opendigger_url(mut self, url: impl Into<String>) -> Self {
        self.opendigger_url = Some(url.into());
        self
    }

    /// Enable relationship analysis with the chat-completions service.
    pub fn analysis_key(mut self, key: impl Into<String>) -> Self {
        self.analysis_key = Some(key.into());
        self
    }

    pub fn analysis_url(mut self, url: impl Into<String>) -> Self {
        self.analysis_url = Some(url.into());
        self
    }

    pub fn analysis_model(mut self, model: impl Into<String>) -> Self {
        self.analysis_model = Some(model.into());
        self
    }

    /// Use a custom entity source instead of the GitHub client.
    pub fn entity_source(mut self, source: Arc<dyn EntitySource>) -> Self {
        self.entity_source = Some(source);
        self
    }

    /// Use a custom health-metrics source instead of OpenDigger.
    pub fn health_source(mut self, source: Arc<dyn HealthMetricsSource>) -> Self {
        self.health_source = Some(source);
        self
    }

    /// Use a custom relationship analyzer.
    pub fn analyzer(mut self, analyzer: Arc<dyn RelationAnalyzer>) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    /// Configure the entity cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache = config;
        self
    }

    /// Configure retries of remote calls.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = config;
        self
    }

    /// Per-call timeout of the built-in HTTP clients.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn recommend(mut self, config: RecommendConfig) -> Self {
        self.recommend = config;
        self
    }

    /// Build the service.
    pub fn build(self) -> Result<Huginn> {
        let source: Arc<dyn EntitySource> = match self.entity_source {
            Some(source) => source,
            None => Arc::new(GitHubClient::with_base_url(
                self.github_token,
                self.github_url.as_deref().unwrap_or(github::DEFAULT_BASE_URL),
                self.timeout,
            )?),
        };

        let health: Arc<dyn HealthMetricsSource> = match self.health_source {
            Some(source) => source,
            None => Arc::new(OpenDiggerClient::with_base_url(
                self.opendigger_url
                    .as_deref()
                    .unwrap_or(opendigger::DEFAULT_BASE_URL),
                self.timeout,
            )?),
        };

        let analyzer: Option<Arc<dyn RelationAnalyzer>> = match (self.analyzer, self.analysis_key) {
            (Some(analyzer), _) => Some(analyzer),
            (None, Some(key)) => {
                let mut client = match self.analysis_url {
                    Some(url) => ChatAnalyzer::with_base_url(key, url, analyzer::DEFAULT_TIMEOUT)?,
                    None => ChatAnalyzer::new(key)?,
                };
                if let Some(model) = self.analysis_model {
                    client = client.model(model);
                }
                Some(Arc::new(client))
            }
            (None, None) => None,
        };

        let cache = Arc::new(EntityCache::new(&self.cache));
        let gateway = Arc::new(
            EntityGateway::new(source, health, cache, self.retry)
                .active_user_pool(self.recommend.active_user_pool)
                .trending_page_size(self.recommend.trending_page_size),
        );
        let recommender = Recommender::new(gateway.clone(), self.recommend);

        Ok(Huginn::new(gateway, recommender, analyzer))
    }
}

impl Default for HuginnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
