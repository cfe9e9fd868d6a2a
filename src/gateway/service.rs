//! The assembled service.

use std::sync::Arc;

use tracing::{instrument, warn};

use super::{EntityGateway, HuginnBuilder};
use crate::cache::EntityCache;
use crate::engine::Recommender;
use crate::providers::RelationAnalyzer;
use crate::types::{AnalysisResult, RecommendRequest, RecommendationResult};

/// Main entry point: recommendations plus relationship analysis.
///
/// ```rust,no_run
/// use huginn::{Huginn, RecommendRequest, EntityKind};
///
/// #[tokio::main]
/// async fn main() -> huginn::Result<()> {
///     let huginn = Huginn::builder()
///         .github_token("ghp_your_token")
///         .build()?;
///
///     let request = RecommendRequest::new(EntityKind::User, "octocat", EntityKind::Repo).count(5);
///     let result = huginn.recommend(&request).await;
///     for candidate in &result.recommendations {
///         println!("{} {:.2}", candidate.id, candidate.similarity);
///     }
///     Ok(())
/// }
/// ```
pub struct Huginn {
    gateway: Arc<EntityGateway>,
    recommender: Recommender,
    analyzer: Option<Arc<dyn RelationAnalyzer>>,
}

impl Huginn {
    /// Create a new builder for configuring the service.
    pub fn builder() -> HuginnBuilder {
        HuginnBuilder::new()
    }

    pub(crate) fn new(
        gateway: Arc<EntityGateway>,
        recommender: Recommender,
        analyzer: Option<Arc<dyn RelationAnalyzer>>,
    ) -> Self {
        Self {
            gateway,
            recommender,
            analyzer,
        }
    }

    /// Recommend related entities. Never fails; see [`RecommendationResult::status`].
    pub async fn recommend(&self, request: &RecommendRequest) -> RecommendationResult {
        self.recommender.recommend(request).await
    }

    /// Explain why two nodes (logins or `owner/name`) are related.
    ///
    /// Single attempt; failures come back as an error status.
    #[instrument(skip(self))]
    pub async fn analyze(&self, node_a: &str, node_b: &str) -> AnalysisResult {
        let (node_a, node_b) = (node_a.trim(), node_b.trim());
        if node_a.is_empty() || node_b.is_empty() {
            return AnalysisResult::error("both nodes are required");
        }
        let Some(analyzer) = &self.analyzer else {
            return AnalysisResult::error("relationship analysis is not configured");
        };

        match analyzer.analyze(node_a, node_b).await {
            Ok(analysis) => AnalysisResult::success(analysis),
            Err(e) => {
                warn!(analyzer = analyzer.name(), error = %e, "analysis failed");
                AnalysisResult::error(format!("analysis failed: {e}"))
            }
        }
    }

    pub fn gateway(&self) -> &Arc<EntityGateway> {
        &self.gateway
    }

    pub fn cache(&self) -> &Arc<EntityCache> {
        self.gateway.cache()
    }
}
