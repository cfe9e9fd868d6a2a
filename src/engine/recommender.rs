//! Recommendation orchestration.
//!
//! `Validate → FetchCenter → GatherCandidates → ScoreConcurrently → SortTrim
//! → BackfillIfShort → Finalize`. Every outcome, including failures, is a
//! [`RecommendationResult`].

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use super::candidates::{CandidateSource, DEFAULT_MAX_CANDIDATES};
use super::scale::{self, ScaleEstimator};
use super::similarity;
use crate::gateway::EntityGateway;
use crate::gateway::entity::{DEFAULT_ACTIVE_USER_POOL, DEFAULT_TRENDING_PAGE_SIZE};
use crate::telemetry;
use crate::types::{
    Candidate, CenterEntity, Entity, EntityKind, EntityMetrics, OwnedRepo, RecommendRequest,
    RecommendationResult, ScoredCandidate,
};
use crate::{HuginnError, Result};

/// Similarity floor applied to repository recommendations.
const REPO_SIMILARITY_FLOOR: f64 = 0.1;

/// Tuning for recommendation requests.
///
/// ```rust
/// # use huginn::RecommendConfig;
/// # use std::time::Duration;
/// let config = RecommendConfig::new()
///     .max_count(20)
///     .workers(4)
///     .deadline(Duration::from_secs(30));
/// assert_eq!(config.default_count, 5);
/// ```
#[derive(Debug, Clone)]
pub struct RecommendConfig {
    /// Results returned when the request has no count. Default: 5.
    pub default_count: usize,
    /// Upper bound for the requested count. Default: 10.
    pub max_count: usize,
    /// Candidates scored concurrently. Default: 10.
    pub workers: usize,
    /// Candidates per batch. Default: 50.
    pub max_candidates: usize,
    /// Most-followed users added to user candidate pools. Default: 30.
    pub active_user_pool: usize,
    /// Page size of trending searches. Default: 30.
    pub trending_page_size: usize,
    /// Bound on a whole request. Default: 60s.
    pub deadline: Duration,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_count: 5,
            max_count: 10,
            workers: 10,
            max_candidates: DEFAULT_MAX_CANDIDATES,
            active_user_pool: DEFAULT_ACTIVE_USER_POOL,
            trending_page_size: DEFAULT_TRENDING_PAGE_SIZE,
            deadline: Duration::from_secs(60),
        }
    }
}

impl RecommendConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_count(mut self, n: usize) -> Self {
        self.default_count = n.max(1);
        self
    }

    pub fn max_count(mut self, n: usize) -> Self {
        self.max_count = n.max(1);
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.workers = n.max(1);
        self
    }

    pub fn max_candidates(mut self, n: usize) -> Self {
        self.max_candidates = n.max(1);
        self
    }

    pub fn active_user_pool(mut self, n: usize) -> Self {
        self.active_user_pool = n.max(1);
        self
    }

    pub fn trending_page_size(mut self, n: usize) -> Self {
        self.trending_page_size = n.max(1);
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// The center entity with the data every comparison needs.
struct Center {
    entity: Entity,
    /// Owned repositories; empty for repository centers.
    repos: Vec<OwnedRepo>,
}

/// Turns a request into a ranked, deduplicated list of related entities.
pub struct Recommender {
    gateway: Arc<EntityGateway>,
    candidates: CandidateSource,
    scale: ScaleEstimator,
    config: RecommendConfig,
}

impl Recommender {
    pub fn new(gateway: Arc<EntityGateway>, config: RecommendConfig) -> Self {
        Self {
            candidates: CandidateSource::new(gateway.clone(), config.max_candidates),
            scale: ScaleEstimator::new(gateway.clone()),
            gateway,
            config,
        }
    }

    pub fn config(&self) -> &RecommendConfig {
        &self.config
    }

    /// Recommend entities of kind `request.find` related to the request's
    /// center. Never fails: errors come back as an error-status result.
    #[instrument(skip_all, fields(kind = %request.kind, name = %request.name, find = %request.find))]
    pub async fn recommend(&self, request: &RecommendRequest) -> RecommendationResult {
        let result = match tokio::time::timeout(self.config.deadline, self.run(request)).await {
            Ok(result) => result,
            Err(_) => {
                let err = HuginnError::DeadlineExceeded(self.config.deadline);
                warn!(error = %err, "recommendation timed out");
                RecommendationResult::error(err.to_string())
            }
        };

        let status = if result.is_success() { "success" } else { "error" };
        metrics::counter!(telemetry::RECOMMENDATIONS_TOTAL, "status" => status).increment(1);
        info!(
            status,
            results = result.recommendations.len(),
            message = result.message.as_deref().unwrap_or_default(),
            "recommendation finished"
        );
        result
    }

    async fn run(&self, request: &RecommendRequest) -> RecommendationResult {
        // Validate
        let count = match request
            .validate()
            .and_then(|()| request.effective_count(self.config.default_count, self.config.max_count))
        {
            Ok(count) => count,
            Err(e) => return RecommendationResult::error(e.to_string()),
        };
        let find = request.find;

        // FetchCenter
        let center = match self.fetch_center(request.kind, request.name.trim()).await {
            Ok(center) => center,
            Err(e) => return RecommendationResult::error(e.to_string()),
        };
        let center_entity = self.describe_center(&center).await;

        // GatherCandidates, ScoreConcurrently
        let mut seen: HashSet<String> = HashSet::from([center.entity.id().to_lowercase()]);
        let primary = unseen(self.candidates.primary(&center.entity, find).await, &mut seen);
        let mut gathered = primary.len();
        let mut scored = self.score_batch(&center, find, primary).await;

        // SortTrim
        sort_trim(&mut scored, count);

        // BackfillIfShort
        if scored.len() < count {
            let broader = unseen(self.candidates.broader(&center.entity, find).await, &mut seen);
            gathered += broader.len();
            if !broader.is_empty() {
                debug!(missing = count - scored.len(), candidates = broader.len(), "backfilling");
                scored.extend(self.score_batch(&center, find, broader).await);
                sort_trim(&mut scored, count);
            }
        }

        // Finalize
        if gathered == 0 {
            return RecommendationResult::error(format!(
                "no candidate {find}s available for {} '{}'",
                request.kind,
                center.entity.id()
            ))
            .with_center(center_entity);
        }
        if scored.is_empty() {
            return RecommendationResult::error("no recommendations found").with_center(center_entity);
        }
        RecommendationResult::success(center_entity, scored)
    }

    async fn fetch_center(&self, kind: EntityKind, name: &str) -> Result<Center> {
        match kind {
            EntityKind::User => {
                let user = self.gateway.fetch_user(name).await.ok_or_else(|| {
                    HuginnError::NotFound(format!("user '{name}' does not exist or is unavailable"))
                })?;
                let repos = self.gateway.fetch_user_repos(&user.login).await;
                Ok(Center {
                    entity: Entity::User(user),
                    repos,
                })
            }
            EntityKind::Repo => {
                let repo = self.gateway.fetch_repo(name).await.ok_or_else(|| {
                    HuginnError::NotFound(format!(
                        "repository '{name}' does not exist or is unavailable"
                    ))
                })?;
                Ok(Center {
                    entity: Entity::Repo(repo),
                    repos: Vec::new(),
                })
            }
        }
    }

    async fn describe_center(&self, center: &Center) -> CenterEntity {
        let scale = match &center.entity {
            Entity::User(user) => scale::user_scale(Some(user), &center.repos),
            Entity::Repo(repo) => self.scale.repo_scale(repo).await,
        };
        CenterEntity {
            id: center.entity.id().to_string(),
            kind: center.entity.kind(),
            metrics: center.entity.metrics(),
            scale,
        }
    }

    /// Score a batch on the bounded pool. Results keep submission order;
    /// failed candidates are dropped with a warning.
    async fn score_batch(
        &self,
        center: &Center,
        find: EntityKind,
        batch: Vec<Candidate>,
    ) -> Vec<ScoredCandidate> {
        let outcomes: Vec<(Candidate, Result<Option<ScoredCandidate>>)> = stream::iter(batch)
            .map(|candidate| async move {
                let outcome = self.score(center, find, &candidate).await;
                (candidate, outcome)
            })
            .buffered(self.config.workers.max(1))
            .collect()
            .await;

        outcomes
            .into_iter()
            .filter_map(|(candidate, outcome)| match outcome {
                Ok(scored) => scored,
                Err(e) => {
                    warn!(candidate = %candidate.id, error = %e, "dropping candidate");
                    metrics::counter!(telemetry::CANDIDATES_DROPPED_TOTAL).increment(1);
                    None
                }
            })
            .collect()
    }

    /// Score one candidate. `Ok(None)` when the candidate is filtered out
    /// (user candidates with zero similarity).
    async fn score(
        &self,
        center: &Center,
        find: EntityKind,
        candidate: &Candidate,
    ) -> Result<Option<ScoredCandidate>> {
        let unavailable = || HuginnError::CandidateUnavailable(candidate.id.clone());

        match find {
            EntityKind::User => {
                let user = self
                    .gateway
                    .fetch_user(&candidate.id)
                    .await
                    .ok_or_else(unavailable)?;
                let repos = self.gateway.fetch_user_repos(&user.login).await;
                let similarity = match &center.entity {
                    Entity::User(_) => similarity::user_user(&center.repos, &repos),
                    Entity::Repo(center_repo) => similarity::user_repo(&repos, center_repo),
                };
                if similarity <= 0.0 {
                    return Ok(None);
                }
                // profile and repositories are cached by now
                let scale = self.scale.user_scale(&user.login).await;
                Ok(Some(ScoredCandidate {
                    similarity,
                    metrics: EntityMetrics::User(user.metrics()),
                    scale,
                    id: user.login,
                }))
            }
            EntityKind::Repo => {
                let repo = self
                    .gateway
                    .fetch_repo_or(&candidate.id, candidate.repo.as_ref())
                    .await
                    .ok_or_else(unavailable)?;
                let similarity = match &center.entity {
                    Entity::User(_) => similarity::user_repo(&center.repos, &repo),
                    Entity::Repo(center_repo) => similarity::repo_repo(center_repo, &repo),
                };
                Ok(Some(ScoredCandidate {
                    similarity: similarity.max(REPO_SIMILARITY_FLOOR),
                    metrics: EntityMetrics::Repo(repo.metrics()),
                    scale: self.scale.repo_scale(&repo).await,
                    id: repo.full_name,
                }))
            }
        }
    }
}

/// Keep candidates not seen before, recording them as seen.
fn unseen(batch: Vec<Candidate>, seen: &mut HashSet<String>) -> Vec<Candidate> {
    batch
        .into_iter()
        .filter(|c| seen.insert(c.id.to_lowercase()))
        .collect()
}

/// Stable descending sort by similarity, then truncate.
fn sort_trim(scored: &mut Vec<ScoredCandidate>, count: usize) {
    scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    scored.truncate(count);
}
