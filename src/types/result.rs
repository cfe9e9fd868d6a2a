//! Recommendation results.

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, EntityMetrics, Repo};

/// Outcome of a request. Errors are reported as data, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// An identifier proposed for scoring, not yet evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: String,
    /// Repository record carried from the search that proposed it. Used
    /// for scoring when the cache holds no entry for `id`.
    pub repo: Option<Repo>,
}

impl Candidate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            repo: None,
        }
    }

    pub fn from_repo(repo: Repo) -> Self {
        Self {
            id: repo.full_name.clone(),
            repo: Some(repo),
        }
    }
}

/// The entity recommendations are computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CenterEntity {
    pub id: String,
    pub kind: EntityKind,
    pub metrics: EntityMetrics,
    /// Scale in `[20, 40]`.
    pub scale: f64,
}

/// A scored and enriched candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: String,
    /// Similarity to the center in `[0, 1]`.
    pub similarity: f64,
    pub metrics: EntityMetrics,
    /// Scale in `[20, 40]`.
    pub scale: f64,
}

/// Ranked recommendations for one center entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub center: Option<CenterEntity>,
    /// Descending by similarity, unique ids, never the center itself.
    pub recommendations: Vec<ScoredCandidate>,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecommendationResult {
    pub fn success(center: CenterEntity, recommendations: Vec<ScoredCandidate>) -> Self {
        Self {
            center: Some(center),
            recommendations,
            status: Status::Success,
            message: None,
        }
    }

    /// An error result with no recommendations.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            center: None,
            recommendations: Vec::new(),
            status: Status::Error,
            message: Some(message.into()),
        }
    }

    /// Attach the center to an error result so callers still see its metrics.
    pub fn with_center(mut self, center: CenterEntity) -> Self {
        self.center = Some(center);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
