//! Public types for the Huginn API.

mod analysis;
mod entity;
mod graph;
mod request;
mod result;

pub use analysis::AnalysisResult;
pub use entity::{
    Entity, EntityKind, EntityMetrics, HealthMetric, OwnedRepo, Repo, RepoMetrics, User,
    UserMetrics, split_full_name,
};
pub use graph::{GraphCenter, GraphData, GraphLink, GraphNode};
pub use request::RecommendRequest;
pub use result::{Candidate, CenterEntity, RecommendationResult, ScoredCandidate, Status};
