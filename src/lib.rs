//! Huginn - related-account and related-repository recommendations for GitHub
//!
//! Given a GitHub user or repository, Huginn finds related users or
//! repositories, ranks them by a weighted similarity score and attaches a
//! scale estimate to each one for sizing graph nodes.
//!
//! # Example
//!
//! ```rust,no_run
//! use huginn::{EntityKind, Huginn, RecommendRequest};
//!
//! #[tokio::main]
//! async fn main() -> huginn::Result<()> {
//!     let huginn = Huginn::builder()
//!         .github_token("ghp_your_token")
//!         .build()?;
//!
//!     let request = RecommendRequest::new(EntityKind::Repo, "rust-lang/rust", EntityKind::Repo);
//!     let result = huginn.recommend(&request).await;
//!
//!     if let Some(graph) = result.to_graph(EntityKind::Repo) {
//!         println!("{}", serde_json::to_string_pretty(&graph).unwrap());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Layers
//!
//! - [`providers`]: HTTP clients for GitHub, OpenDigger and the analysis
//!   service, behind narrow traits.
//! - [`gateway`]: the memoizing, retrying [`EntityGateway`] and the
//!   [`Huginn`] facade.
//! - [`engine`]: candidate sourcing, similarity, scale and orchestration.

pub mod cache;
#[cfg(feature = "cli")]
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod providers;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use cache::{CacheConfig, EntityCache};
pub use engine::{RecommendConfig, Recommender};
pub use error::{HuginnError, Result};
pub use gateway::{EntityGateway, Huginn, HuginnBuilder};
pub use providers::{Backoff, RetryConfig};
pub use version::{PKG_VERSION, version_string};

pub use types::{
    AnalysisResult, Candidate, CenterEntity, Entity, EntityKind, EntityMetrics, GraphCenter,
    GraphData, GraphLink, GraphNode, HealthMetric, OwnedRepo, RecommendRequest,
    RecommendationResult, Repo, RepoMetrics, ScoredCandidate, Status, User, UserMetrics,
};
