//! The recommendation engine: candidate sourcing, similarity scoring, scale
//! estimation and the orchestrator that ties them together.

mod candidates;
mod recommender;
pub mod scale;
pub mod similarity;

pub use candidates::{CandidateSource, DEFAULT_MAX_CANDIDATES, language_preferences};
pub use recommender::{RecommendConfig, Recommender};
pub use scale::ScaleEstimator;
