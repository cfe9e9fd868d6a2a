//! Remote sources and the plumbing shared by their clients.
//!
//! - [`GitHubClient`]: entity data from the GitHub REST API.
//! - [`OpenDiggerClient`]: health metrics from OpenDigger.
//! - [`ChatAnalyzer`]: relationship analysis over a chat-completions API.
//!
//! Clients are thin: they map HTTP onto [`HuginnError`](crate::HuginnError)
//! and leave caching and retries to the gateway.

pub mod analyzer;
pub mod github;
pub mod http;
pub mod opendigger;
pub mod retry;
pub mod traits;

pub use analyzer::ChatAnalyzer;
pub use github::GitHubClient;
pub use opendigger::OpenDiggerClient;
pub use retry::{Backoff, RetryConfig, with_retry};
pub use traits::{EntitySource, HealthMetricsSource, RelationAnalyzer, TrendingQuery};
