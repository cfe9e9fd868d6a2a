//! Scale estimates for sizing nodes.
//!
//! Both formulas squash raw popularity into `[20, 40]`. Non-finite
//! intermediates fall back to the minimum.

use std::sync::Arc;

use futures_util::future::join;

use crate::gateway::EntityGateway;
use crate::types::{HealthMetric, OwnedRepo, Repo, RepoMetrics, User};

/// Smallest scale; also the value for missing entities.
pub const MIN_SCALE: f64 = 20.0;
/// Largest scale.
pub const MAX_SCALE: f64 = 40.0;

const USER_RAW_CAP: f64 = 10_000.0;
const REPO_RAW_CAP: f64 = 10.0;

/// Scale of a user from profile counters and owned repository sizes.
///
/// `sqrt(max(1, followers + following + public_repos) * (total_size + 1))`,
/// capped at 10,000 and mapped linearly onto `[20, 40]`.
pub fn user_scale(user: Option<&User>, repos: &[OwnedRepo]) -> f64 {
    let Some(user) = user else {
        return MIN_SCALE;
    };
    let base = user
        .followers
        .saturating_add(user.following)
        .saturating_add(user.public_repos)
        .max(1) as f64;
    let total: f64 = repos.iter().map(|r| r.size as f64).sum();
    let raw = (base * (total + 1.0)).sqrt();
    normalize(raw, USER_RAW_CAP)
}

/// Scale of a repository from its counters and health metrics.
///
/// Size is reported in kilobytes and enters as `ln(size / 1000 + 1)`.
pub fn repo_scale_from(metrics: &RepoMetrics, openrank: f64, activity: f64) -> f64 {
    let ln1p = |v: f64| (v + 1.0).ln();
    let raw = 0.3 * ln1p(metrics.stars as f64)
        + 0.2 * ln1p(metrics.forks as f64)
        + 0.1 * ln1p(metrics.watchers as f64)
        + 0.2 * openrank
        + 0.1 * activity
        + 0.1 * ln1p(metrics.size as f64 / 1000.0);
    normalize(raw, REPO_RAW_CAP)
}

/// `20 + 20 * min(raw, cap) / cap`, clamped to `[20, 40]`.
fn normalize(raw: f64, cap: f64) -> f64 {
    if !raw.is_finite() {
        return MIN_SCALE;
    }
    let scaled = MIN_SCALE + (MAX_SCALE - MIN_SCALE) * raw.min(cap) / cap;
    scaled.clamp(MIN_SCALE, MAX_SCALE)
}

/// Scale estimates that need remote data, fetched through the gateway.
#[derive(Clone)]
pub struct ScaleEstimator {
    gateway: Arc<EntityGateway>,
}

impl ScaleEstimator {
    pub fn new(gateway: Arc<EntityGateway>) -> Self {
        Self { gateway }
    }

    /// Scale of a user by login; missing users get the minimum.
    pub async fn user_scale(&self, login: &str) -> f64 {
        let Some(user) = self.gateway.fetch_user(login).await else {
            return MIN_SCALE;
        };
        let repos = self.gateway.fetch_user_repos(login).await;
        user_scale(Some(&user), &repos)
    }

    /// Scale of a fetched repository. Unavailable health metrics count as 0.
    pub async fn repo_scale(&self, repo: &Repo) -> f64 {
        let (openrank, activity) = join(
            self.gateway
                .fetch_health_metric(&repo.full_name, HealthMetric::OpenRank),
            self.gateway
                .fetch_health_metric(&repo.full_name, HealthMetric::Activity),
        )
        .await;
        repo_scale_from(
            &repo.metrics(),
            openrank.unwrap_or(0.0),
            activity.unwrap_or(0.0),
        )
    }
}
