//! Candidate sourcing.
//!
//! Each request gets a primary batch and, when that falls short, a broader
//! batch:
//!
//! | center | find | primary                               | broader                     |
//! |--------|------|---------------------------------------|-----------------------------|
//! | user   | user | followers ∪ active users (capped)     | rest of the union           |
//! | repo   | user | contributors ∪ active users (capped)  | rest of the union           |
//! | user   | repo | trending in the top owned language    | trending in any language    |
//! | repo   | repo | trending in the center's language     | trending in any language    |
//!
//! Order is stable: the primary relation first, then the fallback pool,
//! each in the order the remote API returned; duplicates keep their first
//! occurrence.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::gateway::EntityGateway;
use crate::types::{Candidate, Entity, EntityKind, OwnedRepo, Repo};

/// Default per-batch candidate cap.
pub const DEFAULT_MAX_CANDIDATES: usize = 50;

/// Produces candidate identifiers for a center entity.
#[derive(Clone)]
pub struct CandidateSource {
    gateway: Arc<EntityGateway>,
    max_candidates: usize,
}

impl CandidateSource {
    pub fn new(gateway: Arc<EntityGateway>, max_candidates: usize) -> Self {
        Self {
            gateway,
            max_candidates: max_candidates.max(1),
        }
    }

    /// First batch of candidates.
    pub async fn primary(&self, center: &Entity, find: EntityKind) -> Vec<Candidate> {
        let candidates = match find {
            EntityKind::User => {
                let pool = self.user_pool(center).await;
                pool.into_iter().take(self.max_candidates).collect()
            }
            EntityKind::Repo => {
                let language = self.preferred_language(center).await;
                let trending = self.gateway.fetch_trending_repos(language.as_deref()).await;
                self.repo_candidates(center, trending).await
            }
        };
        debug!(center = center.id(), %find, count = candidates.len(), "primary candidates");
        candidates
    }

    /// Backfill batch, used when the primary batch scored too few results.
    /// May overlap the primary batch; callers skip what they have seen.
    pub async fn broader(&self, center: &Entity, find: EntityKind) -> Vec<Candidate> {
        let candidates = match find {
            EntityKind::User => {
                let pool = self.user_pool(center).await;
                pool.into_iter().skip(self.max_candidates).collect()
            }
            EntityKind::Repo => {
                let trending = self.gateway.fetch_trending_repos(None).await;
                self.repo_candidates(center, trending).await
            }
        };
        debug!(center = center.id(), %find, count = candidates.len(), "broader candidates");
        candidates
    }

    /// The primary relation followed by the most-followed users, without
    /// the center and without duplicates.
    async fn user_pool(&self, center: &Entity) -> Vec<Candidate> {
        let related = match center {
            Entity::User(user) => self.gateway.fetch_followers(&user.login).await,
            Entity::Repo(repo) => self.gateway.fetch_contributors(&repo.full_name).await,
        };
        let active = self.gateway.fetch_active_users().await;

        let exclude = match center {
            Entity::User(user) => Some(user.login.to_lowercase()),
            Entity::Repo(_) => None,
        };
        let mut seen: HashSet<String> = exclude.into_iter().collect();
        related
            .into_iter()
            .chain(active)
            .filter(|login| seen.insert(login.to_lowercase()))
            .map(Candidate::new)
            .collect()
    }

    /// Language used to filter the primary trending search.
    async fn preferred_language(&self, center: &Entity) -> Option<String> {
        match center {
            Entity::User(user) => {
                let repos = self.gateway.fetch_user_repos(&user.login).await;
                language_preferences(&repos).into_iter().next()
            }
            Entity::Repo(repo) => repo.language.clone(),
        }
    }

    /// Trending repositories minus the center (or the center user's own
    /// repositories), capped.
    async fn repo_candidates(&self, center: &Entity, trending: Vec<Repo>) -> Vec<Candidate> {
        let center_id = center.id().to_lowercase();
        let mut seen = HashSet::new();
        trending
            .into_iter()
            .filter(|repo| match center {
                Entity::User(_) => !repo.owner().eq_ignore_ascii_case(&center_id),
                Entity::Repo(_) => repo.full_name.to_lowercase() != center_id,
            })
            .filter(|repo| seen.insert(repo.full_name.to_lowercase()))
            .take(self.max_candidates)
            .map(Candidate::from_repo)
            .collect()
    }
}

/// Up to three languages, most used first. Ties keep first-seen order.
pub fn language_preferences(repos: &[OwnedRepo]) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for language in repos.iter().filter_map(|r| r.language.as_deref()) {
        match counts.iter_mut().find(|(l, _)| *l == language) {
            Some((_, n)) => *n += 1,
            None => counts.push((language, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(3)
        .map(|(l, _)| l.to_string())
        .collect()
}
