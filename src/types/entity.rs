//! Entities fetched from the hosting platform.
//!
//! Field names follow the GitHub REST payloads so the records deserialize
//! straight from API responses. Required fields are non-optional: a payload
//! missing any of them fails to deserialize and is treated as a failed fetch.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{HuginnError, Result};

/// The two kinds of entity the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Repo,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Repo => "repo",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = HuginnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "user" => Ok(EntityKind::User),
            "repo" => Ok(EntityKind::Repo),
            other => Err(HuginnError::InvalidInput(format!(
                "entity kind must be 'user' or 'repo', got '{other}'"
            ))),
        }
    }
}

/// A user profile (`GET /users/{login}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
}

impl User {
    pub fn metrics(&self) -> UserMetrics {
        UserMetrics {
            followers: self.followers,
            following: self.following,
            public_repos: self.public_repos,
        }
    }
}

/// One entry of a user's repository list (`GET /users/{login}/repos`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedRepo {
    pub full_name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Size in kilobytes, as reported by the API.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub fork: bool,
}

/// Repository metadata (`GET /repos/{owner}/{name}` or a search hit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    pub full_name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
    #[serde(rename = "forks_count")]
    pub forks: u64,
    #[serde(rename = "watchers_count")]
    pub watchers: u64,
    pub size: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fork: bool,
}

impl Repo {
    /// Owner part of `owner/name`.
    pub fn owner(&self) -> &str {
        self.full_name
            .split_once('/')
            .map_or(self.full_name.as_str(), |(owner, _)| owner)
    }

    pub fn topic_set(&self) -> BTreeSet<&str> {
        self.topics.iter().map(String::as_str).collect()
    }

    pub fn metrics(&self) -> RepoMetrics {
        RepoMetrics {
            stars: self.stars,
            forks: self.forks,
            watchers: self.watchers,
            size: self.size,
        }
    }
}

/// A center or candidate entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    User(User),
    Repo(Repo),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Entity::User(user) => &user.login,
            Entity::Repo(repo) => &repo.full_name,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::User(_) => EntityKind::User,
            Entity::Repo(_) => EntityKind::Repo,
        }
    }

    pub fn metrics(&self) -> EntityMetrics {
        match self {
            Entity::User(user) => EntityMetrics::User(user.metrics()),
            Entity::Repo(repo) => EntityMetrics::Repo(repo.metrics()),
        }
    }
}

/// Profile counters of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetrics {
    pub followers: u64,
    pub following: u64,
    pub public_repos: u64,
}

/// Popularity counters of a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetrics {
    pub stars: u64,
    pub forks: u64,
    pub watchers: u64,
    pub size: u64,
}

/// Metrics snapshot, tagged by entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntityMetrics {
    User(UserMetrics),
    Repo(RepoMetrics),
}

/// Health-metric series published per repository by OpenDigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthMetric {
    OpenRank,
    Activity,
}

impl HealthMetric {
    /// File name of the series under the repository's directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            HealthMetric::OpenRank => "openrank.json",
            HealthMetric::Activity => "activity.json",
        }
    }
}

/// Split `owner/name`; `None` unless there is exactly one separator with
/// non-empty parts on both sides.
pub fn split_full_name(name: &str) -> Option<(&str, &str)> {
    let (owner, repo) = name.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo))
}
