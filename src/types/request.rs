//! Inbound recommendation requests.

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, split_full_name};
use crate::{HuginnError, Result};

/// A request for entities related to `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Kind of the center entity.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Login for users, `owner/name` for repositories.
    pub name: String,
    /// Kind of entity to recommend.
    pub find: EntityKind,
    /// Number of results wanted; the configured default when absent.
    #[serde(default)]
    pub count: Option<usize>,
}

impl RecommendRequest {
    pub fn new(kind: EntityKind, name: impl Into<String>, find: EntityKind) -> Self {
        Self {
            kind,
            name: name.into(),
            find,
            count: None,
        }
    }

    /// Build a request from the loosely typed query parameters of an outer
    /// layer (`type`, `name`, `find`, `count`).
    pub fn parse(kind: &str, name: &str, find: &str, count: Option<usize>) -> Result<Self> {
        Ok(Self {
            kind: kind.parse()?,
            name: name.to_string(),
            find: find.parse()?,
            count,
        })
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// Check the identifier shape. Runs before any remote call.
    pub fn validate(&self) -> Result<()> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(HuginnError::InvalidInput("name must not be empty".into()));
        }
        match self.kind {
            EntityKind::Repo if split_full_name(name).is_none() => {
                Err(HuginnError::InvalidInput(format!(
                    "repository name must have the form owner/name, got '{name}'"
                )))
            }
            EntityKind::User if name.contains('/') => Err(HuginnError::InvalidInput(format!(
                "user login must not contain '/', got '{name}'"
            ))),
            _ => Ok(()),
        }
    }

    /// Resolve the number of results: `default` when unset, clamped to `max`.
    pub fn effective_count(&self, default: usize, max: usize) -> Result<usize> {
        match self.count {
            Some(0) => Err(HuginnError::InvalidInput("count must be at least 1".into())),
            Some(n) => Ok(n.min(max)),
            None => Ok(default.min(max)),
        }
    }
}
