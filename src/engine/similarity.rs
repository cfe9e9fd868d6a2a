//! Weighted similarity between entities.
//!
//! Every function is pure over already fetched records and returns a value
//! in `[0, 1]`. Weights are fixed:
//!
//! | pair        | language | topics | size | description |
//! |-------------|----------|--------|------|-------------|
//! | user ↔ user | 0.4      | 0.4    | 0.2  |             |
//! | repo ↔ repo | 0.3      | 0.4    | 0.2  | 0.1         |
//! | user ↔ repo | 0.4      | 0.4    | 0.2  |             |

use std::collections::BTreeSet;

use crate::types::{OwnedRepo, Repo};

/// `|a ∩ b| / |a ∪ b|`, and 0 when either set is empty.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    shared as f64 / union as f64
}

/// `1 - |a - b| / max(a + b, 1)`.
pub fn size_similarity(a: f64, b: f64) -> f64 {
    1.0 - (a - b).abs() / (a + b).max(1.0)
}

/// Similarity of two users from their owned repositories.
pub fn user_user(a: &[OwnedRepo], b: &[OwnedRepo]) -> f64 {
    let language = jaccard(&languages(a), &languages(b));
    let topics = jaccard(&topics(a), &topics(b));
    let size = size_similarity(total_size(a), total_size(b));
    clamp_unit(0.4 * language + 0.4 * topics + 0.2 * size)
}

/// Similarity of two repositories.
pub fn repo_repo(a: &Repo, b: &Repo) -> f64 {
    let language = match (&a.language, &b.language) {
        (Some(x), Some(y)) if x == y => 1.0,
        _ => 0.0,
    };
    let topics = jaccard(&a.topic_set(), &b.topic_set());
    let size = size_similarity(a.size as f64, b.size as f64);
    let description = jaccard(&description_words(a), &description_words(b));
    clamp_unit(0.3 * language + 0.4 * topics + 0.2 * size + 0.1 * description)
}

/// Fit between a user (by owned repositories) and a repository.
///
/// The language term is the share of the user's language-tagged
/// repositories written in the repository's language. The size term
/// compares against the user's average repository size.
pub fn user_repo(user_repos: &[OwnedRepo], repo: &Repo) -> f64 {
    let tagged: Vec<&str> = user_repos
        .iter()
        .filter_map(|r| r.language.as_deref())
        .collect();
    let language = match repo.language.as_deref() {
        Some(lang) if !tagged.is_empty() => {
            tagged.iter().filter(|l| **l == lang).count() as f64 / tagged.len() as f64
        }
        _ => 0.0,
    };

    let topics = jaccard(&topics(user_repos), &repo.topic_set());

    let average = if user_repos.is_empty() {
        0.0
    } else {
        total_size(user_repos) / user_repos.len() as f64
    };
    let size = size_similarity(average, repo.size as f64);

    clamp_unit(0.4 * language + 0.4 * topics + 0.2 * size)
}

/// Clamp into `[0, 1]`; NaN becomes 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn languages(repos: &[OwnedRepo]) -> BTreeSet<&str> {
    repos.iter().filter_map(|r| r.language.as_deref()).collect()
}

fn topics(repos: &[OwnedRepo]) -> BTreeSet<&str> {
    repos
        .iter()
        .flat_map(|r| r.topics.iter().map(String::as_str))
        .collect()
}

fn total_size(repos: &[OwnedRepo]) -> f64 {
    repos.iter().map(|r| r.size as f64).sum()
}

fn description_words(repo: &Repo) -> BTreeSet<String> {
    repo.description
        .as_deref()
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}
