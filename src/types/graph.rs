//! Node/link view of a recommendation result, the shape graph front ends
//! consume.

use serde::{Deserialize, Serialize};

use super::entity::{EntityKind, EntityMetrics};
use super::result::RecommendationResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub metrics: EntityMetrics,
    pub similarity: f64,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphCenter {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub center: GraphCenter,
}

impl RecommendationResult {
    /// Star graph around the center: one node per entity, one link per
    /// recommendation weighted by similarity. `None` without a center.
    pub fn to_graph(&self, find: EntityKind) -> Option<GraphData> {
        let center = self.center.as_ref()?;

        let mut nodes = Vec::with_capacity(self.recommendations.len() + 1);
        let mut links = Vec::with_capacity(self.recommendations.len());

        nodes.push(GraphNode {
            id: center.id.clone(),
            kind: center.kind,
            metrics: center.metrics,
            similarity: 1.0,
            scale: center.scale,
        });

        for rec in &self.recommendations {
            nodes.push(GraphNode {
                id: rec.id.clone(),
                kind: find,
                metrics: rec.metrics,
                similarity: rec.similarity,
                scale: rec.scale,
            });
            links.push(GraphLink {
                source: center.id.clone(),
                target: rec.id.clone(),
                value: rec.similarity,
            });
        }

        Some(GraphData {
            nodes,
            links,
            center: GraphCenter {
                id: center.id.clone(),
                kind: center.kind,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CenterEntity, RepoMetrics, ScoredCandidate, UserMetrics};

    #[test]
    fn graph_links_every_recommendation_to_center() {
        let center = CenterEntity {
            id: "alice".into(),
            kind: EntityKind::User,
            metrics: EntityMetrics::User(UserMetrics::default()),
            scale: 21.0,
        };
        let recs = vec![
            ScoredCandidate {
                id: "a/x".into(),
                similarity: 0.8,
                metrics: EntityMetrics::Repo(RepoMetrics::default()),
                scale: 30.0,
            },
            ScoredCandidate {
                id: "b/y".into(),
                similarity: 0.4,
                metrics: EntityMetrics::Repo(RepoMetrics::default()),
                scale: 25.0,
            },
        ];
        let graph = RecommendationResult::success(center, recs)
            .to_graph(EntityKind::Repo)
            .unwrap();

        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.nodes[0].similarity, 1.0);
        assert_eq!(graph.links.len(), 2);
        assert!(graph.links.iter().all(|l| l.source == "alice"));
        assert_eq!(graph.links[1].value, 0.4);
        assert_eq!(graph.center.kind, EntityKind::User);
    }

    #[test]
    fn error_without_center_has_no_graph() {
        assert!(
            RecommendationResult::error("nope")
                .to_graph(EntityKind::User)
                .is_none()
        );
    }
}
