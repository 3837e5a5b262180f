use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{NodeId, RoadmapId};
use crate::model::progress::RoadmapProgress;

/// A named learning path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roadmap {
    pub id: RoadmapId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A single topic/step within a roadmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapNode {
    pub id: NodeId,
    pub roadmap_id: RoadmapId,
    pub title: String,
    #[serde(default)]
    pub short_summary: Option<String>,
    pub order_index: u32,
    #[serde(default)]
    pub estimated_time: Option<String>,
}

/// Index (in `order_index` order) of the node the learner should resume at.
///
/// That is the first node not yet completed. If everything is completed the
/// last node is returned; an empty roadmap has no resume point.
#[must_use]
pub fn resume_index(nodes: &[RoadmapNode], progress: &RoadmapProgress) -> Option<usize> {
    if nodes.is_empty() {
        return None;
    }
    let mut ordered: Vec<&RoadmapNode> = nodes.iter().collect();
    ordered.sort_by_key(|n| n.order_index);

    let first_open = ordered
        .iter()
        .position(|n| !progress.status_of(&n.id).is_completed());
    Some(first_open.unwrap_or(ordered.len() - 1))
}
