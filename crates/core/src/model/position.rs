use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{NodeId, RoadmapId};

/// The last node the learner viewed, used to resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPosition {
    pub roadmap_id: RoadmapId,
    pub node_id: NodeId,
}

impl CurrentPosition {
    #[must_use]
    pub fn new(roadmap_id: RoadmapId, node_id: NodeId) -> Self {
        Self {
            roadmap_id,
            node_id,
        }
    }
}

/// Resume point within a single roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailPosition {
    node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scroll_progress: Option<f32>,
    last_visit: DateTime<Utc>,
}

impl TrailPosition {
    /// Scroll progress is clamped to `0.0..=1.0`; NaN and infinities are dropped.
    #[must_use]
    pub fn new(node_id: NodeId, scroll_progress: Option<f32>, last_visit: DateTime<Utc>) -> Self {
        Self {
            node_id,
            scroll_progress: scroll_progress
                .filter(|p| p.is_finite())
                .map(|p| p.clamp(0.0, 1.0)),
            last_visit,
        }
    }

    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    #[must_use]
    pub fn scroll_progress(&self) -> Option<f32> {
        self.scroll_progress
    }

    #[must_use]
    pub fn last_visit(&self) -> DateTime<Utc> {
        self.last_visit
    }
}

/// Persisted shape of the position record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRecord {
    #[serde(default)]
    pub current: Option<CurrentPosition>,
    #[serde(default)]
    pub trails: BTreeMap<RoadmapId, TrailPosition>,
}

impl PositionRecord {
    /// Moves the global pointer and the roadmap's resume point together.
    pub fn visit(&mut self, roadmap_id: RoadmapId, trail: TrailPosition) {
        self.current = Some(CurrentPosition::new(
            roadmap_id.clone(),
            trail.node_id.clone(),
        ));
        self.trails.insert(roadmap_id, trail);
    }

    #[must_use]
    pub fn trail(&self, roadmap_id: &RoadmapId) -> Option<&TrailPosition> {
        self.trails.get(roadmap_id)
    }
}
