use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{NodeId, RoadmapId};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("invalid progress status: {0:?} (expected not_started, in_progress or completed)")]
    InvalidStatus(String),
}

//
// ─── STATUS ───────────────────────────────────────────────────────────────────
//

/// Completion state of a single node.
///
/// Any status may move to any other; there is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl ProgressStatus {
    pub const ALL: [ProgressStatus; 3] = [
        ProgressStatus::NotStarted,
        ProgressStatus::InProgress,
        ProgressStatus::Completed,
    ];

    /// Wire/storage form of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::InProgress => "in_progress",
            ProgressStatus::Completed => "completed",
        }
    }

    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, ProgressStatus::Completed)
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStatus {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(ProgressStatus::NotStarted),
            "in_progress" => Ok(ProgressStatus::InProgress),
            "completed" => Ok(ProgressStatus::Completed),
            other => Err(ProgressError::InvalidStatus(other.to_owned())),
        }
    }
}

//
// ─── RECORDS ──────────────────────────────────────────────────────────────────
//

/// Per-node statuses for one roadmap. A missing node means `NotStarted`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoadmapProgress(BTreeMap<NodeId, ProgressStatus>);

impl RoadmapProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status_of(&self, node_id: &NodeId) -> ProgressStatus {
        self.0.get(node_id).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, node_id: &NodeId) -> Option<ProgressStatus> {
        self.0.get(node_id).copied()
    }

    /// Overwrites the status of a node, returning the previous one if any.
    pub fn set(&mut self, node_id: NodeId, status: ProgressStatus) -> Option<ProgressStatus> {
        self.0.insert(node_id, status)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.0.values().filter(|s| s.is_completed()).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, ProgressStatus)> {
        self.0.iter().map(|(id, status)| (id, *status))
    }
}

impl FromIterator<(NodeId, ProgressStatus)> for RoadmapProgress {
    fn from_iter<T: IntoIterator<Item = (NodeId, ProgressStatus)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// All roadmaps' progress, as persisted under a single storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressRecord(BTreeMap<RoadmapId, RoadmapProgress>);

impl ProgressRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn roadmap(&self, roadmap_id: &RoadmapId) -> Option<&RoadmapProgress> {
        self.0.get(roadmap_id)
    }

    /// Sets a node's status, creating the roadmap entry when absent.
    pub fn set_status(&mut self, roadmap_id: RoadmapId, node_id: NodeId, status: ProgressStatus) {
        self.0.entry(roadmap_id).or_default().set(node_id, status);
    }

    pub fn insert_roadmap(&mut self, roadmap_id: RoadmapId, progress: RoadmapProgress) {
        self.0.insert(roadmap_id, progress);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn roadmap_ids(&self) -> impl Iterator<Item = &RoadmapId> {
        self.0.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(raw: &str) -> NodeId {
        NodeId::new(raw).unwrap()
    }

    fn roadmap(raw: &str) -> RoadmapId {
        RoadmapId::new(raw).unwrap()
    }

    #[test]
    fn parses_every_wire_value() {
        for status in ProgressStatus::ALL {
            assert_eq!(status.as_str().parse::<ProgressStatus>(), Ok(status));
        }
    }

    #[test]
    fn rejects_unknown_status() {
        let err = "bogus-status".parse::<ProgressStatus>().unwrap_err();
        assert_eq!(err, ProgressError::InvalidStatus("bogus-status".into()));
        assert!("Completed".parse::<ProgressStatus>().is_err());
    }

    #[test]
    fn missing_node_is_not_started() {
        let progress = RoadmapProgress::new();
        assert_eq!(progress.status_of(&node("git-1")), ProgressStatus::NotStarted);
        assert_eq!(progress.get(&node("git-1")), None);
    }

    #[test]
    fn completed_count_ignores_other_statuses() {
        let progress: RoadmapProgress = [
            (node("a"), ProgressStatus::Completed),
            (node("b"), ProgressStatus::InProgress),
            (node("c"), ProgressStatus::Completed),
            (node("d"), ProgressStatus::NotStarted),
        ]
        .into_iter()
        .collect();
        assert_eq!(progress.completed_count(), 2);
    }

    #[test]
    fn set_status_keeps_roadmaps_apart() {
        let mut record = ProgressRecord::new();
        record.set_status(roadmap("A"), node("n1"), ProgressStatus::Completed);
        assert!(record.roadmap(&roadmap("B")).is_none());
        assert_eq!(
            record.roadmap(&roadmap("A")).unwrap().status_of(&node("n1")),
            ProgressStatus::Completed
        );
    }

    #[test]
    fn serializes_as_nested_string_maps() {
        let mut record = ProgressRecord::new();
        record.set_status(roadmap("git-github"), node("git-1"), ProgressStatus::InProgress);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"git-github":{"git-1":"in_progress"}}"#);
    }
}
