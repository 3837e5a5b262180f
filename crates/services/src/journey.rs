use std::sync::Arc;

use trail_core::model::{Roadmap, RoadmapNode};

use crate::catalog::RoadmapCatalog;
use crate::progress_store::ProgressStore;

/// Progress overview for one roadmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapSummary {
    pub roadmap: Roadmap,
    pub total_count: usize,
    pub completed_count: usize,
    /// Where the learner should pick up, derived from recorded progress.
    pub current_node: Option<RoadmapNode>,
}

impl RoadmapSummary {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total_count > 0 && self.completed_count >= self.total_count
    }
}

/// Combines catalog data with local progress for dashboards.
#[derive(Clone)]
pub struct JourneyService {
    catalog: Arc<dyn RoadmapCatalog>,
    store: Arc<ProgressStore>,
}

impl JourneyService {
    #[must_use]
    pub fn new(catalog: Arc<dyn RoadmapCatalog>, store: Arc<ProgressStore>) -> Self {
        Self { catalog, store }
    }

    /// One summary per catalog roadmap, in catalog order.
    ///
    /// Only nodes the catalog knows about are counted, so stale progress for
    /// removed nodes does not inflate the completed count.
    pub async fn journey(&self) -> Vec<RoadmapSummary> {
        let mut summaries = Vec::new();
        for roadmap in self.catalog.list_roadmaps().await {
            let nodes = self.catalog.list_nodes(&roadmap.id).await;
            let progress = self.store.get_progress(&roadmap.id).await;
            let completed_count = nodes
                .iter()
                .filter(|n| progress.status_of(&n.id).is_completed())
                .count();
            let current_node = trail_core::model::resume_index(&nodes, &progress)
                .and_then(|i| nodes.get(i).cloned());
            summaries.push(RoadmapSummary {
                total_count: nodes.len(),
                completed_count,
                current_node,
                roadmap,
            });
        }
        summaries
    }

    /// Resolve the stored current position against the catalog.
    ///
    /// Returns `None` if nothing was visited yet or the roadmap/node is gone.
    pub async fn resume(&self) -> Option<(Roadmap, RoadmapNode)> {
        let position = self.store.get_current_position().await?;
        let roadmap = self.catalog.get_roadmap(&position.roadmap_id).await?;
        let node = self.catalog.get_node(&position.node_id).await?;
        Some((roadmap, node))
    }
}
