//! Roadmap and node descriptors consumed by the progress views.

mod builtin;
mod http;

use async_trait::async_trait;

use trail_core::model::{NodeId, Roadmap, RoadmapId, RoadmapNode};

pub use builtin::BuiltinCatalog;
pub use http::HttpCatalog;

/// Read-only source of roadmaps and their nodes.
///
/// Implementations never fail outright: unknown ids read as absent and remote
/// failures degrade to whatever fallback the implementation has.
#[async_trait]
pub trait RoadmapCatalog: Send + Sync {
    async fn list_roadmaps(&self) -> Vec<Roadmap>;

    async fn get_roadmap(&self, id: &RoadmapId) -> Option<Roadmap>;

    /// Nodes of a roadmap, sorted by `order_index`.
    async fn list_nodes(&self, roadmap_id: &RoadmapId) -> Vec<RoadmapNode>;

    async fn get_node(&self, id: &NodeId) -> Option<RoadmapNode>;
}

pub(crate) fn sort_nodes(mut nodes: Vec<RoadmapNode>) -> Vec<RoadmapNode> {
    nodes.sort_by_key(|n| n.order_index);
    nodes
}
