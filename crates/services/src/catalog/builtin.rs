use async_trait::async_trait;

use trail_core::model::{NodeId, Roadmap, RoadmapId, RoadmapNode};

use super::{RoadmapCatalog, sort_nodes};

pub const GIT_ROADMAP_ID: &str = "git-github";
pub const GENAI_ROADMAP_ID: &str = "genai-prompting";

/// Ids older links used for the Git roadmap.
const GIT_ALIASES: [&str; 2] = ["git-fundamentals", "1"];

/// (id, title, short summary, estimated time)
const GIT_NODES: [(&str, &str, &str, &str); 13] = [
    ("git-1", "What is Git?", "Understanding version control basics", "10 min"),
    ("git-2", "Installing Git", "Getting Git on your computer", "5 min"),
    ("git-3", "Creating a Repository", "Starting your first Git project", "5 min"),
    ("git-4", "Checking Status", "Seeing what's happening in your repo", "5 min"),
    ("git-5", "Staging Files", "Selecting what to include in your save", "5 min"),
    ("git-6", "Committing Changes", "Saving a snapshot of your work", "8 min"),
    ("git-7", "Viewing History", "Exploring your project's timeline", "5 min"),
    ("git-8", "Branching Basics", "Working on features safely", "10 min"),
    ("git-9", "Merging Branches", "Combining your work", "10 min"),
    ("git-10", "GitHub Introduction", "Sharing and backing up your code", "8 min"),
    ("git-11", "Connecting Local Repo to GitHub", "Linking your computer to the cloud", "10 min"),
    ("git-12", "Pushing & Pulling", "Syncing with GitHub", "8 min"),
    ("git-13", "Basic Collaboration Workflow", "Working with a team", "15 min"),
];

const GENAI_NODES: [(&str, &str); 27] = [
    ("genai-1-1", "What is Generative AI?"),
    ("genai-1-2", "The AI Landscape (2024–2025)"),
    ("genai-1-3", "Your First AI Conversation"),
    ("genai-1-4", "Understanding AI Limitations"),
    ("genai-2-1", "What is Prompt Engineering?"),
    ("genai-2-2", "Anatomy of a Great Prompt"),
    ("genai-2-3", "Zero-Shot vs Few-Shot Prompting"),
    ("genai-2-4", "Role Prompting"),
    ("genai-2-5", "Instruction Clarity & Formatting"),
    ("genai-2-6", "Common Prompting Mistakes"),
    ("genai-3-1", "Chain-of-Thought Prompting"),
    ("genai-3-2", "System Prompts & Context Setting"),
    ("genai-3-3", "Context Windows & Token Limits"),
    ("genai-3-4", "Iterative Prompting & Refinement"),
    ("genai-3-5", "Prompt Templates & Libraries"),
    ("genai-3-6", "Handling Hallucinations"),
    ("genai-4-1", "Writing & Content Creation Prompts"),
    ("genai-4-2", "Coding Assistant Prompts"),
    ("genai-4-3", "Research & Analysis Prompts"),
    ("genai-4-4", "Business & Strategy Prompts"),
    ("genai-4-5", "Prompt Safety & Ethics"),
    ("genai-5-1", "Prompting with APIs"),
    ("genai-5-2", "RAG Basics (Retrieval-Augmented Generation)"),
    ("genai-5-3", "Tool Use & Function Calling"),
    ("genai-5-4", "AI Agents (Introduction)"),
    ("genai-5-5", "Prompt Evaluation & Testing"),
    ("genai-5-6", "When Prompting Fails"),
];

/// The two roadmaps that ship with the app.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog {
    roadmaps: Vec<Roadmap>,
    nodes: Vec<RoadmapNode>,
}

impl BuiltinCatalog {
    /// # Panics
    ///
    /// Panics if a builtin id is blank, which the tables above rule out.
    #[must_use]
    pub fn new() -> Self {
        let git = roadmap_id(GIT_ROADMAP_ID);
        let genai = roadmap_id(GENAI_ROADMAP_ID);

        let roadmaps = vec![
            Roadmap {
                id: git.clone(),
                title: "Git & GitHub".into(),
                description: Some(
                    "Master version control from first commit to team collaboration".into(),
                ),
                created_at: None,
            },
            Roadmap {
                id: genai.clone(),
                title: "Generative AI & Prompt Engineering".into(),
                description: Some(
                    "Master AI tools from basics to advanced prompting techniques.".into(),
                ),
                created_at: None,
            },
        ];

        let git_nodes = GIT_NODES
            .iter()
            .zip(1u32..)
            .map(|(&(id, title, summary, time), order_index)| RoadmapNode {
                id: node_id(id),
                roadmap_id: git.clone(),
                title: title.into(),
                short_summary: Some(summary.into()),
                order_index,
                estimated_time: Some(time.into()),
            });
        let genai_nodes = GENAI_NODES
            .iter()
            .zip(1u32..)
            .map(|(&(id, title), order_index)| RoadmapNode {
                id: node_id(id),
                roadmap_id: genai.clone(),
                title: title.into(),
                short_summary: None,
                order_index,
                estimated_time: None,
            });

        Self {
            roadmaps,
            nodes: git_nodes.chain(genai_nodes).collect(),
        }
    }

    /// Maps legacy aliases onto the canonical roadmap id.
    #[must_use]
    pub fn canonical_roadmap_id(id: &RoadmapId) -> RoadmapId {
        if GIT_ALIASES.contains(&id.as_str()) {
            roadmap_id(GIT_ROADMAP_ID)
        } else {
            id.clone()
        }
    }

    fn nodes_of(&self, roadmap_id: &RoadmapId) -> Vec<RoadmapNode> {
        let roadmap_id = Self::canonical_roadmap_id(roadmap_id);
        sort_nodes(
            self.nodes
                .iter()
                .filter(|n| n.roadmap_id == roadmap_id)
                .cloned()
                .collect(),
        )
    }

    /// `node-N` was the 1-based position of a Git node in early links.
    fn legacy_node(&self, id: &NodeId) -> Option<RoadmapNode> {
        let index: usize = id.as_str().strip_prefix("node-")?.parse().ok()?;
        let git = self.nodes_of(&roadmap_id(GIT_ROADMAP_ID));
        index.checked_sub(1).and_then(|i| git.get(i).cloned())
    }
}

impl Default for BuiltinCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoadmapCatalog for BuiltinCatalog {
    async fn list_roadmaps(&self) -> Vec<Roadmap> {
        self.roadmaps.clone()
    }

    async fn get_roadmap(&self, id: &RoadmapId) -> Option<Roadmap> {
        let id = Self::canonical_roadmap_id(id);
        self.roadmaps.iter().find(|r| r.id == id).cloned()
    }

    async fn list_nodes(&self, roadmap_id: &RoadmapId) -> Vec<RoadmapNode> {
        self.nodes_of(roadmap_id)
    }

    async fn get_node(&self, id: &NodeId) -> Option<RoadmapNode> {
        self.nodes
            .iter()
            .find(|n| &n.id == id)
            .cloned()
            .or_else(|| self.legacy_node(id))
    }
}

fn roadmap_id(raw: &str) -> RoadmapId {
    RoadmapId::new(raw).expect("builtin roadmap ids are non-empty")
}

fn node_id(raw: &str) -> NodeId {
    NodeId::new(raw).expect("builtin node ids are non-empty")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ships_two_roadmaps() {
        let catalog = BuiltinCatalog::new();
        let ids: Vec<String> = catalog
            .list_roadmaps()
            .await
            .into_iter()
            .map(|r| r.id.to_string())
            .collect();
        assert_eq!(ids, vec![GIT_ROADMAP_ID, GENAI_ROADMAP_ID]);
    }

    #[tokio::test]
    async fn nodes_come_back_in_order() {
        let catalog = BuiltinCatalog::new();
        let nodes = catalog.list_nodes(&roadmap_id(GENAI_ROADMAP_ID)).await;
        assert_eq!(nodes.len(), 27);
        assert!(nodes.windows(2).all(|w| w[0].order_index < w[1].order_index));
        assert_eq!(nodes[0].id.as_str(), "genai-1-1");
    }

    #[tokio::test]
    async fn legacy_roadmap_alias_resolves_to_git() {
        let catalog = BuiltinCatalog::new();
        let roadmap = catalog.get_roadmap(&roadmap_id("git-fundamentals")).await;
        assert_eq!(roadmap.unwrap().id.as_str(), GIT_ROADMAP_ID);
        assert_eq!(catalog.list_nodes(&roadmap_id("1")).await.len(), 13);
    }

    #[tokio::test]
    async fn legacy_node_ids_map_to_git_positions() {
        let catalog = BuiltinCatalog::new();
        let node = catalog.get_node(&node_id("node-3")).await.unwrap();
        assert_eq!(node.id.as_str(), "git-3");
        assert!(catalog.get_node(&node_id("node-0")).await.is_none());
        assert!(catalog.get_node(&node_id("node-99")).await.is_none());
    }

    #[tokio::test]
    async fn unknown_ids_are_absent() {
        let catalog = BuiltinCatalog::new();
        assert!(catalog.get_roadmap(&roadmap_id("rust")).await.is_none());
        assert!(catalog.list_nodes(&roadmap_id("rust")).await.is_empty());
        assert!(catalog.get_node(&node_id("rust-1")).await.is_none());
    }
}
