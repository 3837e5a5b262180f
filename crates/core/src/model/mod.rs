mod ids;
mod note;
mod position;
mod progress;
mod roadmap;

pub use ids::{IdError, NodeId, RoadmapId};
pub use note::{NOTE_CONTENT_MAX_CHARS, Note, NoteError, NoteRecord};
pub use position::{CurrentPosition, PositionRecord, TrailPosition};
pub use progress::{ProgressError, ProgressRecord, ProgressStatus, RoadmapProgress};
pub use roadmap::{Roadmap, RoadmapNode, resume_index};
