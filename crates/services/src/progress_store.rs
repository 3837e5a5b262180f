use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, warn};

use storage::keys::{NOTES_KEY, POSITION_KEY, PROGRESS_KEY};
use storage::repository::{KeyValueStore, StorageError};
use trail_core::model::{
    CurrentPosition, NodeId, Note, NoteRecord, PositionRecord, ProgressRecord, ProgressStatus,
    RoadmapId, RoadmapNode, RoadmapProgress, TrailPosition, resume_index,
};

use crate::Clock;
use crate::error::ProgressStoreError;
use crate::events::{ProgressEvents, StoreChanged};
use crate::records;

/// Outcome of writing a record through to storage.
///
/// `Unpersisted` is a warning, not a failure: the change is already visible
/// through the store for the rest of the session.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Persisted,
    Unpersisted(StorageError),
}

impl SaveStatus {
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        matches!(self, SaveStatus::Persisted)
    }

    #[must_use]
    pub fn warning(&self) -> Option<&StorageError> {
        match self {
            SaveStatus::Persisted => None,
            SaveStatus::Unpersisted(err) => Some(err),
        }
    }

    fn and(self, other: SaveStatus) -> SaveStatus {
        match self {
            SaveStatus::Persisted => other,
            unpersisted @ SaveStatus::Unpersisted(_) => unpersisted,
        }
    }
}

/// A record as loaded from storage.
///
/// `read_error` is set when the stored copy could not be read. The record then
/// only holds this session's changes and must not replace what is stored.
struct Cached<T> {
    record: T,
    read_error: Option<StorageError>,
}

impl<T: Default> Cached<T> {
    fn fresh() -> Self {
        Self {
            record: T::default(),
            read_error: None,
        }
    }
}

/// Local learner state: per-node progress, notes and the resume position.
///
/// Each record is read from storage on first use and cached for the life of
/// the store. Every mutation updates the cache, writes the whole record back
/// and then broadcasts [`StoreChanged`]. If a record could not be read, its
/// changes stay in memory for the session and are reported as unpersisted.
pub struct ProgressStore {
    clock: Clock,
    kv: Arc<dyn KeyValueStore>,
    progress: Mutex<Option<Cached<ProgressRecord>>>,
    notes: Mutex<Option<Cached<NoteRecord>>>,
    position: Mutex<Option<Cached<PositionRecord>>>,
    events: ProgressEvents,
}

impl ProgressStore {
    #[must_use]
    pub fn new(clock: Clock, kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_events(clock, kv, ProgressEvents::new())
    }

    /// Build a store that publishes on an existing event channel.
    #[must_use]
    pub fn with_events(clock: Clock, kv: Arc<dyn KeyValueStore>, events: ProgressEvents) -> Self {
        Self {
            clock,
            kv,
            progress: Mutex::new(None),
            notes: Mutex::new(None),
            position: Mutex::new(None),
            events,
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChanged> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn events(&self) -> &ProgressEvents {
        &self.events
    }

    // ─── progress ──────────────────────────────────────────────────────────

    /// Status map for a roadmap; empty when nothing has been recorded.
    pub async fn get_progress(&self, roadmap_id: &RoadmapId) -> RoadmapProgress {
        let mut slot = self.progress.lock().await;
        let cached = self.load(&mut *slot, PROGRESS_KEY, records::decode_progress).await;
        cached.record.roadmap(roadmap_id).cloned().unwrap_or_default()
    }

    pub async fn get_node_status(&self, roadmap_id: &RoadmapId, node_id: &NodeId) -> ProgressStatus {
        let mut slot = self.progress.lock().await;
        let cached = self.load(&mut *slot, PROGRESS_KEY, records::decode_progress).await;
        cached
            .record
            .roadmap(roadmap_id)
            .map(|p| p.status_of(node_id))
            .unwrap_or_default()
    }

    pub async fn get_completed_count(&self, roadmap_id: &RoadmapId) -> usize {
        self.get_progress(roadmap_id).await.completed_count()
    }

    /// Where to resume within `nodes`, based on recorded progress.
    pub async fn resume_index(&self, roadmap_id: &RoadmapId, nodes: &[RoadmapNode]) -> Option<usize> {
        let progress = self.get_progress(roadmap_id).await;
        resume_index(nodes, &progress)
    }

    /// Set a node's status from its textual form.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::InvalidStatus` if `status` is not one of
    /// `not_started`, `in_progress` or `completed`. Nothing is changed in that case.
    pub async fn update_node_progress(
        &self,
        node_id: &NodeId,
        status: &str,
        roadmap_id: &RoadmapId,
    ) -> Result<SaveStatus, ProgressStoreError> {
        let status = status.parse::<ProgressStatus>()?;
        Ok(self.set_node_status(roadmap_id, node_id, status).await)
    }

    pub async fn set_node_status(
        &self,
        roadmap_id: &RoadmapId,
        node_id: &NodeId,
        status: ProgressStatus,
    ) -> SaveStatus {
        let saved = {
            let mut slot = self.progress.lock().await;
            let cached = self.load(&mut *slot, PROGRESS_KEY, records::decode_progress).await;
            cached
                .record
                .set_status(roadmap_id.clone(), node_id.clone(), status);
            self.persist(PROGRESS_KEY, cached).await
        };
        debug!(roadmap = %roadmap_id, node = %node_id, %status, "node progress updated");
        self.events.notify();
        saved
    }

    // ─── notes ─────────────────────────────────────────────────────────────

    pub async fn get_note(&self, node_id: &NodeId) -> Option<Note> {
        let mut slot = self.notes.lock().await;
        let cached = self.load(&mut *slot, NOTES_KEY, records::decode_notes).await;
        cached.record.get(node_id).cloned()
    }

    pub async fn get_all_notes(&self) -> NoteRecord {
        let mut slot = self.notes.lock().await;
        self.load(&mut *slot, NOTES_KEY, records::decode_notes)
            .await
            .record
            .clone()
    }

    /// Replace the note for `node_id`, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `ProgressStoreError::Note` if the content is too long.
    pub async fn set_note(
        &self,
        node_id: &NodeId,
        content: impl Into<String>,
    ) -> Result<SaveStatus, ProgressStoreError> {
        let note = Note::new(content, self.clock.now())?;
        let saved = {
            let mut slot = self.notes.lock().await;
            let cached = self.load(&mut *slot, NOTES_KEY, records::decode_notes).await;
            cached.record.insert(node_id.clone(), note);
            self.persist(NOTES_KEY, cached).await
        };
        self.events.notify();
        Ok(saved)
    }

    // ─── position ──────────────────────────────────────────────────────────

    pub async fn get_current_position(&self) -> Option<CurrentPosition> {
        let mut slot = self.position.lock().await;
        let cached = self.load(&mut *slot, POSITION_KEY, records::decode_position).await;
        cached.record.current.clone()
    }

    /// Point "resume" at a node. Scroll progress saved for the same node is kept.
    pub async fn set_current_position(&self, roadmap_id: &RoadmapId, node_id: &NodeId) -> SaveStatus {
        self.visit(roadmap_id, node_id, None).await
    }

    /// Record where the learner is within a roadmap, including scroll progress.
    pub async fn save_position(
        &self,
        roadmap_id: &RoadmapId,
        node_id: &NodeId,
        scroll_progress: Option<f32>,
    ) -> SaveStatus {
        self.visit(roadmap_id, node_id, scroll_progress).await
    }

    pub async fn get_position(&self, roadmap_id: &RoadmapId) -> Option<TrailPosition> {
        let mut slot = self.position.lock().await;
        let cached = self.load(&mut *slot, POSITION_KEY, records::decode_position).await;
        cached.record.trail(roadmap_id).cloned()
    }

    async fn visit(
        &self,
        roadmap_id: &RoadmapId,
        node_id: &NodeId,
        scroll_progress: Option<f32>,
    ) -> SaveStatus {
        let saved = {
            let mut slot = self.position.lock().await;
            let cached = self.load(&mut *slot, POSITION_KEY, records::decode_position).await;
            let scroll_progress = scroll_progress.or_else(|| {
                cached
                    .record
                    .trail(roadmap_id)
                    .filter(|t| t.node_id() == node_id)
                    .and_then(TrailPosition::scroll_progress)
            });
            let trail = TrailPosition::new(node_id.clone(), scroll_progress, self.clock.now());
            cached.record.visit(roadmap_id.clone(), trail);
            self.persist(POSITION_KEY, cached).await
        };
        self.events.notify();
        saved
    }

    // ─── reset ─────────────────────────────────────────────────────────────

    /// Forget all progress, notes and positions.
    ///
    /// Records that could not be read before are cleared too, so later writes
    /// go through again.
    pub async fn reset_all(&self) -> SaveStatus {
        let saved = {
            let mut progress = self.progress.lock().await;
            let mut notes = self.notes.lock().await;
            let mut position = self.position.lock().await;
            *progress = Some(Cached::fresh());
            *notes = Some(Cached::fresh());
            *position = Some(Cached::fresh());

            let mut saved = SaveStatus::Persisted;
            for key in storage::keys::ALL {
                saved = saved.and(self.remove(key).await);
            }
            saved
        };
        self.events.notify();
        saved
    }

    // ─── storage plumbing ──────────────────────────────────────────────────

    async fn load<'a, T: Default>(
        &self,
        slot: &'a mut Option<Cached<T>>,
        key: &'static str,
        decode: fn(&'static str, &str) -> T,
    ) -> &'a mut Cached<T> {
        if slot.is_none() {
            let cached = match self.kv.get_item(key).await {
                Ok(Some(raw)) => Cached {
                    record: decode(key, &raw),
                    read_error: None,
                },
                Ok(None) => Cached::fresh(),
                Err(err) => {
                    warn!(key, error = %err, "could not read stored record; changes stay in memory");
                    Cached {
                        record: T::default(),
                        read_error: Some(err),
                    }
                }
            };
            *slot = Some(cached);
        }
        slot.get_or_insert_with(Cached::fresh)
    }

    /// Write the whole record back, unless its stored copy was never read.
    async fn persist<T: Serialize>(&self, key: &'static str, cached: &Cached<T>) -> SaveStatus {
        if let Some(err) = &cached.read_error {
            return unpersisted(key, err.clone());
        }
        let encoded = match serde_json::to_string(&cached.record) {
            Ok(encoded) => encoded,
            Err(err) => return unpersisted(key, StorageError::Serialization(err.to_string())),
        };
        match self.kv.set_item(key, &encoded).await {
            Ok(()) => SaveStatus::Persisted,
            Err(err) => unpersisted(key, err),
        }
    }

    async fn remove(&self, key: &'static str) -> SaveStatus {
        match self.kv.remove_item(key).await {
            Ok(()) => SaveStatus::Persisted,
            Err(err) => unpersisted(key, err),
        }
    }
}

fn unpersisted(key: &'static str, err: StorageError) -> SaveStatus {
    warn!(key, error = %err, "change kept in memory but not saved");
    SaveStatus::Unpersisted(err)
}
