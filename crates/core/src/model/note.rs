use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::ids::NodeId;

/// Upper bound on note length, in characters.
pub const NOTE_CONTENT_MAX_CHARS: usize = 50_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NoteError {
    #[error("note is too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },
}

/// A free-text note attached to a node. Only the latest version is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    content: String,
    updated_at: DateTime<Utc>,
}

impl Note {
    /// Builds a note stamped with `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `NoteError::TooLong` if `content` exceeds [`NOTE_CONTENT_MAX_CHARS`].
    pub fn new(content: impl Into<String>, updated_at: DateTime<Utc>) -> Result<Self, NoteError> {
        let content = content.into();
        let len = content.chars().count();
        if len > NOTE_CONTENT_MAX_CHARS {
            return Err(NoteError::TooLong {
                len,
                max: NOTE_CONTENT_MAX_CHARS,
            });
        }
        Ok(Self {
            content,
            updated_at,
        })
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Every note, keyed by node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteRecord(BTreeMap<NodeId, Note>);

impl NoteRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, node_id: &NodeId) -> Option<&Note> {
        self.0.get(node_id)
    }

    pub fn insert(&mut self, node_id: NodeId, note: Note) -> Option<Note> {
        self.0.insert(node_id, note)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Notes ordered by most recent update first.
    #[must_use]
    pub fn recent_first(&self) -> Vec<(&NodeId, &Note)> {
        let mut notes: Vec<_> = self.0.iter().collect();
        notes.sort_by(|a, b| b.1.updated_at.cmp(&a.1.updated_at).then(a.0.cmp(b.0)));
        notes
    }
}
