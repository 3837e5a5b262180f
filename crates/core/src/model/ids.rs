use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when an identifier cannot be built from text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
}

/// Ids are kept verbatim; only all-whitespace text is refused.
fn checked(kind: &'static str, raw: impl Into<String>) -> Result<String, IdError> {
    let raw = raw.into();
    if raw.trim().is_empty() {
        return Err(IdError::Empty { kind });
    }
    Ok(raw)
}

/// Identifier of a roadmap (learning path). Opaque to this crate.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoadmapId(String);

impl RoadmapId {
    /// Builds a roadmap id from text, unchanged.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` if the text is empty or only whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        checked("roadmap id", raw).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a node (topic) inside a roadmap. Opaque to this crate.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Builds a node id from text, unchanged.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` if the text is empty or only whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, IdError> {
        checked("node id", raw).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RoadmapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoadmapId({})", self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

// ─── Display / FromStr ─────────────────────────────────────────────────────────

impl fmt::Display for RoadmapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoadmapId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for NodeId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ─── serde glue ────────────────────────────────────────────────────────────────

impl TryFrom<String> for RoadmapId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for NodeId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoadmapId> for String {
    fn from(id: RoadmapId) -> Self {
        id.0
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surrounding_whitespace_is_significant() {
        let padded = NodeId::new("n1 ").unwrap();
        assert_eq!(padded.as_str(), "n1 ");
        assert_ne!(padded, NodeId::new("n1").unwrap());
    }

    #[test]
    fn rejects_blank_ids() {
        assert_eq!(
            NodeId::new("   "),
            Err(IdError::Empty { kind: "node id" })
        );
        assert!("".parse::<RoadmapId>().is_err());
    }

    #[test]
    fn display_is_the_raw_text() {
        let id: NodeId = "git-3".parse().unwrap();
        assert_eq!(id.to_string(), "git-3");
        assert_eq!(format!("{id:?}"), "NodeId(git-3)");
    }

    #[test]
    fn json_rejects_empty_id() {
        let parsed: Result<NodeId, _> = serde_json::from_str("\"\"");
        assert!(parsed.is_err());
        let parsed: NodeId = serde_json::from_str("\"genai-1-1\"").unwrap();
        assert_eq!(parsed.as_str(), "genai-1-1");
    }
}
