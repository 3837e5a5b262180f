//! Lenient decoding of the persisted JSON records.
//!
//! Reads never fail: unparsable text becomes an empty record and entries that
//! do not fit the model are dropped, so only valid values are re-persisted.

use serde_json::{Map, Value};
use tracing::warn;

use trail_core::model::{
    CurrentPosition, NodeId, Note, NoteRecord, PositionRecord, ProgressRecord, ProgressStatus,
    RoadmapId, RoadmapProgress, TrailPosition,
};

fn parse_object(key: &'static str, raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!(key, "stored record is not an object; treating as empty");
            None
        }
        Err(err) => {
            warn!(key, error = %err, "stored record is malformed; treating as empty");
            None
        }
    }
}

fn report_dropped(key: &'static str, dropped: usize) {
    if dropped > 0 {
        warn!(key, dropped, "ignored invalid entries in stored record");
    }
}

pub(crate) fn decode_progress(key: &'static str, raw: &str) -> ProgressRecord {
    let mut record = ProgressRecord::new();
    let Some(roadmaps) = parse_object(key, raw) else {
        return record;
    };

    let mut dropped = 0;
    for (roadmap_raw, nodes) in roadmaps {
        let (Ok(roadmap_id), Value::Object(nodes)) = (RoadmapId::new(roadmap_raw), nodes) else {
            dropped += 1;
            continue;
        };
        let mut progress = RoadmapProgress::new();
        for (node_raw, status) in nodes {
            let node_id = NodeId::new(node_raw).ok();
            let status = status
                .as_str()
                .and_then(|s| s.parse::<ProgressStatus>().ok());
            match (node_id, status) {
                (Some(node_id), Some(status)) => {
                    progress.set(node_id, status);
                }
                _ => dropped += 1,
            }
        }
        record.insert_roadmap(roadmap_id, progress);
    }

    report_dropped(key, dropped);
    record
}

pub(crate) fn decode_notes(key: &'static str, raw: &str) -> NoteRecord {
    let mut record = NoteRecord::new();
    let Some(notes) = parse_object(key, raw) else {
        return record;
    };

    let mut dropped = 0;
    for (node_raw, note) in notes {
        let node_id = NodeId::new(node_raw).ok();
        let note = serde_json::from_value::<Note>(note).ok();
        match (node_id, note) {
            (Some(node_id), Some(note)) => {
                record.insert(node_id, note);
            }
            _ => dropped += 1,
        }
    }

    report_dropped(key, dropped);
    record
}

pub(crate) fn decode_position(key: &'static str, raw: &str) -> PositionRecord {
    let mut record = PositionRecord::default();
    let Some(mut fields) = parse_object(key, raw) else {
        return record;
    };

    let mut dropped = 0;
    if let Some(current) = fields.remove("current").filter(|v| !v.is_null()) {
        match serde_json::from_value::<CurrentPosition>(current) {
            Ok(current) => record.current = Some(current),
            Err(_) => dropped += 1,
        }
    }

    if let Some(Value::Object(trails)) = fields.remove("trails") {
        for (roadmap_raw, trail) in trails {
            let roadmap_id = RoadmapId::new(roadmap_raw).ok();
            let trail = serde_json::from_value::<TrailPosition>(trail).ok();
            match (roadmap_id, trail) {
                (Some(roadmap_id), Some(trail)) => {
                    record.trails.insert(roadmap_id, trail);
                }
                _ => dropped += 1,
            }
        }
    }

    report_dropped(key, dropped);
    record
}
