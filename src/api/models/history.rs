//! In-memory recent-generation history.
//!
//! Holds the last few results per user so the client can reload one without a
//! round trip to the store. Nothing here is persisted; the buffers are lost on
//! restart.

use super::diagram::{Analysis, DiagramType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// How many recent results are kept per user.
pub const HISTORY_CAPACITY: usize = 10;

/// Map a stored diagram-type tag to a current enumeration member.
///
/// Older clients wrote tags like "sequenceDiagram" or "gantt" before the type
/// list was reduced to its current three members. Anything unrecognized falls
/// back to a flowchart so a stale history entry still reloads.
pub fn normalize_tag(tag: &str) -> DiagramType {
    if let Some(current) = DiagramType::parse(tag) {
        return current;
    }
    match tag {
        "entityRelationshipDiagram" => DiagramType::ErDiagram,
        "classDiagram" | "sequenceDiagram" | "stateDiagram" => DiagramType::ClassDiagram,
        "userJourney" | "gantt" | "pieChart" | "mindmaps" => DiagramType::Flowchart,
        _ => DiagramType::Flowchart,
    }
}

/// One recent generation result. `diagram_type_tag` keeps whatever tag was in
/// effect when the item was recorded; it is normalized on reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub title: String,
    pub diagram_type_tag: String,
    pub diagram_code: String,
    pub analysis: Analysis,
    pub created_at: DateTime<Utc>,
}

impl HistoryItem {
    pub fn normalized_type(&self) -> DiagramType {
        normalize_tag(&self.diagram_type_tag)
    }
}

/// Fixed-capacity deque of recent results, newest first.
#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    items: VecDeque<HistoryItem>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Insert at the front, evicting the oldest entry when full.
    pub fn push(&mut self, item: HistoryItem) {
        if self.items.len() == HISTORY_CAPACITY {
            self.items.pop_back();
        }
        self.items.push_front(item);
    }

    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
