//! Diagram record and analysis types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Maximum characters accepted for the input text of a generation request.
pub const MAX_INPUT_TEXT_LENGTH: usize = 5000;

/// Supported diagram types.
///
/// The wire tags ("er_diagram", "flowchart", "class_diagram") are the ids the
/// client sends and the values stored in the `diagram_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramType {
    ErDiagram,
    Flowchart,
    ClassDiagram,
}

impl DiagramType {
    pub const ALL: [DiagramType; 3] = [
        DiagramType::ErDiagram,
        DiagramType::Flowchart,
        DiagramType::ClassDiagram,
    ];

    /// Parse a client-supplied id, case-insensitively.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "er_diagram" => Some(DiagramType::ErDiagram),
            "flowchart" => Some(DiagramType::Flowchart),
            "class_diagram" => Some(DiagramType::ClassDiagram),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagramType::ErDiagram => "er_diagram",
            DiagramType::Flowchart => "flowchart",
            DiagramType::ClassDiagram => "class_diagram",
        }
    }

    /// Comma-separated list of the supported ids, for validation messages.
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for DiagramType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured analysis accompanying generated diagram code.
///
/// Every field defaults to empty when the model omits it. Fields the model
/// returns beyond the three known ones are kept in `extra` and serialized
/// back out alongside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub flow_points: Vec<String>,
    #[serde(default)]
    pub arrow_meanings: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Analysis {
    /// True when the model supplied none of the known fields.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.flow_points.is_empty() && self.arrow_meanings.is_empty()
    }
}

/// A persisted diagram. Created exactly once per successful generation,
/// never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub diagram_type: DiagramType,
    pub diagram_code: String,
    pub analysis: Analysis,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a new diagram; id and created_at are store-assigned.
#[derive(Debug, Clone)]
pub struct NewDiagram {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub diagram_type: DiagramType,
    pub diagram_code: String,
    pub analysis: Analysis,
}
