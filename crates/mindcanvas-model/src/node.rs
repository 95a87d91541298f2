#![forbid(unsafe_code)]

//! Node records and their style metadata.
//!
//! Styles round-trip through JSON because that is how backends persist them;
//! decoding is deliberately lenient so a map written by a newer version (or a
//! corrupted blob) degrades to defaults instead of failing the load.

use mindcanvas_core::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a mind map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapId(pub i64);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a node within a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single topic in the tree.
///
/// `parent_id` of `None` marks a root. `position` is `Some` only when the
/// node has been manually placed (pinned); auto-layout owns it otherwise.
/// `sort_order` orders siblings under the same parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub map_id: MapId,
    pub parent_id: Option<NodeId>,
    pub text: String,
    pub position: Option<Point>,
    pub is_collapsed: bool,
    pub sort_order: i64,
    pub style: NodeStyle,
}

impl Node {
    /// Whether this node is the root of its map.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Priority marker displayed on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Priority {
    /// The persisted string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Info => "info",
        }
    }
}

/// Task status marker displayed on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl Status {
    /// The persisted string form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Blocked => "blocked",
        }
    }
}

/// Visual overrides for a node. All fields optional; `None` means inherit
/// the theme default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeStyle {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl NodeStyle {
    /// Serialize to the persisted JSON form.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Decode from a persisted blob, falling back to defaults on any error
    /// or on a missing blob.
    #[must_use]
    pub fn from_json(data: Option<&str>) -> Self {
        match data {
            Some(s) if !s.is_empty() => serde_json::from_str(s).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_json_round_trip() {
        let style = NodeStyle {
            color: Some("#ff00aa".to_string()),
            icon: None,
            priority: Some(Priority::High),
            status: Some(Status::InProgress),
        };
        let json = style.to_json();
        assert!(json.contains("\"high\""));
        assert!(json.contains("\"in_progress\""));
        assert_eq!(NodeStyle::from_json(Some(&json)), style);
    }

    #[test]
    fn style_decode_is_lenient() {
        assert_eq!(NodeStyle::from_json(None), NodeStyle::default());
        assert_eq!(NodeStyle::from_json(Some("")), NodeStyle::default());
        assert_eq!(NodeStyle::from_json(Some("not json")), NodeStyle::default());
        assert_eq!(
            NodeStyle::from_json(Some("{\"priority\": 7}")),
            NodeStyle::default()
        );
        // Unknown fields from a newer schema are ignored.
        let decoded = NodeStyle::from_json(Some("{\"color\": \"#fff\", \"glow\": true}"));
        assert_eq!(decoded.color.as_deref(), Some("#fff"));
    }

    #[test]
    fn priority_and_status_strings() {
        assert_eq!(Priority::Critical.as_str(), "critical");
        assert_eq!(Status::InProgress.as_str(), "in_progress");
    }

    #[test]
    fn root_detection() {
        let node = Node {
            id: NodeId(1),
            map_id: MapId(1),
            parent_id: None,
            text: "Central Topic".to_string(),
            position: None,
            is_collapsed: false,
            sort_order: 0,
            style: NodeStyle::default(),
        };
        assert!(node.is_root());
    }
}
