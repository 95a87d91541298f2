#![forbid(unsafe_code)]

//! Per-map settings and the map record itself.

use serde::{Deserialize, Serialize};

/// How the automatic layout arranges the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Root on the left, subtrees fanning out to the right.
    #[default]
    Horizontal,
    /// Root in the center, children on concentric rings.
    Radial,
}

/// Settings persisted with each map.
///
/// Decoding is field-lenient via `#[serde(default)]`: a blob missing fields
/// (older schema) fills in defaults, and a blob that fails to parse at all
/// yields the full default set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub auto_layout: bool,
    pub zoom_level: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub show_grid: bool,
    pub layout_mode: LayoutMode,
    pub show_minimap: bool,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            auto_layout: true,
            zoom_level: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            show_grid: true,
            layout_mode: LayoutMode::Horizontal,
            show_minimap: true,
        }
    }
}

impl MapSettings {
    /// Serialize to the persisted JSON form.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Decode from a persisted blob, falling back to defaults on any error.
    #[must_use]
    pub fn from_json(data: Option<&str>) -> Self {
        match data {
            Some(s) if !s.is_empty() => serde_json::from_str(s).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

/// A mind map document header.
#[derive(Debug, Clone, PartialEq)]
pub struct MindMap {
    pub id: super::MapId,
    pub name: String,
    pub settings: MapSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = MapSettings::default();
        assert!(s.auto_layout);
        assert_eq!(s.zoom_level, 1.0);
        assert_eq!(s.layout_mode, LayoutMode::Horizontal);
        assert!(s.show_grid);
        assert!(s.show_minimap);
    }

    #[test]
    fn settings_round_trip() {
        let mut s = MapSettings::default();
        s.auto_layout = false;
        s.zoom_level = 1.5;
        s.layout_mode = LayoutMode::Radial;
        let json = s.to_json();
        assert!(json.contains("\"radial\""));
        assert_eq!(MapSettings::from_json(Some(&json)), s);
    }

    #[test]
    fn partial_blob_fills_defaults() {
        let s = MapSettings::from_json(Some("{\"zoom_level\": 2.0}"));
        assert_eq!(s.zoom_level, 2.0);
        assert!(s.auto_layout);
        assert_eq!(s.layout_mode, LayoutMode::Horizontal);
    }

    #[test]
    fn garbage_blob_yields_defaults() {
        assert_eq!(MapSettings::from_json(Some("{{")), MapSettings::default());
        assert_eq!(MapSettings::from_json(None), MapSettings::default());
    }
}
