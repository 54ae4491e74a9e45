//! Client configuration.

use crate::stroke::{Tool, ToolSettings, is_valid_width};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Settings a host passes when creating a [`crate::Whiteboard`].
///
/// Every field has a default, so a JSON file only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardConfig {
    /// WebSocket endpoint of the relay.
    pub server_url: String,
    pub room: String,
    /// Logical board extent strokes are stored in.
    pub extent: Size,
    pub pen_color: String,
    pub pen_width: f64,
    pub eraser_width: f64,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:3030/ws".to_string(),
            room: "lobby".to_string(),
            extent: Size::new(800.0, 600.0),
            pen_color: "#000000".to_string(),
            pen_width: 4.0,
            eraser_width: 20.0,
        }
    }
}

impl WhiteboardConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Initial toolbar state.
    ///
    /// Widths that are not positive numbers fall back to the defaults.
    pub fn tool_settings(&self) -> ToolSettings {
        let defaults = ToolSettings::default();
        let width_or = |width: f64, fallback: f64| {
            if is_valid_width(width) {
                width
            } else {
                log::warn!("Invalid width {} in configuration, using {}", width, fallback);
                fallback
            }
        };
        ToolSettings {
            tool: Tool::Pen,
            pen_color: self.pen_color.clone(),
            pen_width: width_or(self.pen_width, defaults.pen_width),
            eraser_width: width_or(self.eraser_width, defaults.eraser_width),
        }
    }
}
