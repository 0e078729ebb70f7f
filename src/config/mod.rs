//! Editor Configuration
//! Settings groups consulted by entities, renderers and the FSM interpreter

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;


#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Invalid settings document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Complete editor configuration, threaded explicitly into every operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub canvas: CanvasConfig,
    pub link: LinkConfig,
    pub node: NodeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::preset(Preset::Fsm)
    }
}

impl Config {
    /// Build one of the named presets
    pub fn preset(preset: Preset) -> Self {
        let mut config = Self {
            canvas: CanvasConfig::default(),
            link: LinkConfig::default(),
            node: NodeConfig::default(),
        };

        match preset {
            Preset::Fsm => {}
            Preset::DirectedGraph => {
                config.canvas.accept_start_links = false;
                config.link.arrow_head_at_src_overridable = true;
                config.node.can_be_accept_state = false;
            }
            Preset::UndirectedGraph => {
                config.canvas.accept_start_links = false;
                config.link.arrow_head_at_dst = false;
                config.node.can_be_accept_state = false;
            }
            Preset::ArrayLike => {
                config.canvas.accept_links = false;
                config.canvas.accept_self_links = false;
                config.canvas.accept_start_links = false;
                config.link.arrow_head_at_dst = false;
                config.node.can_be_accept_state = false;
            }
        }

        config
    }

    /// Overlay a (possibly partial) JSON settings document on the defaults
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Font size in pixels parsed from the shared CSS font string
    pub fn font_size(&self) -> f64 {
        font_size_px(&self.canvas.font)
    }
}

/// Canvas-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CanvasConfig {
    pub accept_links: bool,
    pub accept_self_links: bool,
    pub accept_start_links: bool,
    pub font: String,
    pub opacity: f64,
    pub line_dash: Vec<f64>,
    pub line_width: f64,
    pub hit_target_padding: f64,
    pub snap_to_padding: f64,
    pub selection_color: String,
    pub width: f64,
    pub height: f64,
    /// Pixel to TikZ unit factor
    pub latex_scale: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            accept_links: true,
            accept_self_links: true,
            accept_start_links: true,
            font: "20px \"Times New Roman\", serif".to_string(),
            opacity: 1.0,
            line_dash: vec![5.0, 5.0],
            line_width: 1.0,
            hit_target_padding: 6.0,
            snap_to_padding: 6.0,
            selection_color: "blue".to_string(),
            width: 800.0,
            height: 600.0,
            latex_scale: 0.1,
        }
    }
}

/// Link-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkConfig {
    pub arrow_head_at_src: bool,
    pub arrow_head_at_dst: bool,
    pub arrow_head_at_src_overridable: bool,
    pub arrow_head_at_dst_overridable: bool,
    pub border_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            arrow_head_at_src: false,
            arrow_head_at_dst: true,
            arrow_head_at_src_overridable: false,
            arrow_head_at_dst_overridable: false,
            border_color: "black".to_string(),
            background_color: "black".to_string(),
            text_color: "black".to_string(),
        }
    }
}

/// Node-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeConfig {
    pub radius: f64,
    pub can_be_accept_state: bool,
    pub accept_state_inner_circle_distance: f64,
    pub border_color: String,
    pub background_color: String,
    pub text_color: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            can_be_accept_state: true,
            accept_state_inner_circle_distance: 6.0,
            border_color: "black".to_string(),
            background_color: "white".to_string(),
            text_color: "black".to_string(),
        }
    }
}

/// Named configuration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Preset {
    #[default]
    #[serde(rename = "fsm")]
    Fsm,
    #[serde(rename = "directed graph")]
    DirectedGraph,
    #[serde(rename = "undirected graph")]
    UndirectedGraph,
    #[serde(rename = "array-like")]
    ArrayLike,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Fsm,
        Preset::DirectedGraph,
        Preset::UndirectedGraph,
        Preset::ArrayLike,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Fsm => "fsm",
            Preset::DirectedGraph => "directed graph",
            Preset::UndirectedGraph => "undirected graph",
            Preset::ArrayLike => "array-like",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        Preset::ALL
            .into_iter()
            .find(|p| p.name().replace('-', " ") == wanted)
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

/// Options for the FSM interpreter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FsmOptions {
    /// Report a missing initial state as an error
    pub ensure_initial_state: bool,
}

impl Default for FsmOptions {
    fn default() -> Self {
        Self {
            ensure_initial_state: true,
        }
    }
}

/// Extract the pixel size from a CSS font shorthand such as `20px serif`
pub fn font_size_px(font: &str) -> f64 {
    font.split_whitespace()
        .find_map(|part| part.strip_suffix("px"))
        .and_then(|n| n.parse::<f64>().ok())
        .filter(|n| n.is_finite() && *n > 0.0)
        .unwrap_or(20.0)
}

/// First family named after the size in a CSS font shorthand, unquoted; `serif` when absent
pub fn font_family(font: &str) -> String {
    let mut parts = font.split_whitespace();
    let has_size = parts
        .by_ref()
        .any(|part| part.strip_suffix("px").is_some_and(|n| n.parse::<f64>().is_ok()));
    let families = if has_size {
        parts.collect::<Vec<_>>().join(" ")
    } else {
        String::new()
    };
    families
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches(['"', '\'']).trim())
        .filter(|family| !family.is_empty())
        .unwrap_or("serif")
        .to_string()
}
