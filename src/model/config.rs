use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration from taskmap/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    #[serde(default)]
    pub project: ProjectInfo,
    #[serde(default)]
    pub ids: IdConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdConfig {
    /// Prefix for new task IDs (`T` gives `T-001`)
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for IdConfig {
    fn default() -> Self {
        IdConfig {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "T".to_string()
}

/// Mindmap geometry, in layout units (pixels in a browser, virtual pixels
/// in the terminal)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// `W`: width of every node box
    pub node_width: f64,
    /// `H`: height of every node box
    pub node_height: f64,
    /// `V`: gap between sibling bands
    pub vertical_spacing: f64,
    /// Gap between depth columns
    pub horizontal_spacing: f64,
    /// Control point offset as a fraction of the horizontal anchor distance
    pub curve_tension: f64,
    /// How far beyond the canvas a backward connector detours
    pub detour_margin: f64,
    /// Minimum control point offset of a backward connector
    pub detour_min_offset: f64,
    /// Radius of the connection handle on a node's right edge
    pub handle_radius: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            node_width: 200.0,
            node_height: 60.0,
            vertical_spacing: 20.0,
            horizontal_spacing: 100.0,
            curve_tension: 0.4,
            detour_margin: 80.0,
            detour_min_offset: 100.0,
            handle_radius: 12.0,
        }
    }
}

impl LayoutConfig {
    /// Width of one depth column including the gap
    pub fn column_width(&self) -> f64 {
        self.node_width + self.horizontal_spacing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale change per unit of wheel delta
    pub zoom_sensitivity: f64,
    /// Fraction of the viewport that fit-to-view fills
    pub fit_margin: f64,
    /// Transform used on reset and when there is nothing to fit
    pub default_translate_x: f64,
    pub default_translate_y: f64,
    pub default_scale: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            min_scale: 0.2,
            max_scale: 2.0,
            zoom_sensitivity: 0.001,
            fit_margin: 0.9,
            default_translate_x: 50.0,
            default_translate_y: 50.0,
            default_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Hex overrides for named theme colors
    #[serde(default)]
    pub colors: HashMap<String, String>,
    /// Hex colors cycled by depth for tree connectors; empty keeps the default
    #[serde(default)]
    pub depth_palette: Vec<String>,
    /// Virtual pixels per terminal column
    #[serde(default = "default_cell_width")]
    pub cell_width: f64,
    /// Virtual pixels per terminal row
    #[serde(default = "default_cell_height")]
    pub cell_height: f64,
    /// Seconds between automatic saves while timers run
    #[serde(default = "default_autosave_secs")]
    pub autosave_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            colors: HashMap::new(),
            depth_palette: Vec::new(),
            cell_width: default_cell_width(),
            cell_height: default_cell_height(),
            autosave_secs: default_autosave_secs(),
        }
    }
}

/// Connector colors cycled by depth when `depth_palette` is empty
pub const DEFAULT_DEPTH_PALETTE: [&str; 6] = ["#4488FF", "#44DDFF", "#44FF88", "#FFD700", "#FB4196", "#CC66FF"];

impl UiConfig {
    /// The configured palette, or the built-in one
    pub fn depth_palette(&self) -> Vec<String> {
        if self.depth_palette.is_empty() {
            DEFAULT_DEPTH_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            self.depth_palette.clone()
        }
    }
}

fn default_cell_width() -> f64 {
    8.0
}

fn default_cell_height() -> f64 {
    16.0
}

fn default_autosave_secs() -> u64 {
    10
}
