use ratatui::style::Color;

use crate::model::UiConfig;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub yellow: Color,
    pub green: Color,
    /// Node box outline
    pub node: Color,
    pub selection_bg: Color,
    /// Connector colors cycled by target depth
    pub depth_palette: Vec<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x1E, 0x1E, 0x2E),
            text: Color::Rgb(0xE0, 0xE0, 0xF0),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x6C, 0x6C, 0x8A),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            node: Color::Rgb(0xA0, 0x9B, 0xFE),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            depth_palette: palette_colors(&UiConfig::default()),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Configured depth palette; unparseable entries are dropped
fn palette_colors(ui: &UiConfig) -> Vec<Color> {
    ui.depth_palette()
        .iter()
        .filter_map(|hex| parse_hex_color(hex))
        .collect()
}

impl Theme {
    /// Create a theme from the UI config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            if let Some(color) = parse_hex_color(value) {
                match key.as_str() {
                    "background" => theme.background = color,
                    "text" => theme.text = color,
                    "text_bright" => theme.text_bright = color,
                    "highlight" => theme.highlight = color,
                    "dim" => theme.dim = color,
                    "yellow" => theme.yellow = color,
                    "green" => theme.green = color,
                    "node" => theme.node = color,
                    "selection_bg" => theme.selection_bg = color,
                    _ => {}
                }
            }
        }

        let palette = palette_colors(ui);
        if !palette.is_empty() {
            theme.depth_palette = palette;
        }
        theme
    }

    /// Color for a connector given its palette slot
    pub fn depth_color(&self, index: usize) -> Color {
        self.depth_palette.get(index).copied().unwrap_or(self.dim)
    }
}
