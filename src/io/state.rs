use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::view::ViewportTransform;

/// Persisted TUI state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UiState {
    /// Which view is showing ("map" or "list")
    pub view: String,
    /// Last map transform; restoring it suppresses the first auto-fit
    #[serde(default)]
    pub transform: Option<ViewportTransform>,
    /// Selected task ID
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Read .state.json from the store directory
pub fn read_ui_state(store_dir: &Path) -> Option<UiState> {
    let path = store_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the store directory
pub fn write_ui_state(store_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = store_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}
