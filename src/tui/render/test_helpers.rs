use std::path::PathBuf;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::store::{self, STORE_DIR, Store};
use crate::model::{MapConfig, ProjectInfo, Task, TaskTree};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// T-001 { T-002 { T-003 }, T-004 }, no extra connections
pub fn sample_tree() -> TaskTree {
    TaskTree::new(vec![Task::new("T-001", "Plan trip").with_children(vec![
        Task::new("T-002", "Book flights").with_children(vec![Task::new("T-003", "Compare prices")]),
        Task::new("T-004", "Pack"),
    ])])
}

fn test_config() -> MapConfig {
    MapConfig {
        project: ProjectInfo { name: "Test".into() },
        ..MapConfig::default()
    }
}

/// An app over an in-memory store; saving it would fail.
pub fn app_with_tree(tree: TaskTree) -> App {
    let root = PathBuf::from("/tmp/test-taskmap");
    App::new(Store {
        dir: root.join(STORE_DIR),
        root,
        config: test_config(),
        tree,
    })
}

/// An app over a real store in a temp dir; keep the `TempDir` alive.
pub fn app_on_disk(tree: TaskTree) -> (TempDir, App) {
    let tmp = TempDir::new().unwrap();
    let dir = store::init_store(tmp.path(), "[project]\nname = \"Test\"\n", false).unwrap();
    store::save_tree(&dir, &tree).unwrap();
    let loaded = store::load_store(tmp.path()).unwrap();
    (tmp, App::new(loaded))
}
