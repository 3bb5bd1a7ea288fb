use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::io::store::{CONFIG_FILE, TASKS_FILE};

/// Events sent from the file watcher to the TUI event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// `tasks.json` was written by someone
    TreeChanged,
    /// `config.toml` changed
    ConfigChanged,
}

/// Watches the `taskmap/` directory for external edits.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StoreEvent>,
}

impl StoreWatcher {
    /// Start watching the store directory; call `poll()` every tick.
    pub fn start(store_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                for evt in classify(&event.paths) {
                    let _ = tx.send(evt);
                }
            },
            Config::default(),
        )?;

        watcher.watch(store_dir, RecursiveMode::NonRecursive)?;
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain queued events, collapsing duplicates
    pub fn poll(&self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            if !events.contains(&evt) {
                events.push(evt);
            }
        }
        events
    }
}

/// Map changed paths to store events. Temp files, `.lock` and
/// `.state.json` are ignored.
fn classify(paths: &[PathBuf]) -> Vec<StoreEvent> {
    let mut out = Vec::new();
    for path in paths {
        let evt = match path.file_name().and_then(|n| n.to_str()) {
            Some(TASKS_FILE) => StoreEvent::TreeChanged,
            Some(CONFIG_FILE) => StoreEvent::ConfigChanged,
            _ => continue,
        };
        if !out.contains(&evt) {
            out.push(evt);
        }
    }
    out
}
