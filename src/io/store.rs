use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::io::config_io::read_config;
use crate::io::lock::{LockError, StoreLock};
use crate::model::config::MapConfig;
use crate::model::task::TaskTree;

/// Name of the store directory looked up from the working directory
pub const STORE_DIR: &str = "taskmap";
pub const TASKS_FILE: &str = "tasks.json";
pub const CONFIG_FILE: &str = "config.toml";

/// Error type for store I/O operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("not a taskmap store: no taskmap/ directory found")]
    NotAStore,
    #[error("a taskmap store already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse tasks.json: {0}")]
    TreeParseError(#[from] serde_json::Error),
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error(transparent)]
    Locked(#[from] LockError),
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
}

/// A loaded store: where it lives, its config and the task tree
#[derive(Debug, Clone)]
pub struct Store {
    /// Directory containing `taskmap/`
    pub root: PathBuf,
    /// The `taskmap/` directory itself
    pub dir: PathBuf,
    pub config: MapConfig,
    pub tree: TaskTree,
}

impl Store {
    pub fn save(&self) -> Result<(), StoreError> {
        save_tree(&self.dir, &self.tree)
    }
}

/// Walk up from `start` looking for a `taskmap/` directory holding a
/// `tasks.json`. Returns the directory that contains it.
pub fn discover_store(start: &Path) -> Result<PathBuf, StoreError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(STORE_DIR);
        if dir.is_dir() && dir.join(TASKS_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(StoreError::NotAStore);
        }
    }
}

/// Load config and tree from the store under `root`
pub fn load_store(root: &Path) -> Result<Store, StoreError> {
    let dir = root.join(STORE_DIR);
    if !dir.is_dir() {
        return Err(StoreError::NotAStore);
    }
    let config = read_config(&dir)?;
    let tree = read_tree(&dir)?;
    debug!(root = %root.display(), tasks = tree.all_tasks().len(), "loaded store");
    Ok(Store {
        root: root.to_path_buf(),
        dir,
        config,
        tree,
    })
}

/// Parse `tasks.json` from the store directory
pub fn read_tree(dir: &Path) -> Result<TaskTree, StoreError> {
    let path = dir.join(TASKS_FILE);
    let text = fs::read_to_string(&path).map_err(|e| StoreError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Write `tasks.json` atomically
pub fn save_tree(dir: &Path, tree: &TaskTree) -> Result<(), StoreError> {
    let mut content = serde_json::to_string_pretty(tree)?;
    content.push('\n');
    atomic_write(&dir.join(TASKS_FILE), content.as_bytes())?;
    Ok(())
}

/// Re-read `tasks.json`, let `edit` change it and write it back, all
/// under the store lock. Returns the tree as written.
pub fn update_tree(dir: &Path, edit: impl FnOnce(&mut TaskTree)) -> Result<TaskTree, StoreError> {
    let _lock = StoreLock::acquire_default(dir)?;
    let mut tree = read_tree(dir)?;
    edit(&mut tree);
    save_tree(dir, &tree)?;
    Ok(tree)
}

/// Create `taskmap/` under `root` with an empty tree and the given config
/// text. An existing store is only replaced when `force` is set.
pub fn init_store(root: &Path, config_text: &str, force: bool) -> Result<PathBuf, StoreError> {
    let dir = root.join(STORE_DIR);
    if dir.join(TASKS_FILE).exists() && !force {
        return Err(StoreError::AlreadyExists(dir));
    }
    fs::create_dir_all(&dir)?;
    save_tree(&dir, &TaskTree::default())?;
    atomic_write(&dir.join(CONFIG_FILE), config_text.as_bytes())?;
    info!(dir = %dir.display(), "initialized store");
    Ok(dir)
}

/// Write via a temp file in the same directory, then rename over the target
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
