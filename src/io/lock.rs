//! Advisory lock over a taskmap store.
//!
//! Every writer of `tasks.json` (CLI commands and the TUI) holds the lock
//! for its whole read-modify-write cycle, see [`crate::io::store::update_tree`].
//! The `.lock` file stays on disk between runs: unlinking a locked file
//! would let a waiter lock the old inode while a newcomer locks a fresh one.
//! The holder's pid is written into it so a timeout can name who is in the way.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

pub const LOCK_FILE: &str = ".lock";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const FIRST_BACKOFF: Duration = Duration::from_millis(2);
const MAX_BACKOFF: Duration = Duration::from_millis(50);

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    CreateError { path: PathBuf, source: io::Error },
    #[error("store at {} is busy{}", .path.display(), holder_suffix(.holder))]
    Timeout { path: PathBuf, holder: Option<u32> },
    #[error("lock error: {0}")]
    IoError(#[from] io::Error),
}

fn holder_suffix(holder: &Option<u32>) -> String {
    holder.map(|pid| format!(" (locked by process {})", pid)).unwrap_or_default()
}

/// Exclusive hold on a store directory; released when dropped
#[derive(Debug)]
pub struct StoreLock {
    file: File,
}

impl StoreLock {
    /// Lock `store_dir`, retrying with growing pauses until `timeout` passes
    pub fn acquire(store_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = store_dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::CreateError {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        let mut backoff = FIRST_BACKOFF;
        while !flock_exclusive(&file)? {
            let now = Instant::now();
            if now >= deadline {
                let holder = read_holder(&mut file);
                warn!(path = %path.display(), ?holder, "store lock timed out");
                return Err(LockError::Timeout { path, holder });
            }
            std::thread::sleep(backoff.min(deadline - now));
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        write!(file, "{}", std::process::id())?;
        debug!(path = %path.display(), "store locked");
        Ok(StoreLock { file })
    }

    pub fn acquire_default(store_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(store_dir, DEFAULT_TIMEOUT)
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        // The flock itself goes with the handle
        let _ = self.file.set_len(0);
    }
}

fn read_holder(file: &mut File) -> Option<u32> {
    let mut text = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut text).ok()?;
    text.trim().parse().ok()
}

/// Try to take the flock without blocking. `Ok(false)` means another
/// process holds it; any other failure is a real error.
#[cfg(unix)]
fn flock_exclusive(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    if unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) } == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    match err.kind() {
        io::ErrorKind::WouldBlock => Ok(false),
        io::ErrorKind::Interrupted => Ok(false),
        _ => Err(err),
    }
}

// No advisory locking off Unix; writers rely on atomic renames alone
#[cfg(not(unix))]
fn flock_exclusive(_file: &File) -> io::Result<bool> {
    Ok(true)
}
