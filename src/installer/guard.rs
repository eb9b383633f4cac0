//! Cleanup of partially installed versions

use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Stop signal for blocking work that writes into a pending install.
///
/// The flag cannot be raised while a [`StopFlag::run`] closure is executing,
/// so once [`StopFlag::stop`] returns no further writes happen.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<Mutex<bool>>);

impl StopFlag {
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Run `work` unless the flag has been raised
    pub fn run<T>(&self, work: impl FnOnce() -> T) -> Option<T> {
        let stopped = self.lock();
        if *stopped {
            return None;
        }
        Some(work())
    }

    /// Raise the flag, waiting for any running closure to finish
    pub fn stop(&self) {
        *self.lock() = true;
    }

    pub fn is_stopped(&self) -> bool {
        *self.lock()
    }
}

/// A version directory created by this run that is not yet usable.
///
/// Dropping the guard without calling [`PendingInstall::commit`] removes the
/// directory, so a retry starts from a clean slate. That covers error
/// returns, panics and a cancelled activation future.
#[derive(Debug)]
pub struct PendingInstall {
    dir: Option<PathBuf>,
    stop: StopFlag,
}

impl PendingInstall {
    /// Take responsibility for a freshly created version directory
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir: Some(dir),
            stop: StopFlag::default(),
        }
    }

    /// Flag raised when the guard is dropped uncommitted
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    /// The release is in place; keep the directory
    pub fn commit(mut self) {
        self.dir = None;
    }
}

impl Drop for PendingInstall {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        // Background extraction must be quiet before the tree goes away
        self.stop.stop();

        tracing::info!("Cleaning up {}", dir.display());
        match std::fs::remove_dir_all(&dir) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to clean up {}: {}", dir.display(), e),
        }
    }
}
