//! Lock Registry implementation
//!
//! HashMap of path → lock, guarded by a single coordination Mutex.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

/// A shared reader/writer lock for one path
///
/// Holds no data; the guarded resource is the file or directory at the path.
pub type PathLock = Arc<RwLock<()>>;

/// Registry shared by every collection in the process
static GLOBAL: Lazy<LockRegistry> = Lazy::new(LockRegistry::new);

/// Maps fully-qualified paths to reader/writer locks
///
/// ## Concurrency:
/// - `locks`: Protected by a Mutex held only for the get-or-create step
/// - Returned locks are `Arc`s, so callers block on the path lock
///   without holding the registry
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<PathBuf, PathLock>>,
}

impl LockRegistry {
    /// Create an empty, isolated registry
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static LockRegistry {
        &GLOBAL
    }

    /// Get the lock for `path`, creating it on first use
    ///
    /// Lookup and insertion happen in one critical section, so concurrent
    /// first callers for the same path always receive the same lock.
    pub fn acquire(&self, path: &Path) -> PathLock {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(path) {
            return Arc::clone(lock);
        }

        tracing::trace!(path = %path.display(), "registering path lock");
        let lock = Arc::new(RwLock::new(()));
        locks.insert(path.to_path_buf(), Arc::clone(&lock));
        lock
    }

    /// Number of paths that have ever been registered
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }

    /// Whether `path` already has a lock
    pub fn contains(&self, path: &Path) -> bool {
        self.locks.lock().contains_key(path)
    }
}
