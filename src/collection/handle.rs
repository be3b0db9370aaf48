//! Collection handle
//!
//! Every call re-derives its answer from the filesystem; the handle only
//! remembers where its directory is.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{BincodeCodec, Codec};
use crate::config::Config;
use crate::error::{Result, SnapError};
use crate::lock::{LockRegistry, PathLock};

use super::layout;

/// Handle to one collection directory
///
/// ## Concurrency:
/// - `put` / `remove`: exclusive lock on the item path
/// - `get`: shared lock on the item path
/// - `has`: no lock (best-effort existence probe)
/// - `list`: shared lock on the collection gate
/// - `flush`: exclusive lock on the collection gate and on the gate of
///   every nested collection directory, which waits for in-flight item
///   operations and holds off new ones
///
/// Locks come from the process-wide [`LockRegistry`], so two handles
/// opened on the same collection coordinate with each other.
#[derive(Debug)]
pub struct Collection<C: Codec = BincodeCodec> {
    /// Name as given by the caller
    name: String,

    /// Canonical absolute path of the collection directory
    dir: PathBuf,

    config: Config,

    codec: C,

    registry: &'static LockRegistry,
}

impl Collection<BincodeCodec> {
    /// Open (or create) a collection under the working directory
    pub fn open(name: &str) -> Result<Self> {
        Self::open_with(name, Config::default())
    }

    /// Open (or create) a collection with an explicit config
    pub fn open_with(name: &str, config: Config) -> Result<Self> {
        Self::with_codec(name, config, BincodeCodec)
    }
}

impl<C: Codec> Collection<C> {
    /// Open (or create) a collection that stores values with `codec`
    ///
    /// Creates `{root_dir}/{prefix}{name}` if it does not exist yet.
    /// Opening an existing collection is not an error.
    pub fn with_codec(name: &str, config: Config, codec: C) -> Result<Self> {
        config.validate()?;
        let relative = layout::collection_dir(&config.prefix, name)?;
        let dir = config.root_dir.join(relative);

        create_dir_all(&dir)?;
        let dir = fs::canonicalize(&dir)?;

        tracing::debug!(collection = name, dir = %dir.display(), "opened collection");

        Ok(Self {
            name: name.to_string(),
            dir,
            config,
            codec,
            registry: LockRegistry::global(),
        })
    }

    /// Store `value` under `key`, replacing any previous value
    ///
    /// The value is encoded before any file is touched, then written to a
    /// temp file that is renamed over the item. A failed encode leaves the
    /// collection unchanged; readers never see a partial value.
    pub fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        layout::validate_key(key)?;
        let path = self.item_path_unchecked(key);

        let bytes = self.codec.encode(value)?;

        let gate = self.gate();
        let _gate = gate.read();
        let lock = self.registry.acquire(&path);
        let _guard = lock.write();

        self.write_atomic(key, &path, &bytes)?;

        tracing::trace!(key, path = %path.display(), bytes = bytes.len(), "put");
        Ok(())
    }

    /// Fetch and decode the value stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        layout::validate_key(key)?;
        let path = self.item_path_unchecked(key);

        let gate = self.gate();
        let _gate = gate.read();
        let lock = self.registry.acquire(&path);
        let _guard = lock.read();

        if !path.is_file() {
            return Err(SnapError::NotFound(key.to_string()));
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SnapError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::trace!(key, path = %path.display(), bytes = bytes.len(), "get");
        self.codec.decode(&bytes)
    }

    /// Decode the value stored under `key` into `out`
    ///
    /// `out` is left untouched on any error.
    pub fn get_into<T: DeserializeOwned>(&self, key: &str, out: &mut T) -> Result<()> {
        *out = self.get(key)?;
        Ok(())
    }

    /// Whether an item exists for `key`
    ///
    /// Takes no lock, so the answer may be stale by the time it is used.
    /// Invalid keys and stat errors both report `false`.
    pub fn has(&self, key: &str) -> bool {
        if layout::validate_key(key).is_err() {
            return false;
        }
        fs::metadata(self.item_path_unchecked(key))
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    /// Delete the item stored under `key`
    pub fn remove(&self, key: &str) -> Result<()> {
        layout::validate_key(key)?;
        let path = self.item_path_unchecked(key);

        let gate = self.gate();
        let _gate = gate.read();
        let lock = self.registry.acquire(&path);
        let _guard = lock.write();

        if !path.is_file() {
            return Err(SnapError::NotFound(key.to_string()));
        }

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SnapError::NotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::trace!(key, path = %path.display(), "remove");
        Ok(())
    }

    /// Delete the collection directory and every item in it
    ///
    /// Nested collections (opened as `"{name}/child"`) live inside this
    /// directory and are removed too; their gates are taken as well, so
    /// the flush waits for their in-flight operations. Flushing a
    /// collection that is already gone succeeds. Item operations issued
    /// afterwards fail until the collection is opened again.
    pub fn flush(&self) -> Result<()> {
        let gate = self.gate();
        let _gate = gate.write();

        // Parent gate first, then children in path order
        let nested: Vec<PathLock> = nested_dirs(&self.dir)?
            .iter()
            .map(|dir| self.registry.acquire(dir))
            .collect();
        let _nested: Vec<_> = nested.iter().map(|lock| lock.write()).collect();

        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {
                tracing::debug!(
                    collection = %self.name,
                    dir = %self.dir.display(),
                    nested = nested.len(),
                    "flushed collection"
                );
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Keys of every item, in directory iteration order
    ///
    /// A flushed (absent) collection lists as empty.
    pub fn list(&self) -> Result<Vec<String>> {
        let gate = self.gate();
        let _gate = gate.read();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            // Keys are strings, so a non-UTF-8 name was never written by us
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };

            if let Some(key) = layout::key_from_file_name(file_name, &self.config.extension) {
                keys.push(key.to_string());
            }
        }

        Ok(keys)
    }

    /// Number of items; any listing error counts as zero
    pub fn total_item(&self) -> usize {
        self.list().map(|keys| keys.len()).unwrap_or(0)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Name the collection was opened with
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical path of the collection directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// File path that holds (or would hold) the item for `key`
    pub fn item_path(&self, key: &str) -> Result<PathBuf> {
        layout::validate_key(key)?;
        Ok(self.item_path_unchecked(key))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn item_path_unchecked(&self, key: &str) -> PathBuf {
        self.dir
            .join(layout::item_file_name(key, &self.config.extension))
    }

    /// Lock shared by every item operation on this directory
    fn gate(&self) -> PathLock {
        self.registry.acquire(&self.dir)
    }

    /// Write `bytes` to a temp file next to `path`, then rename it over `path`
    ///
    /// Caller must hold the exclusive item lock, which also makes the temp
    /// name unique within the process.
    fn write_atomic(&self, key: &str, path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp_path = self
            .dir
            .join(layout::temp_file_name(key, &self.config.extension));

        let result = self
            .write_temp(&tmp_path, bytes)
            .and_then(|()| fs::rename(&tmp_path, path));

        if let Err(e) = result {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        path = %tmp_path.display(),
                        error = %cleanup,
                        "failed to remove temp file"
                    );
                }
            }
            return Err(e.into());
        }

        Ok(())
    }

    fn write_temp(&self, tmp_path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(tmp_path)?;

        file.write_all(bytes)?;
        if self.config.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }
}

/// Every directory below `dir`, sorted; an absent `dir` has none
fn nested_dirs(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = match fs::read_dir(&current) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                let path = entry.path();
                pending.push(path.clone());
                found.push(path);
            }
        }
    }

    found.sort();
    Ok(found)
}

/// Create `dir` and its parents with 0755 permissions
#[cfg(unix)]
fn create_dir_all(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_dir_all(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}
