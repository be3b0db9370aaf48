//! Configuration for SnapKV
//!
//! Per-collection options with sensible defaults.

use std::path::PathBuf;

use crate::error::{Result, SnapError};

/// Configuration used when opening a collection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Layout Configuration
    // -------------------------------------------------------------------------
    /// Directory under which collection directories are created
    /// Internal structure:
    ///   {root_dir}/
    ///     └── {prefix}{name}/
    ///           ├── {key}{extension}
    ///           └── ...
    pub root_dir: PathBuf,

    /// Marker prepended to every collection directory name
    pub prefix: String,

    /// Suffix appended to every key to form its file name
    pub extension: String,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// fsync each item file before it replaces the previous value
    pub sync_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            prefix: "_sc_".to_string(),
            extension: ".bin".to_string(),
            sync_writes: false,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the layout options can produce sane file names
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() {
            return Err(SnapError::Config(
                "extension can not be empty".to_string(),
            ));
        }
        if has_separator(&self.extension) {
            return Err(SnapError::Config(format!(
                "extension {:?} must not contain a path separator",
                self.extension
            )));
        }
        if self.extension.ends_with(crate::collection::TEMP_SUFFIX) {
            return Err(SnapError::Config(format!(
                "extension {:?} collides with the temp file suffix",
                self.extension
            )));
        }
        if has_separator(&self.prefix) {
            return Err(SnapError::Config(format!(
                "prefix {:?} must not contain a path separator",
                self.prefix
            )));
        }
        Ok(())
    }
}

fn has_separator(s: &str) -> bool {
    s.contains('/') || s.contains('\\')
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the root directory collections live under
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the collection directory prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.prefix = prefix.into();
        self
    }

    /// Set the item file extension (including the leading dot)
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = extension.into();
        self
    }

    /// Enable or disable fsync on every put
    pub fn sync_writes(mut self, enabled: bool) -> Self {
        self.config.sync_writes = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
