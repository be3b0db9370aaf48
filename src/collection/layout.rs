//! Collection Layout
//!
//! Path and naming helpers: collection name → directory, key → file name,
//! file name → key.

use std::path::PathBuf;

use crate::error::{Result, SnapError};

/// Suffix for in-flight writes; never ends with the item extension
pub(crate) const TEMP_SUFFIX: &str = ".tmp";

/// Build the relative directory path for a collection name
///
/// Separators (`/` and `\`) are normalized, empty and `.` components are
/// dropped and `..` pops the previous component without ever climbing
/// above the collection root. The prefix is applied to the first
/// remaining component.
///
/// "users"          → "_sc_users"
/// "team/../users"  → "_sc_users"
/// "../../etc"      → "_sc_etc"
/// "a\\b"           → "_sc_a/b"
pub(crate) fn collection_dir(prefix: &str, name: &str) -> Result<PathBuf> {
    if name.is_empty() {
        return Err(SnapError::InvalidArgument(
            "Collection name can not be empty".to_string(),
        ));
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in name.split(|c: char| c == '/' || c == '\\') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    let (first, rest) = parts.split_first().ok_or_else(|| {
        SnapError::InvalidArgument(format!(
            "Collection name {:?} has no usable path component",
            name
        ))
    })?;

    let mut dir = PathBuf::from(format!("{}{}", prefix, first));
    dir.extend(rest);
    Ok(dir)
}

/// Reject keys that cannot map 1:1 to a single file in the collection
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(SnapError::InvalidArgument(
            "Key can not be empty".to_string(),
        ));
    }
    if key == "." || key == ".." || key.contains(['/', '\\', '\0']) {
        return Err(SnapError::InvalidArgument(format!(
            "Key {:?} must be a single file name",
            key
        )));
    }
    Ok(())
}

/// "john" + ".bin" → "john.bin"
pub(crate) fn item_file_name(key: &str, extension: &str) -> String {
    format!("{}{}", key, extension)
}

/// "john.bin" → "john.bin.tmp"
pub(crate) fn temp_file_name(key: &str, extension: &str) -> String {
    format!("{}{}{}", key, extension, TEMP_SUFFIX)
}

/// "john.bin" → Some("john")
///
/// Exact suffix removal: a key that itself ends in extension characters
/// ("bin.bin" → "bin") is preserved. Names without the extension and names
/// that are only the extension are not items.
pub(crate) fn key_from_file_name<'a>(file_name: &'a str, extension: &str) -> Option<&'a str> {
    file_name
        .strip_suffix(extension)
        .filter(|key| !key.is_empty())
}
