//! Collection Module
//!
//! A named, directory-backed namespace of key-value items.
//!
//! ## Responsibilities
//! - Map a collection name to a directory under the configured root
//! - Map each key to one file inside that directory
//! - Serialize access to each item through the lock registry
//! - Provide the CRUD protocol: put / get / has / remove / list / flush
//!
//! ## On-Disk Layout
//! ```text
//! {root_dir}/
//!   └── _sc_users/            ({prefix}{sanitized name})
//!         ├── john.bin        ({key}{extension})
//!         ├── jane.bin
//!         └── jane.bin.tmp    (in-flight write, renamed over jane.bin)
//! ```
//!
//! ## Lock Order
//! ```text
//! gate (collection dir, shared) ──► item lock (shared for get, exclusive for put/remove)
//! gate (collection dir, exclusive) ──► nested gates (exclusive, path order) ── flush
//! ```

mod handle;
mod layout;

pub use handle::Collection;

pub(crate) use layout::TEMP_SUFFIX;
