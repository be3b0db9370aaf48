//! # SnapKV
//!
//! An embedded, filesystem-backed key-value store with:
//! - Named collections, one directory each
//! - One file per item, written atomically (temp file + rename)
//! - Per-item reader/writer locking shared across the whole process
//! - Pluggable serialization (bincode by default)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Collection                            │
//! │        put / get / has / remove / list / flush               │
//! └──────────┬──────────────────────┬──────────────────┬────────┘
//!            │                      │                  │
//!            ▼                      ▼                  ▼
//!   ┌─────────────────┐    ┌─────────────────┐  ┌─────────────┐
//!   │  Lock Registry  │    │      Codec      │  │  Filesystem │
//!   │ (path → RwLock) │    │ (encode/decode) │  │ (1 file per │
//!   └─────────────────┘    └─────────────────┘  │    item)    │
//!                                               └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use snapkv::Collection;
//!
//! let users = Collection::open("users")?;
//! users.put("john", &"john.doe@mail.com".to_string())?;
//!
//! let email: String = users.get("john")?;
//! assert_eq!(email, "john.doe@mail.com");
//! # Ok::<(), snapkv::SnapError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod lock;
pub mod collection;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SnapError, Result};
pub use config::Config;
pub use codec::{BincodeCodec, Codec};
pub use collection::Collection;
pub use lock::LockRegistry;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SnapKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
