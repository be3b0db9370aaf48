//! Lock Registry Module
//!
//! Process-wide table of reader/writer locks, one per filesystem path.
//!
//! ## Responsibilities
//! - Hand out the same lock for the same path to every caller
//! - Create entries lazily, never remove them
//! - Keep operations on different paths independent
//!
//! ## Lifecycle
//! ```text
//! process start ──► empty ──► acquire(p) inserts p ──► ... ──► process exit
//!                               (entries only ever grow)
//! ```
//!
//! The registry guards intra-process access only. Two processes opening
//! the same directory are not coordinated.

mod registry;

pub use registry::{LockRegistry, PathLock};
