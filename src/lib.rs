//! # ChainKV
//!
//! A persistent key-value index stored entirely inside a single seekable
//! byte stream (a file or an in-memory buffer): a disk-backed hash table
//! using separate chaining, where the bucket directory is a fixed-size
//! array and collision chains plus variable-length payloads are appended
//! to a growing log region.
//!
//! ## On-Disk Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (12 bytes)                                            │
//! │   Count: u32 (4) | BucketCount: u32 (4) | PrehashLen: i32 (4)│
//! ├──────────────────────────────────────────────────────────────┤
//! │ Bucket Directory (BucketCount × 48 bytes)                    │
//! │   One 48-byte head-slot record per bucket; an all-zero       │
//! │   record marks an unoccupied bucket.                         │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Log Region (variable, append-only)                           │
//! │   Overflow records + key bytes + value bytes. Never          │
//! │   compacted; superseded runs stay behind as orphans until    │
//! │   a full clear().                                            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Points
//!
//! - Keys route to a bucket via a truncated DJB2 prehash: only the first
//!   `prehash_length` bytes of the key are hashed, which keeps routing
//!   cheap for short keys at the cost of more same-bucket collisions for
//!   shared prefixes. Full-key equality is always verified after a hash
//!   match, so truncation affects performance, never correctness.
//! - Value encoding is a pluggable [`ValueCodec`]; the engine treats
//!   encoded bytes as opaque. [`BincodeCodec`] is the bundled default.
//! - Strictly single-threaded: one shared stream cursor, synchronous
//!   blocking I/O, external locking required for cross-thread use.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod hash;
pub mod record;
pub mod stream;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use codec::{BincodeCodec, ValueCodec};
pub use config::StoreConfig;
pub use error::{ChainError, Result};
pub use record::Record;
pub use store::ChainStore;
pub use stream::BackingStream;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ChainKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
