//! Storage Engine Module
//!
//! This module provides the core storage functionality for ZetaKV: a
//! thread-safe, sharded key-value store and the skip-list sorted set it
//! hosts per key.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        KvStore                              │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ ...N    │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ shards  │           │
//! │  │ values  │ │ values  │ │ values  │ │         │           │
//! │  │ zsets   │ │ zsets   │ │ zsets   │ │         │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Sharded Storage**: independent shards reduce lock contention
//! - **RwLock**: multiple concurrent readers, exclusive writers
//! - **Sorted Sets**: skip-list ZSets with rank and range queries
//!
//! ## Example
//!
//! ```
//! use zetakv::storage::KvStore;
//! use bytes::Bytes;
//!
//! let store = KvStore::new();
//!
//! store.set(Bytes::from("name"), Bytes::from("zeta"));
//! assert_eq!(store.get(b"name"), Some(Bytes::from("zeta")));
//!
//! store.zadd(Bytes::from("board"), Bytes::from("alice"), 100.0);
//! store.zadd(Bytes::from("board"), Bytes::from("bob"), 200.0);
//! assert_eq!(store.zrank(b"board", b"bob"), Some(1));
//! ```

pub mod store;
pub mod zset;

// Re-export commonly used types
pub use store::{KvStore, StoreStats, DEFAULT_SHARD_COUNT};
pub use zset::{ZSet, MAX_LEVEL};
