//! Command Processing Module
//!
//! This module is the bridge between the wire protocol and the storage
//! engine: it receives tokenized command lines, executes them against the
//! [`KvStore`](crate::storage::KvStore), and returns the reply to encode.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │  Line Parser    │  (protocol module)
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (this module)
//! │                 │
//! │  - Dispatch     │
//! │  - Validate     │
//! │  - Execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    KvStore      │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `SET key value`, `GET key`, `DELETE key`, `EXISTS key`
//! - `ALL` - dump every entry with tagged keys
//! - `ZADD key member score`, `ZREM key member`
//! - `ZSCORE key member`, `ZRANK key member`
//! - `ZRANGE key start stop`, `ZSIZE key`

pub mod handler;

// Re-export the main command handler
pub use handler::CommandHandler;
