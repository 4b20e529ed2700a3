//! # ZetaKV - An In-Memory Key-Value Store with Sorted Sets
//!
//! ZetaKV is an in-memory key-value database written in Rust. Alongside
//! plain string keys it offers sorted sets ("ZSets") backed by a skip list,
//! giving ordered iteration, rank queries, and range scans over scored
//! members.
//!
//! ## Features
//!
//! - **Sorted Sets**: Skip-list-backed ZSets ordered by (score, member)
//! - **Concurrent Storage**: Sharded key space with one RwLock per shard
//! - **Simple Protocol**: Plain-text command lines in, RESP-framed replies out
//! - **Async I/O**: Built on Tokio, one task per connection
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             ZetaKV                               │
//! │                                                                  │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐           │
//! │  │ TCP Server  │───>│ Connection  │───>│  Command    │           │
//! │  │ (Listener)  │    │  Handler    │    │  Handler    │           │
//! │  └─────────────┘    └─────────────┘    └──────┬──────┘           │
//! │                                               │                  │
//! │                                               ▼                  │
//! │  ┌─────────────┐    ┌───────────────────────────────────────┐    │
//! │  │    Line     │    │                KvStore                │    │
//! │  │   Parser    │    │  ┌────────┐ ┌────────┐ ┌────────┐     │    │
//! │  │             │    │  │Shard 0 │ │Shard 1 │ │...N    │     │    │
//! │  └─────────────┘    │  │RwLock  │ │RwLock  │ │shards  │     │    │
//! │                     │  └────────┘ └────────┘ └────────┘     │    │
//! │                     │   each shard: HashMap + ZSet map      │    │
//! │                     └───────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use zetakv::server::Server;
//! use zetakv::storage::KvStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = Arc::new(KvStore::new());
//!     let (server, shutdown) = Server::bind("127.0.0.1:7379".parse().unwrap(), store).await?;
//!
//!     tokio::spawn(async move {
//!         tokio::signal::ctrl_c().await.ok();
//!         shutdown.stop();
//!     });
//!
//!     server.run().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Commands
//!
//! ### String Commands
//! - `SET key value`
//! - `GET key`
//! - `DELETE key`
//! - `EXISTS key`
//! - `ALL`
//!
//! ### Sorted Set Commands
//! - `ZADD key member score`
//! - `ZREM key member`
//! - `ZSCORE key member`
//! - `ZRANK key member`
//! - `ZRANGE key start stop`
//! - `ZSIZE key`
//!
//! ## Module Overview
//!
//! - [`protocol`]: line parser for requests, RESP-style reply encoding
//! - [`storage`]: sharded store and the skip-list sorted set
//! - [`commands`]: dispatch and execution of the supported commands
//! - [`connection`]: per-client connection loop
//! - [`server`]: listener, accept loop, graceful shutdown
//!
//! ## Design Highlights
//!
//! ### Thread Safety
//!
//! Keys hash onto a fixed set of shards, each guarded by its own RwLock.
//! Reads on a shard proceed in parallel; a write blocks only its own shard.
//!
//! ### Skip-List Sorted Sets
//!
//! Each ZSet keeps its members in a skip list ordered by score (ties broken
//! by member bytes), so range scans walk the bottom level in order while
//! inserts and removals stay logarithmic in expectation.

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::CommandHandler;
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{CommandParser, ParseError, Reply};
pub use server::{Server, ShutdownHandle};
pub use storage::{KvStore, ZSet};

/// The default port ZetaKV listens on
pub const DEFAULT_PORT: u16 = 7379;

/// The default host ZetaKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of ZetaKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
