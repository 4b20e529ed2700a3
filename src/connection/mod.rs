//! Connection Management Module
//!
//! Each accepted TCP connection runs in its own tokio task and is driven by
//! a [`ConnectionHandler`]: read bytes into a buffer, parse complete command
//! lines, execute them, write back encoded replies.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! Accept → Read → Parse → Execute → Respond
//!            ▲                         │
//!            └─────────────────────────┘
//!                 (loop until EOF)
//! ```
//!
//! Command-level errors (unknown command, bad arguments) are sent back as
//! error replies and the loop continues. Framing-level errors (an
//! unterminated line past the size cap) terminate the connection.

pub mod handler;

// Re-export main types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
