//! Wire Protocol Implementation
//!
//! ZetaKV speaks an asymmetric protocol: requests are plain text lines of
//! space-separated tokens, replies use a RESP-style framed encoding.
//!
//! ## Modules
//!
//! - `types`: the [`Reply`] enum and its wire serialization
//! - `parser`: the incremental line parser for incoming commands
//!
//! ## Example
//!
//! ```
//! use zetakv::protocol::{CommandParser, Reply};
//! use bytes::Bytes;
//!
//! // Parsing an incoming command line
//! let mut parser = CommandParser::new();
//! let (tokens, _) = parser.parse(b"GET name\r\n").unwrap().unwrap();
//! assert_eq!(tokens[0], Bytes::from("GET"));
//!
//! // Encoding a reply
//! let reply = Reply::bulk_string(Bytes::from("zeta"));
//! assert_eq!(reply.serialize(), b"$4\r\nzeta\r\n");
//! ```

pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use parser::{CommandParser, ParseError, ParseResult, MAX_LINE_LENGTH};
pub use types::Reply;
