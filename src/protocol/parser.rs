//! Line Command Parser
//!
//! Commands arrive as one line of space-separated tokens terminated by a
//! newline (a trailing `\r` before the `\n` is tolerated, so both LF and
//! CRLF clients work). The parser is incremental: it is handed the raw read
//! buffer and returns either a complete token list with the number of bytes
//! consumed, or a signal that more data is needed.
//!
//! Tokens are opaque byte strings. Keys, values, and members may contain any
//! bytes other than ASCII whitespace; the parser never requires UTF-8.
//!
//! ## How the Parser Works
//!
//! - `Ok(Some((tokens, consumed)))` - a full line was parsed; `consumed`
//!   bytes should be dropped from the front of the buffer
//! - `Ok(None)` - no newline yet, the line is incomplete
//! - `Err(ParseError)` - the line exceeds the size cap
//!
//! A blank line parses successfully into an empty token list; the command
//! layer answers it with an error reply so the connection stays open.

use bytes::Bytes;
use thiserror::Error;

/// Maximum length of a single command line (64 KB).
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Errors that can occur while parsing a command line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    /// The line exceeds [`MAX_LINE_LENGTH`]
    #[error("command line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An incremental parser for line-based commands.
///
/// # Example
///
/// ```
/// use zetakv::protocol::CommandParser;
///
/// let mut parser = CommandParser::new();
/// let (tokens, consumed) = parser.parse(b"SET name zeta\r\n").unwrap().unwrap();
/// assert_eq!(consumed, 15);
/// assert_eq!(tokens.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct CommandParser;

impl CommandParser {
    /// Creates a new parser instance.
    pub fn new() -> Self {
        Self
    }

    /// Attempts to parse one command line from the buffer.
    pub fn parse(&mut self, buf: &[u8]) -> ParseResult<Option<(Vec<Bytes>, usize)>> {
        let newline = match buf.iter().position(|&b| b == b'\n') {
            Some(pos) => pos,
            None => {
                // No terminator yet. Refuse to buffer without bound.
                if buf.len() > MAX_LINE_LENGTH {
                    return Err(ParseError::LineTooLong {
                        size: buf.len(),
                        max: MAX_LINE_LENGTH,
                    });
                }
                return Ok(None);
            }
        };

        if newline > MAX_LINE_LENGTH {
            return Err(ParseError::LineTooLong {
                size: newline,
                max: MAX_LINE_LENGTH,
            });
        }

        let mut line = &buf[..newline];
        if line.last() == Some(&b'\r') {
            line = &line[..line.len() - 1];
        }

        let tokens = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|token| !token.is_empty())
            .map(Bytes::copy_from_slice)
            .collect();

        Ok(Some((tokens, newline + 1)))
    }
}
