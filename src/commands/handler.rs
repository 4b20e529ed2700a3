//! Command Handler
//!
//! Receives tokenized command lines, validates them, executes them against
//! the [`KvStore`], and produces the reply to encode.
//!
//! ## Error discipline
//!
//! Protocol-level problems - empty lines, unknown commands, wrong argument
//! counts, malformed numbers - come back as error replies. Absence of a key
//! or member is not an error: it is a null, `0`, or `false`-shaped reply.
//! Nothing here ever terminates the connection.

use crate::protocol::Reply;
use crate::storage::KvStore;
use bytes::Bytes;
use std::sync::Arc;

/// Executes commands against the shared store.
#[derive(Clone)]
pub struct CommandHandler {
    store: Arc<KvStore>,
}

impl CommandHandler {
    /// Creates a new command handler backed by the given store.
    pub fn new(store: Arc<KvStore>) -> Self {
        Self { store }
    }

    /// Executes one tokenized command line and returns the reply.
    pub fn execute(&self, tokens: &[Bytes]) -> Reply {
        let Some(first) = tokens.first() else {
            return Reply::error("ERR empty command");
        };

        let name = match std::str::from_utf8(first) {
            Ok(s) => s.to_uppercase(),
            Err(_) => return Reply::error("ERR invalid command name"),
        };

        let args = &tokens[1..];
        match name.as_str() {
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            "DELETE" => self.cmd_delete(args),
            "EXISTS" => self.cmd_exists(args),
            "ALL" => self.cmd_all(args),
            "ZADD" => self.cmd_zadd(args),
            "ZREM" => self.cmd_zrem(args),
            "ZSCORE" => self.cmd_zscore(args),
            "ZRANK" => self.cmd_zrank(args),
            "ZRANGE" => self.cmd_zrange(args),
            "ZSIZE" => self.cmd_zsize(args),
            _ => Reply::error(format!("ERR unknown command '{}'", name)),
        }
    }

    /// SET key value
    fn cmd_set(&self, args: &[Bytes]) -> Reply {
        let [key, value] = args else {
            return wrong_arity("SET");
        };

        self.store.set(key.clone(), value.clone());
        Reply::ok()
    }

    /// GET key
    fn cmd_get(&self, args: &[Bytes]) -> Reply {
        let [key] = args else {
            return wrong_arity("GET");
        };

        match self.store.get(key) {
            Some(value) => Reply::bulk_string(value),
            None => Reply::null(),
        }
    }

    /// DELETE key
    fn cmd_delete(&self, args: &[Bytes]) -> Reply {
        let [key] = args else {
            return wrong_arity("DELETE");
        };

        Reply::integer(self.store.del(key) as i64)
    }

    /// EXISTS key
    fn cmd_exists(&self, args: &[Bytes]) -> Reply {
        let [key] = args else {
            return wrong_arity("EXISTS");
        };

        Reply::integer(self.store.exists(key) as i64)
    }

    /// ALL
    ///
    /// Dumps every entry as alternating tagged-key/value bulk strings, or a
    /// null reply when the store is empty.
    fn cmd_all(&self, args: &[Bytes]) -> Reply {
        if !args.is_empty() {
            return wrong_arity("ALL");
        }

        let entries = self.store.all_entries();
        if entries.is_empty() {
            return Reply::null();
        }

        let mut values = Vec::with_capacity(entries.len() * 2);
        for (tagged_key, value) in entries {
            values.push(Reply::bulk_string(tagged_key));
            values.push(Reply::bulk_string(value));
        }
        Reply::array(values)
    }

    /// ZADD key member score
    fn cmd_zadd(&self, args: &[Bytes]) -> Reply {
        let [key, member, score] = args else {
            return wrong_arity("ZADD");
        };

        let Some(score) = parse_float(score) else {
            return Reply::error("ERR score must be a valid number");
        };

        let added = self.store.zadd(key.clone(), member.clone(), score);
        Reply::integer(added as i64)
    }

    /// ZREM key member
    fn cmd_zrem(&self, args: &[Bytes]) -> Reply {
        let [key, member] = args else {
            return wrong_arity("ZREM");
        };

        Reply::integer(self.store.zrem(key, member) as i64)
    }

    /// ZSCORE key member
    fn cmd_zscore(&self, args: &[Bytes]) -> Reply {
        let [key, member] = args else {
            return wrong_arity("ZSCORE");
        };

        match self.store.zscore(key, member) {
            Some(score) => Reply::bulk_string(score.to_string()),
            None => Reply::null(),
        }
    }

    /// ZRANK key member
    fn cmd_zrank(&self, args: &[Bytes]) -> Reply {
        let [key, member] = args else {
            return wrong_arity("ZRANK");
        };

        match self.store.zrank(key, member) {
            Some(rank) => Reply::integer(rank as i64),
            None => Reply::null(),
        }
    }

    /// ZRANGE key start stop
    ///
    /// Returns alternating member/score bulk strings in ascending order, or
    /// a null reply when the range is empty.
    fn cmd_zrange(&self, args: &[Bytes]) -> Reply {
        let [key, start, stop] = args else {
            return wrong_arity("ZRANGE");
        };

        let (Some(start), Some(stop)) = (parse_int(start), parse_int(stop)) else {
            return Reply::error("ERR start and stop must be valid integers");
        };

        let range = self.store.zrange(key, start, stop);
        if range.is_empty() {
            return Reply::null();
        }

        let mut values = Vec::with_capacity(range.len() * 2);
        for (member, score) in range {
            values.push(Reply::bulk_string(member));
            values.push(Reply::bulk_string(score.to_string()));
        }
        Reply::array(values)
    }

    /// ZSIZE key
    fn cmd_zsize(&self, args: &[Bytes]) -> Reply {
        let [key] = args else {
            return wrong_arity("ZSIZE");
        };

        Reply::integer(self.store.zsize(key) as i64)
    }
}

fn wrong_arity(cmd: &str) -> Reply {
    Reply::error(format!("ERR wrong number of arguments for '{}' command", cmd))
}

fn parse_float(token: &Bytes) -> Option<f64> {
    std::str::from_utf8(token).ok()?.parse().ok()
}

fn parse_int(token: &Bytes) -> Option<i64> {
    std::str::from_utf8(token).ok()?.parse().ok()
}
