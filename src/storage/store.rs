//! Sharded Key-Value Store
//!
//! This module implements the public data-access contract of ZetaKV: a
//! hash-sharded map of plain string values plus a map of sorted sets, with
//! one reader-writer lock per shard.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        KvStore                              │
//! │  ┌───────────────┐ ┌───────────────┐ ┌───────────────┐     │
//! │  │    Shard 0    │ │    Shard 1    │ │    Shard N    │     │
//! │  │    RwLock     │ │    RwLock     │ │    RwLock     │     │
//! │  │  data map     │ │  data map     │ │  data map     │     │
//! │  │  sorted sets  │ │  sorted sets  │ │  sorted sets  │     │
//! │  └───────────────┘ └───────────────┘ └───────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys route to shards by hash, fixed for the store's lifetime. Readers
//! take the shard's shared lock, writers the exclusive lock; operations on
//! different shards never contend. Every store call is a single critical
//! section - no lock is ever held across two operations.
//!
//! ## Documented quirks
//!
//! Both are inherited behavior, kept on purpose:
//!
//! - A key may hold a plain value and a sorted set at the same time. The
//!   two maps live side by side in a shard with no mutual exclusion.
//! - A sorted set created by `zadd` persists even after its last member is
//!   removed; emptied sets are never reclaimed.

use crate::storage::ZSet;
use bytes::Bytes;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// Default number of shards. More shards means less lock contention at the
/// cost of memory overhead.
pub const DEFAULT_SHARD_COUNT: usize = 16;

/// The maps owned by a single shard, guarded together by one lock.
#[derive(Debug, Default)]
struct ShardData {
    /// Plain key -> value entries.
    data: HashMap<Bytes, Bytes>,
    /// Key -> sorted set entries. Lives beside `data`; see the module docs
    /// for the dual-type quirk.
    sorted_sets: HashMap<Bytes, ZSet>,
}

type Shard = RwLock<ShardData>;

/// The sharded store shared by all client connections.
///
/// Designed to be wrapped in an `Arc` and cloned across connection tasks.
/// All operations are thread-safe.
///
/// # Example
///
/// ```
/// use zetakv::storage::KvStore;
/// use bytes::Bytes;
///
/// let store = KvStore::new();
///
/// store.set(Bytes::from("name"), Bytes::from("zeta"));
/// assert_eq!(store.get(b"name"), Some(Bytes::from("zeta")));
///
/// store.zadd(Bytes::from("board"), Bytes::from("alice"), 100.0);
/// assert_eq!(store.zrank(b"board", b"alice"), Some(0));
/// ```
pub struct KvStore {
    shards: Vec<Shard>,

    /// Statistics: plain keys currently stored (approximate).
    key_count: AtomicU64,
    /// Statistics: total read operations.
    read_count: AtomicU64,
    /// Statistics: total write operations.
    write_count: AtomicU64,
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("shards", &self.shards.len())
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for KvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore {
    /// Creates a store with [`DEFAULT_SHARD_COUNT`] shards.
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT)
    }

    /// Creates a store with a fixed shard count. The count cannot change
    /// afterwards; there is no resharding.
    pub fn with_shards(shard_count: usize) -> Self {
        let shard_count = shard_count.max(1);
        let shards = (0..shard_count).map(|_| Shard::default()).collect();

        Self {
            shards,
            key_count: AtomicU64::new(0),
            read_count: AtomicU64::new(0),
            write_count: AtomicU64::new(0),
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Determines which shard a key belongs to.
    #[inline]
    fn shard(&self, key: &[u8]) -> &Shard {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }

    /// Sets a key to a value, overwriting any previous value.
    pub fn set(&self, key: Bytes, value: Bytes) {
        self.write_count.fetch_add(1, Ordering::Relaxed);

        let mut shard = self.shard(&key).write().unwrap();
        if shard.data.insert(key, value).is_none() {
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Gets the value for a key, or `None` if absent.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.shard(key).read().unwrap();
        shard.data.get(key).cloned()
    }

    /// Deletes a key. Returns `true` iff a value was present and removed.
    pub fn del(&self, key: &[u8]) -> bool {
        self.write_count.fetch_add(1, Ordering::Relaxed);

        let mut shard = self.shard(key).write().unwrap();
        if shard.data.remove(key).is_some() {
            self.key_count.fetch_sub(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Returns `true` iff the key holds a plain value.
    pub fn exists(&self, key: &[u8]) -> bool {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.shard(key).read().unwrap();
        shard.data.contains_key(key)
    }

    /// Adds a member to the sorted set at `key`, creating the set on first
    /// use. Returns `true` if the member was inserted or repositioned,
    /// `false` if it already had an identical score.
    pub fn zadd(&self, key: Bytes, member: Bytes, score: f64) -> bool {
        self.write_count.fetch_add(1, Ordering::Relaxed);

        let mut shard = self.shard(&key).write().unwrap();
        shard
            .sorted_sets
            .entry(key)
            .or_default()
            .add(member, score)
    }

    /// Removes a member from the sorted set at `key`. Returns `false` if
    /// the set or member is absent.
    pub fn zrem(&self, key: &[u8], member: &[u8]) -> bool {
        self.write_count.fetch_add(1, Ordering::Relaxed);

        let mut shard = self.shard(key).write().unwrap();
        match shard.sorted_sets.get_mut(key) {
            Some(set) => set.remove(member),
            None => false,
        }
    }

    /// Returns a member's score, or `None` if the set or member is absent.
    pub fn zscore(&self, key: &[u8], member: &[u8]) -> Option<f64> {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.shard(key).read().unwrap();
        shard.sorted_sets.get(key)?.score(member)
    }

    /// Returns a member's zero-based rank, or `None` if absent.
    pub fn zrank(&self, key: &[u8], member: &[u8]) -> Option<usize> {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.shard(key).read().unwrap();
        shard.sorted_sets.get(key)?.rank(member)
    }

    /// Returns the members at positions `start..=stop` of the sorted set,
    /// in ascending order. Negative positions count from the end. An absent
    /// key yields an empty result.
    pub fn zrange(&self, key: &[u8], start: i64, stop: i64) -> Vec<(Bytes, f64)> {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.shard(key).read().unwrap();
        match shard.sorted_sets.get(key) {
            Some(set) => set.range(start, stop),
            None => Vec::new(),
        }
    }

    /// Returns the member count of the sorted set at `key`, or 0 if absent.
    pub fn zsize(&self, key: &[u8]) -> usize {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let shard = self.shard(key).read().unwrap();
        shard.sorted_sets.get(key).map_or(0, |set| set.len())
    }

    /// Dumps every entry in the store as tagged (key, value) pairs.
    ///
    /// Plain entries appear as `STRING:<key>` -> value; sorted-set member
    /// entries as `ZSET:<key>:<member>` -> score rendered as decimal text.
    ///
    /// Shards are read-locked one at a time, so a writer may mutate a later
    /// shard after an earlier one was snapshotted - there is no global
    /// snapshot consistency. Ordering across and within shards follows
    /// hash-map iteration and is unspecified.
    pub fn all_entries(&self) -> Vec<(Bytes, Bytes)> {
        self.read_count.fetch_add(1, Ordering::Relaxed);

        let mut entries = Vec::new();

        for shard in &self.shards {
            let shard = shard.read().unwrap();

            for (key, value) in &shard.data {
                entries.push((tagged_key(b"STRING:", &[key.as_ref()]), value.clone()));
            }

            for (key, set) in &shard.sorted_sets {
                for (member, score) in set.entries() {
                    entries.push((
                        tagged_key(b"ZSET:", &[key.as_ref(), member.as_ref()]),
                        Bytes::from(score.to_string()),
                    ));
                }
            }
        }

        entries
    }

    /// Returns a statistics snapshot.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.key_count.load(Ordering::Relaxed),
            read_ops: self.read_count.load(Ordering::Relaxed),
            write_ops: self.write_count.load(Ordering::Relaxed),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy)]
pub struct StoreStats {
    /// Plain keys currently stored.
    pub keys: u64,
    /// Total read operations served.
    pub read_ops: u64,
    /// Total write operations served.
    pub write_ops: u64,
}

/// Joins a tag prefix and `:`-separated parts into a dump key.
fn tagged_key(prefix: &[u8], parts: &[&[u8]]) -> Bytes {
    let len = prefix.len() + parts.iter().map(|p| p.len() + 1).sum::<usize>();
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(prefix);
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(b':');
        }
        out.extend_from_slice(part);
    }
    Bytes::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let store = KvStore::new();

        store.set(Bytes::from("key"), Bytes::from("value"));
        assert_eq!(store.get(b"key"), Some(Bytes::from("value")));
    }

    #[test]
    fn test_get_nonexistent() {
        let store = KvStore::new();
        assert_eq!(store.get(b"nonexistent"), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = KvStore::new();

        store.set(Bytes::from("key"), Bytes::from("one"));
        store.set(Bytes::from("key"), Bytes::from("two"));
        assert_eq!(store.get(b"key"), Some(Bytes::from("two")));
        assert_eq!(store.stats().keys, 1);
    }

    #[test]
    fn test_del() {
        let store = KvStore::new();

        store.set(Bytes::from("key"), Bytes::from("value"));
        assert!(store.del(b"key"));
        assert_eq!(store.get(b"key"), None);
        assert!(!store.del(b"key"));
    }

    #[test]
    fn test_exists() {
        let store = KvStore::new();

        assert!(!store.exists(b"key"));
        store.set(Bytes::from("key"), Bytes::from("value"));
        assert!(store.exists(b"key"));
        store.del(b"key");
        assert!(!store.exists(b"key"));
    }

    #[test]
    fn test_zadd_creates_set_lazily() {
        let store = KvStore::new();

        assert_eq!(store.zsize(b"board"), 0);
        assert!(store.zadd(Bytes::from("board"), Bytes::from("alice"), 100.0));
        assert_eq!(store.zsize(b"board"), 1);
        assert_eq!(store.zscore(b"board", b"alice"), Some(100.0));
    }

    #[test]
    fn test_zset_operations_on_missing_key() {
        let store = KvStore::new();

        assert!(!store.zrem(b"missing", b"alice"));
        assert_eq!(store.zscore(b"missing", b"alice"), None);
        assert_eq!(store.zrank(b"missing", b"alice"), None);
        assert!(store.zrange(b"missing", 0, -1).is_empty());
        assert_eq!(store.zsize(b"missing"), 0);
    }

    #[test]
    fn test_emptied_zset_persists() {
        let store = KvStore::new();

        store.zadd(Bytes::from("board"), Bytes::from("alice"), 1.0);
        assert!(store.zrem(b"board", b"alice"));
        assert_eq!(store.zsize(b"board"), 0);

        // The set object stays alive and keeps working after being drained.
        assert!(store.zadd(Bytes::from("board"), Bytes::from("bob"), 2.0));
        assert_eq!(store.zrank(b"board", b"bob"), Some(0));
    }

    #[test]
    fn test_key_may_hold_value_and_zset() {
        let store = KvStore::new();

        store.set(Bytes::from("dual"), Bytes::from("plain"));
        store.zadd(Bytes::from("dual"), Bytes::from("alice"), 1.0);

        // Both live side by side; neither displaces the other.
        assert_eq!(store.get(b"dual"), Some(Bytes::from("plain")));
        assert_eq!(store.zscore(b"dual", b"alice"), Some(1.0));
    }

    #[test]
    fn test_all_entries_tagging() {
        let store = KvStore::new();

        store.set(Bytes::from("name"), Bytes::from("zeta"));
        store.zadd(Bytes::from("board"), Bytes::from("alice"), 100.0);
        store.zadd(Bytes::from("board"), Bytes::from("bob"), 2.5);

        let mut entries = store.all_entries();
        entries.sort();

        assert_eq!(
            entries,
            vec![
                (Bytes::from("STRING:name"), Bytes::from("zeta")),
                (Bytes::from("ZSET:board:alice"), Bytes::from("100")),
                (Bytes::from("ZSET:board:bob"), Bytes::from("2.5")),
            ]
        );
    }

    #[test]
    fn test_all_entries_empty() {
        let store = KvStore::new();
        assert!(store.all_entries().is_empty());
    }

    #[test]
    fn test_concurrent_disjoint_writers() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(KvStore::new());
        let mut handles = vec![];

        for t in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..200 {
                    let key = Bytes::from(format!("key-{}-{}", t, i));
                    store.set(key.clone(), Bytes::from("value"));
                    assert_eq!(store.get(&key), Some(Bytes::from("value")));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.stats().keys, 1600);
    }

    #[test]
    fn test_concurrent_zadd_same_key() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(KvStore::new());
        let mut handles = vec![];

        // All threads target one set; the shard lock serializes them and no
        // insert may be lost.
        for t in 0..4 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    let member = Bytes::from(format!("member-{}-{}", t, i));
                    assert!(store.zadd(Bytes::from("board"), member, i as f64));
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.zsize(b"board"), 400);
    }

    #[test]
    fn test_single_shard_store() {
        let store = KvStore::with_shards(1);

        store.set(Bytes::from("a"), Bytes::from("1"));
        store.set(Bytes::from("b"), Bytes::from("2"));
        assert_eq!(store.get(b"a"), Some(Bytes::from("1")));
        assert_eq!(store.get(b"b"), Some(Bytes::from("2")));
    }
}
