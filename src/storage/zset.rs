//! Skip-List Backed Sorted Set
//!
//! This module implements the ZSet, an ordered collection of (member, score)
//! pairs. Members are unique; the total order is `(score, member)` ascending,
//! with the member bytes as a lexicographic tie-break for equal scores.
//!
//! ## Structure
//!
//! ```text
//! level 3  HEAD ──────────────────────────> (dave, 250) ──> ∅
//! level 2  HEAD ──────────> (bob, 200) ───> (dave, 250) ──> ∅
//! level 1  HEAD ──────────> (bob, 200) ───> (dave, 250) ──> ∅
//! level 0  HEAD ─> (alice, 100) ─> (bob, 200) ─> (charlie, 220) ─> (dave, 250) ─> ∅
//!                     ▲
//!                     │ member index (O(1) point lookup)
//!              { "alice" -> slot, "bob" -> slot, ... }
//! ```
//!
//! Each node participates in `height` levels, where `height` is drawn from a
//! geometric distribution (p = 0.5) capped at [`MAX_LEVEL`]. Searches descend
//! from the highest active level, giving expected O(log n) inserts and
//! removals.
//!
//! ## Ownership
//!
//! Nodes live in an arena (`Vec<Node>`) and link to each other through arena
//! slot indices rather than pointers. Unlinked slots go onto a free list and
//! are recycled by later inserts, so a forward link can never dangle: a slot
//! is only reused after every link to it has been rewritten.

use bytes::Bytes;
use rand::Rng;
use std::collections::HashMap;

/// Maximum number of levels a node can participate in.
pub const MAX_LEVEL: usize = 16;

/// Probability that a node is promoted to each additional level.
const LEVEL_PROBABILITY: f64 = 0.5;

/// Arena slot of the head sentinel. The head has an empty member, a score of
/// negative infinity, and participates in all [`MAX_LEVEL`] levels.
const HEAD: usize = 0;

/// A single skip-list node.
///
/// `forward.len()` is the node's own height: the number of levels it
/// participates in. This is independent of the list's active level.
#[derive(Debug)]
struct Node {
    member: Bytes,
    score: f64,
    /// Forward link per level `0..height`; `None` marks the end of a level.
    forward: Vec<Option<usize>>,
}

/// An ordered set of (member, score) pairs.
///
/// # Example
///
/// ```
/// use zetakv::storage::ZSet;
/// use bytes::Bytes;
///
/// let mut set = ZSet::new();
/// set.add(Bytes::from("alice"), 100.0);
/// set.add(Bytes::from("bob"), 200.0);
///
/// assert_eq!(set.rank(b"alice"), Some(0));
/// assert_eq!(set.score(b"bob"), Some(200.0));
/// ```
#[derive(Debug)]
pub struct ZSet {
    /// Node arena; slot 0 is always the head sentinel.
    nodes: Vec<Node>,
    /// Recycled arena slots.
    free: Vec<usize>,
    /// Member -> arena slot, for O(1) point lookup.
    index: HashMap<Bytes, usize>,
    /// Number of levels currently in use (at least 1).
    level: usize,
    /// Number of members.
    len: usize,
}

impl Default for ZSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ZSet {
    /// Creates an empty sorted set.
    pub fn new() -> Self {
        let head = Node {
            member: Bytes::new(),
            score: f64::NEG_INFINITY,
            forward: vec![None; MAX_LEVEL],
        };

        Self {
            nodes: vec![head],
            free: Vec::new(),
            index: HashMap::new(),
            level: 1,
            len: 0,
        }
    }

    /// Returns the number of members in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a member with the given score, or updates its score.
    ///
    /// # Returns
    ///
    /// - `false` if the member already exists with an identical score
    ///   (bit-exact comparison, no epsilon) - the set is left untouched.
    /// - `true` if the member was inserted, or re-inserted at a new position
    ///   because its score changed.
    pub fn add(&mut self, member: Bytes, score: f64) -> bool {
        if let Some(&slot) = self.index.get(&member) {
            if self.nodes[slot].score == score {
                return false;
            }
            // Score changed: the member's position moves, so re-insert.
            self.remove(&member);
        }

        let update = self.predecessors(score, &member);

        let height = self.random_level();
        if height > self.level {
            // Levels above the previous active level start at the head,
            // which predecessors() never visited.
            self.level = height;
        }

        let slot = self.alloc(Node {
            member: member.clone(),
            score,
            forward: vec![None; height],
        });

        for lvl in 0..height {
            let pred = update[lvl];
            self.nodes[slot].forward[lvl] = self.nodes[pred].forward[lvl];
            self.nodes[pred].forward[lvl] = Some(slot);
        }

        self.index.insert(member, slot);
        self.len += 1;
        true
    }

    /// Removes a member from the set.
    ///
    /// Returns `false` if the member is not present.
    pub fn remove(&mut self, member: &[u8]) -> bool {
        let Some(&target) = self.index.get(member) else {
            return false;
        };

        // The walk needs the full (score, member) order key, so read the
        // score through the index before searching from the root.
        let score = self.nodes[target].score;
        let update = self.predecessors(score, member);

        // Unlink at every level the node itself participates in. The loop
        // bound is the node's own height, not the list's active level, and
        // each level is guarded: a level is skipped only if its predecessor
        // does not forward directly to the target.
        let height = self.nodes[target].forward.len();
        for lvl in 0..height {
            let pred = update[lvl];
            if self.nodes[pred].forward[lvl] == Some(target) {
                self.nodes[pred].forward[lvl] = self.nodes[target].forward[lvl];
            }
        }

        // Shrink the active level while the topmost level is empty.
        while self.level > 1 && self.nodes[HEAD].forward[self.level - 1].is_none() {
            self.level -= 1;
        }

        self.index.remove(member);
        self.release(target);
        self.len -= 1;
        true
    }

    /// Returns the score of a member, or `None` if absent.
    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.index.get(member).map(|&slot| self.nodes[slot].score)
    }

    /// Returns the zero-based rank of a member in the ascending
    /// `(score, member)` order, or `None` if absent.
    ///
    /// This walks the bottom level and is O(n); acceptable at the target
    /// scale, and kept simple on purpose.
    pub fn rank(&self, member: &[u8]) -> Option<usize> {
        let &target = self.index.get(member)?;

        let mut rank = 0;
        let mut cursor = self.nodes[HEAD].forward[0];
        while let Some(slot) = cursor {
            if slot == target {
                return Some(rank);
            }
            rank += 1;
            cursor = self.nodes[slot].forward[0];
        }

        // Unreachable: the index only holds slots linked into the list.
        None
    }

    /// Returns the members at positions `start..=stop` in ascending order.
    ///
    /// Positions are zero-based; negative positions count from the end
    /// (`-1` is the last element). After normalization both bounds are
    /// clamped to `[0, len - 1]`. The result is empty when the set is empty
    /// or the normalized `start` exceeds `stop`.
    pub fn range(&self, start: i64, stop: i64) -> Vec<(Bytes, f64)> {
        if self.len == 0 {
            return Vec::new();
        }

        let len = self.len as i64;
        let start = normalize_position(start, len);
        let stop = normalize_position(stop, len);
        if start > stop {
            return Vec::new();
        }

        let mut out = Vec::with_capacity((stop - start + 1) as usize);
        let mut pos = 0i64;
        let mut cursor = self.nodes[HEAD].forward[0];
        while let Some(slot) = cursor {
            if pos > stop {
                break;
            }
            let node = &self.nodes[slot];
            if pos >= start {
                out.push((node.member.clone(), node.score));
            }
            pos += 1;
            cursor = node.forward[0];
        }

        out
    }

    /// Returns every (member, score) pair in ascending order.
    ///
    /// Used by the aggregate dump path.
    pub fn entries(&self) -> Vec<(Bytes, f64)> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.nodes[HEAD].forward[0];
        while let Some(slot) = cursor {
            let node = &self.nodes[slot];
            out.push((node.member.clone(), node.score));
            cursor = node.forward[0];
        }
        out
    }

    /// Walks down from the highest active level and records, per level, the
    /// rightmost node whose `(score, member)` key is strictly less than the
    /// given key. Levels above the active level default to the head.
    fn predecessors(&self, score: f64, member: &[u8]) -> [usize; MAX_LEVEL] {
        let mut update = [HEAD; MAX_LEVEL];
        let mut cursor = HEAD;

        for lvl in (0..self.level).rev() {
            while let Some(next) = self.nodes[cursor].forward[lvl] {
                let node = &self.nodes[next];
                if key_less(node.score, &node.member, score, member) {
                    cursor = next;
                } else {
                    break;
                }
            }
            update[lvl] = cursor;
        }

        update
    }

    /// Draws a node height from a geometric distribution: each additional
    /// level has independent probability 0.5, capped at [`MAX_LEVEL`].
    fn random_level(&self) -> usize {
        let mut rng = rand::thread_rng();
        let mut level = 1;
        while level < MAX_LEVEL && rng.gen_bool(LEVEL_PROBABILITY) {
            level += 1;
        }
        level
    }

    /// Places a node into the arena, recycling a freed slot when available.
    fn alloc(&mut self, node: Node) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Returns a slot to the free list, dropping the node's payload.
    fn release(&mut self, slot: usize) {
        self.nodes[slot] = Node {
            member: Bytes::new(),
            score: 0.0,
            forward: Vec::new(),
        };
        self.free.push(slot);
    }
}

/// The `(score, member)` total order: score first, member bytes as the
/// tie-break when scores are equal.
#[inline]
fn key_less(a_score: f64, a_member: &[u8], b_score: f64, b_member: &[u8]) -> bool {
    a_score < b_score || (a_score == b_score && a_member < b_member)
}

/// Maps a possibly-negative position into `[0, len - 1]`.
#[inline]
fn normalize_position(pos: i64, len: i64) -> i64 {
    let effective = if pos < 0 { len + pos } else { pos };
    effective.clamp(0, len - 1)
}
