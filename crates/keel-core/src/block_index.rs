//! Block index interface and in-memory implementation.
//!
//! The [`BlockIndex`] trait is the read-only view the checkpoint guard
//! consumes: hash lookup, parent traversal and the current best block. The
//! node owns the index; the guard only borrows entries from it.
//!
//! [`MemoryBlockIndex`] enforces the structural invariants on insert: a
//! single genesis, parents inserted before children, and
//! `height == parent.height + 1`. Together these guarantee that following
//! parent links always terminates at genesis.
//!
//! Not thread-safe. Wrap in a `RwLock` when writers and guard queries run
//! concurrently (see `keel-node-lib`'s `SharedChain`).

use std::collections::HashMap;

use crate::error::IndexError;
use crate::types::{BlockIndexEntry, Hash256};

/// Read-only view of the known blocks.
pub trait BlockIndex {
    /// Look up an entry by block hash. Returns `None` if unknown.
    fn lookup(&self, hash: &Hash256) -> Option<&BlockIndexEntry>;

    /// The current best-chain tip, or `None` if no block is known yet.
    fn best(&self) -> Option<&BlockIndexEntry>;

    /// Parent of `entry`, or `None` for genesis (or a dangling link).
    ///
    /// Default implementation resolves `entry.parent` through [`lookup`](Self::lookup).
    fn parent(&self, entry: &BlockIndexEntry) -> Option<&BlockIndexEntry> {
        entry.parent.as_ref().and_then(|hash| self.lookup(hash))
    }
}

/// Iterator over an entry and its ancestors, tip first.
///
/// Stops after genesis or at the first parent missing from the index.
pub struct Ancestors<'a, I: ?Sized> {
    index: &'a I,
    next: Option<&'a BlockIndexEntry>,
}

impl<'a, I: BlockIndex + ?Sized> Iterator for Ancestors<'a, I> {
    type Item = &'a BlockIndexEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.index.parent(current);
        Some(current)
    }
}

/// Walk from `start` back towards genesis, yielding `start` first.
pub fn ancestors<'a, I: BlockIndex + ?Sized>(
    index: &'a I,
    start: &'a BlockIndexEntry,
) -> Ancestors<'a, I> {
    Ancestors {
        index,
        next: Some(start),
    }
}

/// Last block shared by the branches ending at `a` and `b`.
///
/// Returns `a` itself when `b` descends from it. `None` if a parent link is
/// missing before the branches meet.
pub fn fork_point<'a, I: BlockIndex + ?Sized>(
    index: &'a I,
    a: &'a BlockIndexEntry,
    b: &'a BlockIndexEntry,
) -> Option<&'a BlockIndexEntry> {
    let (mut a, mut b) = (a, b);
    while a.height > b.height {
        a = index.parent(a)?;
    }
    while b.height > a.height {
        b = index.parent(b)?;
    }
    while a.hash != b.hash {
        a = index.parent(a)?;
        b = index.parent(b)?;
    }
    Some(a)
}

/// In-memory block index backed by a `HashMap`.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockIndex {
    entries: HashMap<Hash256, BlockIndexEntry>,
    genesis: Option<Hash256>,
    best: Option<Hash256>,
}

impl MemoryBlockIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries stored.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no block has been inserted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `hash` is in the index.
    pub fn contains(&self, hash: &Hash256) -> bool {
        self.entries.contains_key(hash)
    }

    /// Hash of the genesis entry, if inserted.
    pub fn genesis(&self) -> Option<Hash256> {
        self.genesis
    }

    /// Insert the genesis entry. Becomes the best block if none is set.
    ///
    /// # Errors
    ///
    /// - [`IndexError::GenesisExists`] if a genesis entry is already present
    /// - [`IndexError::DuplicateBlock`] if `hash` is already indexed
    pub fn insert_genesis(&mut self, hash: Hash256) -> Result<&BlockIndexEntry, IndexError> {
        if self.genesis.is_some() {
            return Err(IndexError::GenesisExists);
        }
        if self.entries.contains_key(&hash) {
            return Err(IndexError::DuplicateBlock(hash.to_string()));
        }
        self.genesis = Some(hash);
        if self.best.is_none() {
            self.best = Some(hash);
        }
        Ok(self
            .entries
            .entry(hash)
            .or_insert_with(|| BlockIndexEntry::genesis(hash)))
    }

    /// Insert a block on top of an already-indexed `parent`.
    ///
    /// The height is derived from the parent. Does not move the best tip.
    ///
    /// # Errors
    ///
    /// - [`IndexError::DuplicateBlock`] if `hash` is already indexed
    /// - [`IndexError::UnknownParent`] if `parent` is not indexed
    pub fn insert(&mut self, hash: Hash256, parent: Hash256) -> Result<&BlockIndexEntry, IndexError> {
        if self.entries.contains_key(&hash) {
            return Err(IndexError::DuplicateBlock(hash.to_string()));
        }
        let parent_height = self
            .entries
            .get(&parent)
            .map(|p| p.height)
            .ok_or_else(|| IndexError::UnknownParent(parent.to_string()))?;
        let entry = BlockIndexEntry {
            hash,
            height: parent_height + 1,
            parent: Some(parent),
        };
        Ok(self.entries.entry(hash).or_insert(entry))
    }

    /// Move the best-chain tip to `hash`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::UnknownBlock`] if `hash` is not indexed.
    pub fn set_best(&mut self, hash: Hash256) -> Result<(), IndexError> {
        if !self.entries.contains_key(&hash) {
            return Err(IndexError::UnknownBlock(hash.to_string()));
        }
        self.best = Some(hash);
        Ok(())
    }
}

impl BlockIndex for MemoryBlockIndex {
    fn lookup(&self, hash: &Hash256) -> Option<&BlockIndexEntry> {
        self.entries.get(hash)
    }

    fn best(&self) -> Option<&BlockIndexEntry> {
        self.best.as_ref().and_then(|hash| self.entries.get(hash))
    }
}
