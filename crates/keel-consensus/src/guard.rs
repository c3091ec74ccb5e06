//! Checkpoint guard: hardened checks and the sync checkpoint.
//!
//! The guard answers three questions for the node:
//!
//! - **Chain acceptance:** may this hash sit at this height?
//!   ([`CheckpointGuard::check_hardened`], [`CheckpointGuard::check_hardened_chain`])
//! - **Sync progress:** how long is the chain at least?
//!   ([`CheckpointGuard::total_blocks_estimate`], [`CheckpointGuard::last_checkpoint`])
//! - **Reorg depth:** is this height still mutable?
//!   ([`CheckpointGuard::check_sync`])
//!
//! The guard never mutates the block index and holds no mutable state. The
//! caller must hold a consistent view of the index (e.g. a read lock) for
//! the duration of each call.
//!
//! # Sync checkpoint policy
//!
//! Below best height [`SYNC_CHECKPOINT_MIN_HEIGHT`] the sync checkpoint is
//! the tip's parent (genesis itself at height 0). From there on it is the
//! first ancestor at least `reorg_depth + SYNC_CHECKPOINT_EXTRA_DEPTH`
//! blocks behind the tip, or genesis if the walk reaches it first.

use std::borrow::Cow;

use keel_core::block_index::{BlockIndex, ancestors};
use keel_core::constants::{
    BLOCK_TEMP_CHECKPOINT_DEPTH, NetworkType, SYNC_CHECKPOINT_EXTRA_DEPTH,
    SYNC_CHECKPOINT_MIN_HEIGHT,
};
use keel_core::error::GuardError;
use keel_core::types::{BlockIndexEntry, Hash256};
use tracing::{debug, warn};

use crate::checkpoint::{CheckpointTable, active_table};

/// Checkpoint table plus reorg-depth policy.
#[derive(Debug, Clone)]
pub struct CheckpointGuard {
    table: Cow<'static, CheckpointTable>,
    reorg_depth: u64,
}

impl CheckpointGuard {
    /// Guard over the hardcoded table of `network`.
    pub fn new(network: NetworkType, reorg_depth: u64) -> Self {
        Self {
            table: Cow::Borrowed(active_table(network)),
            reorg_depth,
        }
    }

    /// Guard over a caller-supplied table (private networks, tests).
    pub fn with_table(table: CheckpointTable, reorg_depth: u64) -> Self {
        Self {
            table: Cow::Owned(table),
            reorg_depth,
        }
    }

    /// The active checkpoint table.
    pub fn table(&self) -> &CheckpointTable {
        &self.table
    }

    /// Maximum tolerated reorganization depth.
    pub fn reorg_depth(&self) -> u64 {
        self.reorg_depth
    }

    /// Returns `false` only if `height` is checkpointed with a different hash.
    ///
    /// A height the table is silent on accepts any hash.
    pub fn check_hardened(&self, height: u64, hash: &Hash256) -> bool {
        match self.table.get(height) {
            None => true,
            Some(expected) if expected == hash => true,
            Some(expected) => {
                warn!(height, %expected, got = %hash, "block contradicts hardened checkpoint");
                false
            }
        }
    }

    /// Walk from `tip` to genesis and return the first entry that
    /// contradicts a checkpoint, or `None` if the branch is consistent.
    pub fn check_hardened_chain<'a, I: BlockIndex + ?Sized>(
        &self,
        index: &'a I,
        tip: &'a BlockIndexEntry,
    ) -> Option<&'a BlockIndexEntry> {
        if self.table.is_empty() {
            return None;
        }
        let max = self.table.max_height();
        ancestors(index, tip)
            .skip_while(|entry| entry.height > max)
            .find(|entry| !self.check_hardened(entry.height, &entry.hash))
    }

    /// Greatest checkpointed height, or 0 for an empty table.
    ///
    /// A lower bound on the chain length for progress reporting only.
    pub fn total_blocks_estimate(&self) -> u64 {
        self.table.max_height()
    }

    /// The highest checkpoint block present in `index`, if any.
    pub fn last_checkpoint<'a, I: BlockIndex + ?Sized>(
        &self,
        index: &'a I,
    ) -> Option<&'a BlockIndexEntry> {
        self.table
            .iter_rev()
            .find_map(|(_, hash)| index.lookup(hash))
    }

    /// Select the sync checkpoint on the current best chain.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidState`] if the index has no best block,
    /// or if the best block's parent is missing below the minimum height.
    pub fn auto_select_sync_checkpoint<'a, I: BlockIndex + ?Sized>(
        &self,
        index: &'a I,
    ) -> Result<&'a BlockIndexEntry, GuardError> {
        let best = index
            .best()
            .ok_or_else(|| GuardError::InvalidState("no best block".to_string()))?;

        if best.height < SYNC_CHECKPOINT_MIN_HEIGHT {
            if best.height < 1 {
                return Ok(best);
            }
            return index.parent(best).ok_or_else(|| {
                GuardError::InvalidState(format!("parent of best block {best} not indexed"))
            });
        }

        let window = self.reorg_depth.saturating_add(SYNC_CHECKPOINT_EXTRA_DEPTH);
        let mut candidate = best;
        while candidate.height.saturating_add(window) > best.height {
            match index.parent(candidate) {
                Some(parent) => candidate = parent,
                None => break,
            }
        }
        debug!(best = best.height, sync = candidate.height, "selected sync checkpoint");
        Ok(candidate)
    }

    /// Returns `true` if `height` is above the sync checkpoint and may still
    /// be reorganized, `false` if it is frozen.
    ///
    /// Recomputes the sync checkpoint on every call.
    ///
    /// # Errors
    ///
    /// Propagates [`GuardError::InvalidState`] from
    /// [`auto_select_sync_checkpoint`](Self::auto_select_sync_checkpoint).
    pub fn check_sync<I: BlockIndex + ?Sized>(
        &self,
        index: &I,
        height: u64,
    ) -> Result<bool, GuardError> {
        let sync = self.auto_select_sync_checkpoint(index)?;
        Ok(height > sync.height)
    }
}

impl Default for CheckpointGuard {
    fn default() -> Self {
        Self::new(NetworkType::default(), BLOCK_TEMP_CHECKPOINT_DEPTH)
    }
}
