//! Lock-guarded block index with checkpoint enforcement.
//!
//! [`SharedChain`] owns a [`MemoryBlockIndex`] behind a `parking_lot::RwLock`.
//! Guard queries run under the read lock so each one sees a consistent
//! snapshot of the index and best pointer; block acceptance and tip moves
//! take the write lock and consult the guard before mutating.
//!
//! Chain selection (which tip has the most work) stays with the caller:
//! [`SharedChain::connect`] never moves the best block, only
//! [`SharedChain::set_best`] and [`SharedChain::extend`] do.

use keel_consensus::CheckpointGuard;
use keel_core::block_index::{BlockIndex, MemoryBlockIndex, fork_point};
use keel_core::error::{CheckpointError, GuardError, IndexError, KeelError};
use keel_core::types::Hash256;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

/// Block index shared between block acceptance and guard queries.
pub struct SharedChain {
    index: RwLock<MemoryBlockIndex>,
    guard: CheckpointGuard,
}

impl SharedChain {
    /// Empty chain guarded by `guard`.
    pub fn new(guard: CheckpointGuard) -> Self {
        Self::with_index(MemoryBlockIndex::new(), guard)
    }

    /// Wrap an existing index.
    pub fn with_index(index: MemoryBlockIndex, guard: CheckpointGuard) -> Self {
        Self {
            index: RwLock::new(index),
            guard,
        }
    }

    /// The guard consulted on every mutation.
    pub fn guard(&self) -> &CheckpointGuard {
        &self.guard
    }

    /// Run `f` against a consistent snapshot of the index.
    ///
    /// The read lock is held for the whole closure, so several guard queries
    /// inside one call agree with each other.
    pub fn read<R>(&self, f: impl FnOnce(&MemoryBlockIndex, &CheckpointGuard) -> R) -> R {
        let index = self.index.read();
        f(&index, &self.guard)
    }

    /// Insert the genesis block.
    ///
    /// # Errors
    ///
    /// - [`CheckpointError::Contradicts`] if `hash` disagrees with the
    ///   height-0 checkpoint
    /// - [`IndexError::GenesisExists`] if genesis is already present
    pub fn connect_genesis(&self, hash: Hash256) -> Result<(), KeelError> {
        if !self.guard.check_hardened(0, &hash) {
            return Err(CheckpointError::Contradicts { height: 0, hash }.into());
        }
        self.index.write().insert_genesis(hash)?;
        info!(%hash, "connected genesis");
        Ok(())
    }

    /// Accept a block on top of `parent` without moving the best tip.
    ///
    /// Returns the new block's height.
    ///
    /// # Errors
    ///
    /// - [`IndexError::UnknownParent`] / [`IndexError::DuplicateBlock`] from the index
    /// - [`CheckpointError::Contradicts`] if the block conflicts with a checkpoint
    /// - [`GuardError::BelowSyncCheckpoint`] if the height is frozen
    pub fn connect(&self, hash: Hash256, parent: Hash256) -> Result<u64, KeelError> {
        let mut index = self.index.write();
        self.connect_locked(&mut index, hash, parent)
    }

    /// Move the best tip to an indexed block.
    ///
    /// The branch from `hash` back to genesis must not contradict any
    /// checkpoint, and unless it descends from the current best block it must
    /// leave the best chain above the sync checkpoint.
    ///
    /// # Errors
    ///
    /// - [`IndexError::UnknownBlock`] if `hash` is not indexed
    /// - [`CheckpointError::Contradicts`] for the first conflicting ancestor
    /// - [`GuardError::BelowSyncCheckpoint`] if the fork point is frozen
    pub fn set_best(&self, hash: Hash256) -> Result<(), KeelError> {
        let mut index = self.index.write();
        self.set_best_locked(&mut index, hash)
    }

    /// Connect `hash` on top of the current best block and make it the tip.
    ///
    /// Runs under a single write lock, so concurrent callers never attach to
    /// the same parent.
    ///
    /// # Errors
    ///
    /// As [`connect`](Self::connect); [`GuardError::InvalidState`] if there
    /// is no best block yet.
    pub fn extend(&self, hash: Hash256) -> Result<u64, KeelError> {
        let mut index = self.index.write();
        let parent = index
            .best()
            .map(|e| e.hash)
            .ok_or_else(|| GuardError::InvalidState("no best block".to_string()))?;
        let height = self.connect_locked(&mut index, hash, parent)?;
        self.set_best_locked(&mut index, hash)?;
        Ok(height)
    }

    fn connect_locked(
        &self,
        index: &mut MemoryBlockIndex,
        hash: Hash256,
        parent: Hash256,
    ) -> Result<u64, KeelError> {
        let height = index
            .lookup(&parent)
            .map(|p| p.height + 1)
            .ok_or_else(|| IndexError::UnknownParent(parent.to_string()))?;

        if !self.guard.check_hardened(height, &hash) {
            return Err(CheckpointError::Contradicts { height, hash }.into());
        }
        let sync = self.guard.auto_select_sync_checkpoint(&*index)?;
        if height <= sync.height {
            warn!(height, sync_height = sync.height, %hash, "rejected block below sync checkpoint");
            return Err(GuardError::BelowSyncCheckpoint {
                height,
                sync_height: sync.height,
            }
            .into());
        }

        index.insert(hash, parent)?;
        debug!(height, %hash, "connected block");
        Ok(height)
    }

    fn set_best_locked(&self, index: &mut MemoryBlockIndex, hash: Hash256) -> Result<(), KeelError> {
        let tip = index
            .lookup(&hash)
            .ok_or_else(|| IndexError::UnknownBlock(hash.to_string()))?;
        if let Some(bad) = self.guard.check_hardened_chain(&*index, tip) {
            return Err(CheckpointError::Contradicts {
                height: bad.height,
                hash: bad.hash,
            }
            .into());
        }
        if let Some(best) = index.best() {
            let fork = fork_point(&*index, best, tip).ok_or_else(|| {
                GuardError::InvalidState(format!("{hash} shares no ancestor with the best chain"))
            })?;
            if fork.hash != best.hash {
                let sync = self.guard.auto_select_sync_checkpoint(&*index)?;
                if fork.height <= sync.height {
                    warn!(
                        fork_height = fork.height,
                        sync_height = sync.height,
                        %hash,
                        "rejected reorg below sync checkpoint"
                    );
                    return Err(GuardError::BelowSyncCheckpoint {
                        height: fork.height,
                        sync_height: sync.height,
                    }
                    .into());
                }
            }
        }
        index.set_best(hash)?;
        Ok(())
    }

    /// Hash of the best block, if any.
    pub fn best_hash(&self) -> Option<Hash256> {
        self.index.read().best().map(|e| e.hash)
    }

    /// Height of the best block, if any.
    pub fn best_height(&self) -> Option<u64> {
        self.index.read().best().map(|e| e.height)
    }

    /// See [`CheckpointGuard::check_sync`].
    pub fn check_sync(&self, height: u64) -> Result<bool, GuardError> {
        self.read(|index, guard| guard.check_sync(index, height))
    }

    /// Height of the current sync checkpoint.
    pub fn sync_checkpoint_height(&self) -> Result<u64, GuardError> {
        self.read(|index, guard| guard.auto_select_sync_checkpoint(index).map(|e| e.height))
    }

    /// Height of the highest checkpoint block present locally.
    pub fn last_checkpoint_height(&self) -> Option<u64> {
        self.read(|index, guard| guard.last_checkpoint(index).map(|e| e.height))
    }
}
