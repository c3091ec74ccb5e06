//! Shared test helpers for integration tests.

use keel_core::block_index::MemoryBlockIndex;
use keel_core::types::Hash256;
use sha2::{Digest, Sha256};

/// Deterministic block hash for `(branch, height)`.
///
/// Branch 0 is the main chain; other branch ids give disjoint fork hashes.
pub fn block_hash(branch: u8, height: u64) -> Hash256 {
    let mut hasher = Sha256::new();
    hasher.update([branch]);
    hasher.update(height.to_le_bytes());
    Hash256(hasher.finalize().into())
}

/// Main-chain hash at `height`.
pub fn main_hash(height: u64) -> Hash256 {
    block_hash(0, height)
}

/// Linear main chain with heights `0..=tip`, best set to the tip.
pub fn linear_chain(tip: u64) -> MemoryBlockIndex {
    let mut index = MemoryBlockIndex::new();
    index
        .insert_genesis(main_hash(0))
        .expect("fresh index accepts genesis");
    for height in 1..=tip {
        index
            .insert(main_hash(height), main_hash(height - 1))
            .expect("parent inserted on previous iteration");
    }
    index
        .set_best(main_hash(tip))
        .expect("tip was just inserted");
    index
}

/// Append a fork of `len` blocks on branch `branch`, starting at `fork_height`.
///
/// The first fork block's parent is the main-chain block at `fork_height`.
/// Returns the hash of the fork tip. Does not move the best block.
pub fn add_fork(index: &mut MemoryBlockIndex, branch: u8, fork_height: u64, len: u64) -> Hash256 {
    let mut parent = main_hash(fork_height);
    for offset in 1..=len {
        let hash = block_hash(branch, fork_height + offset);
        index
            .insert(hash, parent)
            .expect("fork parent is indexed");
        parent = hash;
    }
    parent
}
