//! End-to-end tests for the checkpoint guard.
//!
//! Each test builds a chain (directly in a `MemoryBlockIndex` or through a
//! `SharedChain`) and exercises the guard the way the node's acceptance,
//! sync-progress and reorg-depth paths do.

use keel_consensus::{CheckpointGuard, CheckpointTable};
use keel_core::block_index::{BlockIndex, MemoryBlockIndex};
use keel_core::constants::{BLOCK_TEMP_CHECKPOINT_DEPTH, NetworkType};
use keel_core::error::{CheckpointError, GuardError, KeelError};
use keel_core::types::Hash256;
use keel_node_lib::{GuardConfig, SharedChain};
use keel_tests::helpers::*;

fn empty_guard(depth: u64) -> CheckpointGuard {
    CheckpointGuard::with_table(CheckpointTable::empty(), depth)
}

#[test]
fn thousand_block_chain_sync_checkpoint() {
    let index = linear_chain(1000);
    let guard = empty_guard(100);

    let sync = guard.auto_select_sync_checkpoint(&index).unwrap();
    assert_eq!(sync.height, 400);
    assert_eq!(sync.hash, main_hash(400));

    assert!(guard.check_sync(&index, 401).unwrap());
    assert!(!guard.check_sync(&index, 400).unwrap());
}

#[test]
fn sync_checkpoint_boundaries() {
    let guard = empty_guard(100);
    let cases = [(0, 0), (1, 0), (250, 249), (499, 498), (500, 0), (600, 0), (601, 1), (1234, 634)];
    for (tip, expected) in cases {
        let index = linear_chain(tip);
        let sync = guard.auto_select_sync_checkpoint(&index).unwrap();
        assert_eq!(sync.height, expected, "tip {tip}");
    }
}

#[test]
fn sync_checkpoint_follows_best_branch() {
    let mut index = linear_chain(900);
    let fork_tip = add_fork(&mut index, 1, 850, 100);
    index.set_best(fork_tip).unwrap();

    let guard = empty_guard(100);
    let sync = guard.auto_select_sync_checkpoint(&index).unwrap();
    // Best height 950, window 600: first ancestor at or below 350 is on
    // the shared prefix.
    assert_eq!(sync.height, 350);
    assert_eq!(sync.hash, main_hash(350));
}

#[test]
fn default_depth_on_mainnet_config() {
    let guard = GuardConfig::default().guard();
    let index = linear_chain(2000);
    let sync = guard.auto_select_sync_checkpoint(&index).unwrap();
    assert_eq!(sync.height, 2000 - (BLOCK_TEMP_CHECKPOINT_DEPTH + 500));
}

#[test]
fn last_checkpoint_highest_present_block() {
    let index = linear_chain(300);
    let table = CheckpointTable::from_entries([
        (0, main_hash(0)),
        (100, main_hash(100)),
        (250, main_hash(250)),
        (5000, main_hash(5000)),
    ])
    .unwrap();
    let guard = CheckpointGuard::with_table(table, 100);
    let last = guard.last_checkpoint(&index).unwrap();
    assert_eq!(last.height, 250);

    // Same index, same answer.
    assert_eq!(guard.last_checkpoint(&index), Some(last));
}

#[test]
fn last_checkpoint_can_sit_on_a_side_branch() {
    // The lookup is by hash, not by best-chain membership.
    let mut index = linear_chain(20);
    add_fork(&mut index, 3, 5, 10);
    let table = CheckpointTable::from_entries([(10, main_hash(10)), (12, block_hash(3, 12))]).unwrap();
    let guard = CheckpointGuard::with_table(table, 100);
    assert_eq!(guard.last_checkpoint(&index).unwrap().hash, block_hash(3, 12));
}

#[test]
fn last_checkpoint_none_before_first_checkpoint_block() {
    let index = linear_chain(50);
    let guard = CheckpointGuard::new(NetworkType::Mainnet, 100);
    // Helper hashes are not the real mainnet hashes.
    assert!(guard.last_checkpoint(&index).is_none());
}

#[test]
fn mainnet_genesis_chain_finds_genesis_checkpoint() {
    let mut index = MemoryBlockIndex::new();
    index.insert_genesis(NetworkType::Mainnet.genesis_hash()).unwrap();
    let guard = CheckpointGuard::new(NetworkType::Mainnet, 100);
    let last = guard.last_checkpoint(&index).unwrap();
    assert_eq!(last.height, 0);
    assert_eq!(guard.total_blocks_estimate(), 174);
}

#[test]
fn testnet_guard_is_permissive() {
    let guard = CheckpointGuard::new(NetworkType::Testnet, 100);
    assert_eq!(guard.total_blocks_estimate(), 0);
    assert!(guard.check_hardened(0, &Hash256([0x01; 32])));
    assert!(guard.last_checkpoint(&linear_chain(10)).is_none());
}

#[test]
fn hardened_chain_rejects_competing_branch() {
    let mut index = linear_chain(200);
    let fork_tip = add_fork(&mut index, 7, 90, 150);
    let table = CheckpointTable::from_entries([(0, main_hash(0)), (100, main_hash(100))]).unwrap();
    let guard = CheckpointGuard::with_table(table, 100);

    let main_tip = index.best().unwrap();
    assert!(guard.check_hardened_chain(&index, main_tip).is_none());

    let fork = index.lookup(&fork_tip).unwrap();
    let bad = guard.check_hardened_chain(&index, fork).unwrap();
    assert_eq!(bad.height, 100);
    assert_eq!(bad.hash, block_hash(7, 100));
}

#[test]
fn shared_chain_full_lifecycle() {
    let table = CheckpointTable::from_entries([(0, main_hash(0)), (300, main_hash(300))]).unwrap();
    let chain = SharedChain::new(CheckpointGuard::with_table(table, 100));
    chain.connect_genesis(main_hash(0)).unwrap();

    for height in 1..=299 {
        chain.extend(main_hash(height)).unwrap();
    }
    assert_eq!(chain.last_checkpoint_height(), Some(0));

    // A block contradicting checkpoint 300 never makes it in.
    let err = chain.extend(block_hash(9, 300)).unwrap_err();
    assert!(matches!(
        err,
        KeelError::Checkpoint(CheckpointError::Contradicts { height: 300, .. })
    ));

    for height in 300..=1000 {
        chain.extend(main_hash(height)).unwrap();
    }
    assert_eq!(chain.last_checkpoint_height(), Some(300));
    assert_eq!(chain.sync_checkpoint_height().unwrap(), 400);
    assert!(chain.check_sync(401).unwrap());
    assert!(!chain.check_sync(400).unwrap());

    // Reorg attempt rooted below the sync checkpoint.
    let err = chain.connect(block_hash(4, 351), main_hash(350)).unwrap_err();
    assert!(matches!(
        err,
        KeelError::Guard(GuardError::BelowSyncCheckpoint { height: 351, sync_height: 400 })
    ));

    // A shallow fork is still accepted into the index.
    assert_eq!(chain.connect(block_hash(4, 990), main_hash(989)).unwrap(), 990);
    assert_eq!(chain.best_height(), Some(1000));
}

#[test]
fn empty_shared_chain_reports_invalid_state() {
    let chain = SharedChain::new(empty_guard(100));
    assert!(matches!(
        chain.check_sync(10),
        Err(GuardError::InvalidState(_))
    ));
    assert!(chain.sync_checkpoint_height().is_err());
    assert_eq!(chain.last_checkpoint_height(), None);
}
