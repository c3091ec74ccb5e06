//! # keel-consensus — Checkpoint tables and the anti-reorg guard.
//!
//! [`checkpoint`] holds the hardcoded per-network tables. [`guard`] consults
//! a table together with a [`BlockIndex`](keel_core::block_index::BlockIndex)
//! to reject blocks that contradict a checkpoint and to pick the sync
//! checkpoint below which reorganizations are refused.

pub mod checkpoint;
pub mod guard;

pub use checkpoint::{active_table, CheckpointTable};
pub use guard::CheckpointGuard;
