//! Error types for the Keel guard.
use thiserror::Error;

use crate::types::Hash256;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HashParseError {
    #[error("invalid hash length: {0} hex digits, expected 64")] InvalidLength(usize),
    #[error("invalid hex: {0}")] InvalidHex(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("duplicate checkpoint height: {0}")] DuplicateHeight(u64),
    #[error("genesis checkpoint mismatch: expected {expected}, got {got}")] GenesisMismatch { expected: Hash256, got: Hash256 },
    #[error("block {hash} at height {height} contradicts checkpoint")] Contradicts { height: u64, hash: Hash256 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("duplicate block: {0}")] DuplicateBlock(String),
    #[error("unknown parent: {0}")] UnknownParent(String),
    #[error("unknown block: {0}")] UnknownBlock(String),
    #[error("genesis already present")] GenesisExists,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// A precondition on the chain state does not hold, e.g. no best block.
    #[error("invalid chain state: {0}")] InvalidState(String),
    #[error("height {height} is at or below sync checkpoint {sync_height}")] BelowSyncCheckpoint { height: u64, sync_height: u64 },
}

#[derive(Error, Debug)]
pub enum KeelError {
    #[error(transparent)] HashParse(#[from] HashParseError),
    #[error(transparent)] Checkpoint(#[from] CheckpointError),
    #[error(transparent)] Index(#[from] IndexError),
    #[error(transparent)] Guard(#[from] GuardError),
    #[error("config: {0}")] Config(String),
}
