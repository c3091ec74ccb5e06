//! # keel-node-lib — Node-side composition of the checkpoint guard.
//!
//! Provides [`GuardConfig`] (defaults, file and environment loading),
//! [`init_logging`], and [`SharedChain`], a lock-guarded block index that
//! enforces checkpoints on acceptance and serves guard queries from a
//! consistent snapshot.

pub mod chain;
pub mod config;
pub mod logging;

pub use chain::SharedChain;
pub use config::GuardConfig;
pub use logging::init_logging;
