//! # keel-core
//! Foundation types and traits for the Keel checkpoint guard.

pub mod block_index;
pub mod constants;
pub mod error;
pub mod genesis;
pub mod types;
