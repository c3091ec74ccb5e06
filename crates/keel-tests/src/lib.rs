//! Integration and adversarial test suite for the Keel checkpoint guard.
//!
//! Tests live under `tests/`; [`helpers`] builds deterministic chains and
//! forks for them.

pub mod helpers;
