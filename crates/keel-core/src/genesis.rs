//! Genesis block hashes for each network.
//!
//! The genesis hash anchors the height-0 checkpoint. Values are hardcoded;
//! every node derives the identical hash for a given network.

use std::sync::LazyLock;

use crate::constants::NetworkType;
use crate::types::Hash256;

/// Mainnet genesis block header hash.
pub const MAINNET_GENESIS_HEX: &str =
    "00000b3d1c9e0a5f6c04e3f2a8b7d41e5c9a0f3b2d8e7c6a51b4f09e3d2c1a07";

/// Testnet genesis block header hash.
pub const TESTNET_GENESIS_HEX: &str =
    "0000e7a4c2b19f0d3e8a6c5b47f21d90e3c8b6a5f4d2e1c0b9a8f7e6d5c4b3a2";

static MAINNET_GENESIS: LazyLock<Hash256> = LazyLock::new(|| {
    Hash256::from_hex(MAINNET_GENESIS_HEX).expect("mainnet genesis hash is hardcoded valid hex")
});

static TESTNET_GENESIS: LazyLock<Hash256> = LazyLock::new(|| {
    Hash256::from_hex(TESTNET_GENESIS_HEX).expect("testnet genesis hash is hardcoded valid hex")
});

/// The genesis block hash of `network`.
pub fn genesis_hash(network: NetworkType) -> Hash256 {
    match network {
        NetworkType::Mainnet => *MAINNET_GENESIS,
        NetworkType::Testnet => *TESTNET_GENESIS,
    }
}
