//! Protocol constants and network selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::genesis;
use crate::types::Hash256;

/// Network type: Mainnet or Testnet.
///
/// Controls which checkpoint table is active and which genesis hash anchors
/// height 0. Fixed for the lifetime of a process.
///
/// # Examples
///
/// ```
/// use keel_core::constants::NetworkType;
/// let net = NetworkType::default();
/// assert_eq!(net, NetworkType::Mainnet);
/// assert_eq!(net.name(), "mainnet");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Production network.
    #[default]
    Mainnet,
    /// Public test network. Carries no checkpoints.
    Testnet,
}

impl NetworkType {
    /// Lowercase network name, as used in config files and on the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// Hash of this network's genesis block.
    pub fn genesis_hash(&self) -> Hash256 {
        genesis::genesis_hash(*self)
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" | "main" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Maximum tolerated reorganization depth, in blocks.
///
/// Default for `GuardConfig::reorg_depth`.
pub const BLOCK_TEMP_CHECKPOINT_DEPTH: u64 = 120;

/// Below this best height the sync checkpoint is the tip's parent (or
/// genesis), not a depth walk.
pub const SYNC_CHECKPOINT_MIN_HEIGHT: u64 = 500;

/// Extra depth added to the reorg depth when walking back for the sync
/// checkpoint.
pub const SYNC_CHECKPOINT_EXTRA_DEPTH: u64 = 500;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_type_default_is_mainnet() {
        assert_eq!(NetworkType::default(), NetworkType::Mainnet);
    }

    #[test]
    fn network_type_parse() {
        assert_eq!("mainnet".parse::<NetworkType>(), Ok(NetworkType::Mainnet));
        assert_eq!("TestNet".parse::<NetworkType>(), Ok(NetworkType::Testnet));
        assert_eq!("test".parse::<NetworkType>(), Ok(NetworkType::Testnet));
        assert!("regtest".parse::<NetworkType>().is_err());
    }

    #[test]
    fn network_type_display_round_trips_name() {
        for net in [NetworkType::Mainnet, NetworkType::Testnet] {
            assert_eq!(net.to_string().parse::<NetworkType>(), Ok(net));
        }
    }

    #[test]
    fn genesis_hashes_distinct() {
        assert_ne!(
            NetworkType::Mainnet.genesis_hash(),
            NetworkType::Testnet.genesis_hash()
        );
    }

    #[test]
    fn sync_window_constants() {
        assert_eq!(SYNC_CHECKPOINT_MIN_HEIGHT, 500);
        assert_eq!(BLOCK_TEMP_CHECKPOINT_DEPTH + SYNC_CHECKPOINT_EXTRA_DEPTH, 620);
    }
}
