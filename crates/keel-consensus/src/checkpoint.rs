//! Hardcoded checkpoint tables.
//!
//! A checkpoint pins the block hash the canonical chain must carry at a
//! given height. Tables are compiled into the binary, one per network, and
//! never change at runtime.
//!
//! # Attack vectors
//!
//! - **Long-range rewrite:** a competing chain that disagrees with a pinned
//!   hash is rejected no matter how much work it carries.
//!
//! - **Checkpoint spoofing:** an attacker would need to distribute a modified
//!   binary, which is outside our threat model.
//!
//! Adding a checkpoint is a one-line change to [`MAINNET_CHECKPOINTS`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use keel_core::constants::NetworkType;
use keel_core::error::CheckpointError;
use keel_core::types::Hash256;

/// Mainnet checkpoints above genesis: (height, block hash hex).
///
/// Height 0 is added from [`NetworkType::genesis_hash`] when the table is built.
pub const MAINNET_CHECKPOINTS: &[(u64, &str)] = &[
    (1, "0000067ee9e02a0e9150ff914d93e5bf110792d8309b14e7cc15379752c62776"),
    (10, "0000087b709ad2ea81937114c230fa77a2814b88ca8a701fb7728a50206dd902"),
    (100, "6f660c87043c6e17f3ce8c3e1b27389b704313d8db58064a8abf17261524d80a"),
    (174, "151950d994260cf80c44ea29874afa7b95c162fa2d600f781986f3744ae2f619"),
];

static MAINNET_TABLE: LazyLock<CheckpointTable> = LazyLock::new(|| {
    let entries = MAINNET_CHECKPOINTS.iter().map(|&(height, hex)| {
        let hash = Hash256::from_hex(hex).expect("mainnet checkpoints are hardcoded valid hex");
        (height, hash)
    });
    CheckpointTable::for_network(NetworkType::Mainnet, entries)
        .expect("mainnet checkpoints are hardcoded with unique heights")
});

// Testnet has no checkpoints.
static TESTNET_TABLE: LazyLock<CheckpointTable> = LazyLock::new(CheckpointTable::empty);

/// The checkpoint table for `network`.
///
/// Mainnet gets the hardcoded table; Testnet gets the empty table.
pub fn active_table(network: NetworkType) -> &'static CheckpointTable {
    match network {
        NetworkType::Testnet => &TESTNET_TABLE,
        NetworkType::Mainnet => &MAINNET_TABLE,
    }
}

/// Immutable height → hash map of trusted blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointTable {
    entries: BTreeMap<u64, Hash256>,
    max_height: u64,
}

impl CheckpointTable {
    /// A table with no checkpoints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from `(height, hash)` pairs in any order.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::DuplicateHeight`] if a height appears twice.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (u64, Hash256)>,
    ) -> Result<Self, CheckpointError> {
        let mut map = BTreeMap::new();
        for (height, hash) in entries {
            if map.insert(height, hash).is_some() {
                return Err(CheckpointError::DuplicateHeight(height));
            }
        }
        let max_height = map.keys().next_back().copied().unwrap_or(0);
        Ok(Self {
            entries: map,
            max_height,
        })
    }

    /// Build a network table: the genesis hash at height 0 plus `entries`.
    ///
    /// An explicit height-0 entry must match the network's genesis hash.
    ///
    /// # Errors
    ///
    /// - [`CheckpointError::GenesisMismatch`] on a conflicting height-0 entry
    /// - [`CheckpointError::DuplicateHeight`] if a height appears twice
    pub fn for_network(
        network: NetworkType,
        entries: impl IntoIterator<Item = (u64, Hash256)>,
    ) -> Result<Self, CheckpointError> {
        let genesis = network.genesis_hash();
        let mut all = vec![(0, genesis)];
        for (height, hash) in entries {
            if height == 0 {
                if hash != genesis {
                    return Err(CheckpointError::GenesisMismatch {
                        expected: genesis,
                        got: hash,
                    });
                }
                continue;
            }
            all.push((height, hash));
        }
        Self::from_entries(all)
    }

    /// Expected hash at `height`, if that height is checkpointed.
    pub fn get(&self, height: u64) -> Option<&Hash256> {
        self.entries.get(&height)
    }

    /// Number of checkpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no checkpoints.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Greatest checkpointed height, or 0 for an empty table.
    pub fn max_height(&self) -> u64 {
        self.max_height
    }

    /// Checkpoints in ascending height order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (u64, &Hash256)> + '_ {
        self.entries.iter().map(|(h, hash)| (*h, hash))
    }

    /// Checkpoints in descending height order.
    pub fn iter_rev(&self) -> impl Iterator<Item = (u64, &Hash256)> + '_ {
        self.iter().rev()
    }
}
