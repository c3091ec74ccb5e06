//! Core protocol types: hashes and block index entries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HashParseError;

/// A 32-byte hash value.
///
/// Used for block header hashes and checkpoint hashes. Printed as 64
/// lowercase hex characters in byte order.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// The zero hash (32 zero bytes).
    pub const ZERO: Self = Self([0u8; 32]);

    /// Create a Hash256 from a byte array.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a hash from 64 hex characters, with or without a `0x` prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use keel_core::types::Hash256;
    /// let h = Hash256::from_hex("0x00000000000000000000000000000000000000000000000000000000000000ff").unwrap();
    /// assert_eq!(h.as_bytes()[31], 0xff);
    /// ```
    pub fn from_hex(s: &str) -> Result<Self, HashParseError> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.len() != 64 {
            return Err(HashParseError::InvalidLength(digits.len()));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| HashParseError::InvalidHex(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Encode as 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl FromStr for Hash256 {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// One known block in the block index.
///
/// The parent link is a non-owning back-reference by hash. It is `None`
/// only for the genesis entry.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlockIndexEntry {
    /// Block header hash.
    pub hash: Hash256,
    /// Height in the chain; genesis is 0.
    pub height: u64,
    /// Hash of the parent block, `None` for genesis.
    pub parent: Option<Hash256>,
}

impl BlockIndexEntry {
    /// Build the genesis entry for the given hash.
    pub fn genesis(hash: Hash256) -> Self {
        Self {
            hash,
            height: 0,
            parent: None,
        }
    }

    /// True for the entry without a parent.
    pub fn is_genesis(&self) -> bool {
        self.parent.is_none()
    }
}

impl fmt::Display for BlockIndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.hash, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash256_zero() {
        assert!(Hash256::ZERO.is_zero());
        assert!(!Hash256([1; 32]).is_zero());
    }

    #[test]
    fn hash256_display_hex() {
        let h = Hash256([0xAB; 32]);
        let s = h.to_string();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c == 'a' || c == 'b'));
        assert_eq!(s, h.to_hex());
    }

    #[test]
    fn hash256_parse_with_and_without_prefix() {
        let s = "0000067ee9e02a0e9150ff914d93e5bf110792d8309b14e7cc15379752c62776";
        let a: Hash256 = s.parse().unwrap();
        let b = Hash256::from_hex(&format!("0x{s}")).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), s);
    }

    #[test]
    fn hash256_parse_rejects_bad_length() {
        let err = Hash256::from_hex("abcd").unwrap_err();
        assert_eq!(err, HashParseError::InvalidLength(4));
    }

    #[test]
    fn hash256_parse_rejects_non_hex() {
        let bad = "zz".repeat(32);
        assert!(matches!(
            Hash256::from_hex(&bad),
            Err(HashParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn genesis_entry_has_no_parent() {
        let e = BlockIndexEntry::genesis(Hash256([7; 32]));
        assert!(e.is_genesis());
        assert_eq!(e.height, 0);
    }

    #[test]
    fn entry_display() {
        let e = BlockIndexEntry {
            hash: Hash256::ZERO,
            height: 42,
            parent: Some(Hash256([1; 32])),
        };
        assert!(e.to_string().ends_with("@42"));
    }
}
