//! Hash utilities and the hashing strategy used by the commit tree.
//!
//! The tree, the prover and the verifier never call a hash function directly.
//! They go through a [`HashContext`], which supplies the three primitives the
//! multi-proof algorithm needs: plain hashing, internal-node hashing and the
//! padding sentinel. [`KeccakContext`] is the production strategy and must stay
//! bit-exact with the on-chain verifier.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::{MerkleError, MerkleResult, HASH_LENGTH};

/// A 256-bit hash value used for leaves and node hashes in merkle trees.
///
/// Ordering is byte-lexicographic, which is what internal-node hashing relies on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HashValue([u8; HASH_LENGTH]);

impl HashValue {
    /// All zero bytes
    pub const ZERO: HashValue = HashValue([0u8; HASH_LENGTH]);

    /// Create a new HashValue from a fixed-size array
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Create a HashValue from a slice
    pub fn from_slice(bytes: &[u8]) -> MerkleResult<Self> {
        if bytes.len() != HASH_LENGTH {
            return Err(MerkleError::InvalidHashLength {
                expected: HASH_LENGTH,
                got: bytes.len(),
            });
        }
        let mut arr = [0u8; HASH_LENGTH];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Create a HashValue from hex string
    pub fn from_hex(hex_str: &str) -> MerkleResult<Self> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(hex_str)
            .map_err(|e| MerkleError::InvalidInput(format!("Invalid hex: {}", e)))?;
        Self::from_slice(&bytes)
    }

    /// Get the underlying bytes
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Convert to a Vec<u8>
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({})", self)
    }
}

impl AsRef<[u8]> for HashValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LENGTH]> for HashValue {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl From<HashValue> for [u8; HASH_LENGTH] {
    fn from(hash: HashValue) -> Self {
        hash.0
    }
}

/// Domain separation prefixes, one full word each.
///
/// Both must match the verifying contract byte for byte.
pub mod prefix {
    use crate::HASH_LENGTH;

    /// Leaf preimages start with `bytes1(0x00)` right-padded to a word.
    pub const LEAF_DOMAIN_SEPARATOR: [u8; HASH_LENGTH] = [0u8; HASH_LENGTH];

    /// Internal node preimages start with `uint256(1)`.
    pub const INTERNAL_DOMAIN_SEPARATOR: [u8; HASH_LENGTH] = {
        let mut word = [0u8; HASH_LENGTH];
        word[HASH_LENGTH - 1] = 0x01;
        word
    };
}

/// Hashing strategy injected into tree construction, proving and verification.
///
/// Implementations must be deterministic and free of side effects. A context is
/// shared read-only, so it must be `Send + Sync`.
pub trait HashContext: Send + Sync {
    /// Hash arbitrary bytes.
    fn hash(&self, data: &[u8]) -> HashValue;

    /// Hash two child nodes into their parent.
    ///
    /// The result is symmetric: `hash_internal(a, b) == hash_internal(b, a)`.
    fn hash_internal(&self, a: &HashValue, b: &HashValue) -> HashValue;

    /// Sentinel used to pad odd-length layers. Never real data.
    fn zero_hash(&self) -> HashValue;
}

impl<C: HashContext + ?Sized> HashContext for &C {
    fn hash(&self, data: &[u8]) -> HashValue {
        (**self).hash(data)
    }

    fn hash_internal(&self, a: &HashValue, b: &HashValue) -> HashValue {
        (**self).hash_internal(a, b)
    }

    fn zero_hash(&self) -> HashValue {
        (**self).zero_hash()
    }
}

/// Keccak-256 hashing context.
///
/// Built once and passed by reference; the internal-node separator is fixed at
/// construction time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeccakContext {
    internal_domain_separator: [u8; HASH_LENGTH],
}

impl Default for KeccakContext {
    fn default() -> Self {
        Self::new()
    }
}

impl KeccakContext {
    /// Context with the canonical internal-node separator (`uint256(1)`).
    pub const fn new() -> Self {
        Self {
            internal_domain_separator: prefix::INTERNAL_DOMAIN_SEPARATOR,
        }
    }

    /// Context with a custom internal-node separator.
    ///
    /// The separator must differ from [`prefix::LEAF_DOMAIN_SEPARATOR`], otherwise a
    /// leaf preimage could be crafted to collide with an internal node.
    pub fn with_internal_domain_separator(separator: [u8; HASH_LENGTH]) -> MerkleResult<Self> {
        if separator == prefix::LEAF_DOMAIN_SEPARATOR {
            return Err(MerkleError::InvalidInput(
                "internal domain separator must differ from the leaf separator".to_string(),
            ));
        }
        Ok(Self {
            internal_domain_separator: separator,
        })
    }

    pub fn internal_domain_separator(&self) -> &[u8; HASH_LENGTH] {
        &self.internal_domain_separator
    }
}

impl HashContext for KeccakContext {
    fn hash(&self, data: &[u8]) -> HashValue {
        keccak256(data)
    }

    fn hash_internal(&self, a: &HashValue, b: &HashValue) -> HashValue {
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let mut hasher = Keccak256::new();
        hasher.update(self.internal_domain_separator);
        hasher.update(first.as_bytes());
        hasher.update(second.as_bytes());
        finalize(hasher)
    }

    fn zero_hash(&self) -> HashValue {
        HashValue([0xFF; HASH_LENGTH])
    }
}

/// Hash data using Keccak-256
pub fn keccak256(data: &[u8]) -> HashValue {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    finalize(hasher)
}

fn finalize(hasher: Keccak256) -> HashValue {
    let result = hasher.finalize();
    let mut bytes = [0u8; HASH_LENGTH];
    bytes.copy_from_slice(&result);
    HashValue(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(byte: u8) -> HashValue {
        HashValue::new([byte; 32])
    }

    #[test]
    fn test_keccak_known_vectors() {
        assert_eq!(
            keccak256(b""),
            HashValue::from_hex("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
                .unwrap()
        );
        assert_eq!(
            keccak256(b"abc"),
            HashValue::from_hex("0x4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45")
                .unwrap()
        );
    }

    #[test]
    fn test_hash_internal_is_symmetric() {
        let ctx = KeccakContext::new();
        let pairs = [(h(1), h(2)), (h(0xFF), h(0)), (h(7), h(7))];
        for (a, b) in pairs {
            assert_eq!(ctx.hash_internal(&a, &b), ctx.hash_internal(&b, &a));
        }
    }

    #[test]
    fn test_hash_internal_layout() {
        let ctx = KeccakContext::new();
        let (a, b) = (h(0x22), h(0x11));

        let mut preimage = Vec::new();
        preimage.extend_from_slice(&prefix::INTERNAL_DOMAIN_SEPARATOR);
        preimage.extend_from_slice(b.as_bytes());
        preimage.extend_from_slice(a.as_bytes());

        assert_eq!(ctx.hash_internal(&a, &b), keccak256(&preimage));
    }

    #[test]
    fn test_domain_separator_changes_output() {
        let default_ctx = KeccakContext::new();
        let mut sep = [0u8; 32];
        sep[31] = 0x02;
        let custom_ctx = KeccakContext::with_internal_domain_separator(sep).unwrap();

        assert_ne!(
            default_ctx.hash_internal(&h(1), &h(2)),
            custom_ctx.hash_internal(&h(1), &h(2))
        );
        assert!(KeccakContext::with_internal_domain_separator(prefix::LEAF_DOMAIN_SEPARATOR).is_err());
    }

    #[test]
    fn test_zero_hash_sentinel() {
        let ctx = KeccakContext::new();
        assert_eq!(ctx.zero_hash(), h(0xFF));
        assert_ne!(ctx.zero_hash(), HashValue::ZERO);
    }

    #[test]
    fn test_from_slice_rejects_bad_length() {
        assert!(matches!(
            HashValue::from_slice(&[0u8; 31]),
            Err(MerkleError::InvalidHashLength { expected: 32, got: 31 })
        ));
        assert!(HashValue::from_hex("0xzz").is_err());
    }

    #[test]
    fn test_lexicographic_order() {
        let mut lo = [0u8; 32];
        let mut hi = [0u8; 32];
        lo[31] = 0xFF;
        hi[0] = 0x01;
        assert!(HashValue::new(lo) < HashValue::new(hi));
    }
}
