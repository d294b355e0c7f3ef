//! # xchain-merkle
//!
//! Merkle multi-proofs for cross-chain message commitments.
//!
//! The source chain's messages are hashed into leaves, a [`MerkleTree`] is built
//! over them and only its root is committed to the destination chain. To execute
//! a subset of those messages later, [`MerkleTree::prove`] produces one compact
//! [`Proof`] for all of them, and [`verify_compute_root`] rebuilds the root from
//! the subset alone.
//!
//! ## Compatibility
//!
//! Everything that reaches the destination chain (internal-node hashing, domain
//! separators, padding, the reconstruction loop and [`ProofFlagBits`]) has an
//! independent on-chain counterpart and must not change.

pub mod error;
pub mod hash;
pub mod proof;
pub mod tree;

pub use error::{MerkleError, MerkleResult, ValidationError};
pub use hash::{keccak256, HashContext, HashValue, KeccakContext};
pub use proof::{total_hashes, verify_compute_root, Proof, ProofFlagBits, SourceFlag};
pub use tree::MerkleTree;

/// The length of hash digests used in merkle trees (32 bytes = 256 bits)
pub const HASH_LENGTH: usize = 32;

/// Largest number of leaves a single commitment may cover.
pub const MAX_NUMBER_TREE_LEAVES: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_and_prove_basic() {
        let ctx = KeccakContext::new();
        let leaves: Vec<HashValue> = [b"leaf0", b"leaf1", b"leaf2", b"leaf3"]
            .iter()
            .map(|data| ctx.hash(*data))
            .collect();

        let tree = MerkleTree::build(&ctx, leaves.clone()).unwrap();
        let root = tree.root();

        for (i, leaf) in leaves.iter().enumerate() {
            let proof = tree.prove(&[i]).unwrap();
            assert_eq!(verify_compute_root(&ctx, &[*leaf], &proof).unwrap(), root);
        }
    }
}
