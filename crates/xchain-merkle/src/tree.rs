//! Binary commit tree with multi-leaf proofs.
//!
//! The tree is built once over an ordered list of leaf hashes and is read-only
//! afterwards. Odd layers are padded with [`HashContext::zero_hash`] and the
//! padded layer is what gets stored, so proving works against padded lengths.
//!
//! # Example
//!
//! ```
//! use xchain_merkle::{verify_compute_root, HashContext, KeccakContext, MerkleTree};
//!
//! let ctx = KeccakContext::new();
//! let leaves: Vec<_> = (0u8..6).map(|i| ctx.hash(&[i])).collect();
//! let tree = MerkleTree::build(&ctx, leaves.clone()).unwrap();
//!
//! let proof = tree.prove(&[1, 4]).unwrap();
//! let root = verify_compute_root(&ctx, &[leaves[1], leaves[4]], &proof).unwrap();
//! assert_eq!(root, tree.root());
//! ```

use tracing::{debug, trace};

use crate::error::{MerkleError, MerkleResult};
use crate::hash::{HashContext, HashValue};
use crate::proof::{Proof, SourceFlag};

/// A binary Merkle tree over an ordered sequence of leaf hashes.
///
/// `layers[0]` holds the (padded) leaves and the last layer holds only the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<Vec<HashValue>>,
}

impl MerkleTree {
    /// Build a tree from leaf hashes.
    ///
    /// A single leaf is its own root; no hashing is performed.
    pub fn build<C>(ctx: &C, leaves: Vec<HashValue>) -> MerkleResult<Self>
    where
        C: HashContext + ?Sized,
    {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyLeaves);
        }

        let leaf_count = leaves.len();
        let mut layers = vec![leaves];
        loop {
            let current = match layers.last_mut() {
                Some(layer) => layer,
                None => return Err(MerkleError::EmptyLeaves),
            };
            if current.len() == 1 {
                break;
            }
            if current.len() % 2 == 1 {
                current.push(ctx.zero_hash());
            }
            let next: Vec<HashValue> = current
                .chunks_exact(2)
                .map(|pair| ctx.hash_internal(&pair[0], &pair[1]))
                .collect();
            layers.push(next);
        }

        let tree = Self { layers };
        debug!(
            leaves = leaf_count,
            depth = tree.depth(),
            root = %tree.root(),
            "Built merkle tree"
        );
        Ok(tree)
    }

    /// Get the root hash of the tree.
    pub fn root(&self) -> HashValue {
        // build() guarantees at least one layer whose last entry is the root
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or_default()
    }

    /// All stored layers, leaves first.
    pub fn layers(&self) -> &[Vec<HashValue>] {
        &self.layers
    }

    /// Number of hashing levels between the leaves and the root.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Stored leaf layer, including any padding sentinel.
    pub fn leaves(&self) -> &[HashValue] {
        &self.layers[0]
    }

    /// Produce a multi-proof for the leaves at `indices`.
    ///
    /// Indices must be strictly ascending; they are not re-sorted. Sibling pairs
    /// that are both being proven are marked [`SourceFlag::FromHashes`] and cost
    /// no proof hash.
    pub fn prove(&self, indices: &[usize]) -> MerkleResult<Proof> {
        let mut hashes = Vec::new();
        let mut source_flags = Vec::new();
        let mut indices = indices.to_vec();

        for (level, layer) in self.layers[..self.layers.len() - 1].iter().enumerate() {
            let mut next_indices = Vec::with_capacity(indices.len());
            let mut j = 0;
            while j < indices.len() {
                let x = indices[j];
                let sibling = x ^ 1;
                next_indices.push(x / 2);

                if indices.get(j + 1) == Some(&sibling) {
                    source_flags.push(SourceFlag::FromHashes);
                    j += 2;
                    continue;
                }

                let hash = layer.get(sibling).ok_or(MerkleError::IndexOutOfBounds {
                    index: sibling,
                    layer: level,
                    len: layer.len(),
                })?;
                hashes.push(*hash);
                source_flags.push(SourceFlag::FromProof);
                j += 1;
            }
            trace!(level, nodes = indices.len(), proof_hashes = hashes.len(), "Proved layer");
            indices = next_indices;
        }

        Ok(Proof::new(hashes, source_flags))
    }
}
