//! Commit batches and execution proofs.
//!
//! A batch is the contiguous run of messages committed under one root. Later,
//! any ascending subset of those messages can be executed with a single
//! [`ExecutionProof`], which the destination chain checks against the
//! committed [`CommitReport`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use xchain_merkle::{
    total_hashes, verify_compute_root, HashContext, HashValue, MerkleTree, Proof, ProofFlagBits,
    MAX_NUMBER_TREE_LEAVES,
};
use xchain_types::CommitInterval;

use crate::error::{CommitError, CommitResult};

/// A leaf hash together with the sequence number of its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedLeaf {
    pub sequence_number: u64,
    pub hash: HashValue,
}

/// What gets committed to the destination chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReport {
    pub merkle_root: HashValue,
    pub interval: CommitInterval,
}

/// True iff `seq_nrs` is exactly `interval.min..=interval.max`, in order.
pub fn contiguous_sequence_numbers(interval: &CommitInterval, seq_nrs: &[u64]) -> bool {
    if interval.len() != seq_nrs.len() as u64 {
        return false;
    }
    seq_nrs
        .iter()
        .zip(interval.min..=interval.max)
        .all(|(got, expected)| *got == expected)
}

/// The messages of one interval and the tree built over them.
#[derive(Debug, Clone)]
pub struct CommittedBatch {
    interval: CommitInterval,
    tree: MerkleTree,
}

impl CommittedBatch {
    /// Build the tree for `interval` from its leaves, ordered by sequence number.
    pub fn build<C>(ctx: &C, interval: CommitInterval, entries: &[SequencedLeaf]) -> CommitResult<Self>
    where
        C: HashContext + ?Sized,
    {
        if entries.is_empty() {
            warn!(%interval, "No leaves for commit interval");
            return Err(CommitError::EmptyBatch);
        }
        if interval.len() > MAX_NUMBER_TREE_LEAVES as u64 {
            return Err(CommitError::BatchTooLarge {
                interval,
                limit: MAX_NUMBER_TREE_LEAVES,
            });
        }

        let seq_nrs: Vec<u64> = entries.iter().map(|e| e.sequence_number).collect();
        if !contiguous_sequence_numbers(&interval, &seq_nrs) {
            return Err(CommitError::NonContiguous { interval, seq_nrs });
        }

        let leaves = entries.iter().map(|e| e.hash).collect();
        let tree = MerkleTree::build(ctx, leaves)?;
        info!(%interval, root = %tree.root(), "Built commit batch");

        Ok(Self { interval, tree })
    }

    pub fn interval(&self) -> CommitInterval {
        self.interval
    }

    pub fn root(&self) -> HashValue {
        self.tree.root()
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    pub fn report(&self) -> CommitReport {
        CommitReport {
            merkle_root: self.root(),
            interval: self.interval,
        }
    }

    /// Prove the messages with the given sequence numbers.
    ///
    /// Sequence numbers must be strictly ascending and inside the interval.
    pub fn execution_proof(&self, seq_nrs: &[u64]) -> CommitResult<ExecutionProof> {
        if seq_nrs.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CommitError::Unordered(seq_nrs.to_vec()));
        }

        let mut indices = Vec::with_capacity(seq_nrs.len());
        for seq_nr in seq_nrs {
            let offset = self
                .interval
                .offset_of(*seq_nr)
                .ok_or(CommitError::OutOfInterval {
                    seq_nr: *seq_nr,
                    interval: self.interval,
                })?;
            indices.push(offset as usize);
        }

        let proof = self.tree.prove(&indices)?;
        let leaf_hashes: Vec<HashValue> = indices.iter().map(|i| self.tree.leaves()[*i]).collect();
        let proof_flag_bits = proof.flag_bits()?;
        debug!(
            interval = %self.interval,
            messages = leaf_hashes.len(),
            proofs = proof.hashes().len(),
            "Built execution proof"
        );

        let (proofs, _) = proof.into_parts();
        Ok(ExecutionProof {
            leaf_hashes,
            proofs,
            proof_flag_bits,
        })
    }
}

/// Execution payload fields needed to check messages against a committed root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionProof {
    /// Leaves of the executed messages, in ascending sequence order
    pub leaf_hashes: Vec<HashValue>,
    pub proofs: Vec<HashValue>,
    pub proof_flag_bits: ProofFlagBits,
}

impl ExecutionProof {
    /// Rebuild the root the way the destination chain does.
    pub fn compute_root<C>(&self, ctx: &C) -> CommitResult<HashValue>
    where
        C: HashContext + ?Sized,
    {
        // size limits first, so an oversized payload is not reported as a flag error
        let steps = total_hashes(self.leaf_hashes.len(), self.proofs.len())?;
        let flags = self.proof_flag_bits.to_flags(steps)?;
        let proof = Proof::new(self.proofs.clone(), flags);
        Ok(verify_compute_root(ctx, &self.leaf_hashes, &proof)?)
    }

    /// Check the proof against a committed report.
    pub fn verify<C>(&self, ctx: &C, report: &CommitReport) -> CommitResult<()>
    where
        C: HashContext + ?Sized,
    {
        let computed = self.compute_root(ctx)?;
        if computed != report.merkle_root {
            warn!(
                interval = %report.interval,
                committed = %report.merkle_root,
                computed = %computed,
                "Root does not verify"
            );
            return Err(CommitError::RootMismatch {
                committed: report.merkle_root,
                computed,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xchain_merkle::{KeccakContext, MerkleError, ValidationError};

    fn entries(ctx: &KeccakContext, interval: CommitInterval) -> Vec<SequencedLeaf> {
        (interval.min..=interval.max)
            .map(|seq_nr| SequencedLeaf {
                sequence_number: seq_nr,
                hash: ctx.hash(&seq_nr.to_be_bytes()),
            })
            .collect()
    }

    #[test]
    fn test_contiguous_sequence_numbers() {
        let interval = CommitInterval::new(5, 8).unwrap();
        assert!(contiguous_sequence_numbers(&interval, &[5, 6, 7, 8]));
        assert!(!contiguous_sequence_numbers(&interval, &[5, 6, 8]));
        assert!(!contiguous_sequence_numbers(&interval, &[5, 7, 6, 8]));
        assert!(!contiguous_sequence_numbers(&interval, &[5, 6, 7, 8, 9]));
    }

    #[test]
    fn test_build_rejects_bad_batches() {
        let ctx = KeccakContext::new();
        let interval = CommitInterval::new(1, 4).unwrap();

        assert_eq!(
            CommittedBatch::build(&ctx, interval, &[]).unwrap_err(),
            CommitError::EmptyBatch
        );

        let mut gappy = entries(&ctx, interval);
        gappy.remove(2);
        assert!(matches!(
            CommittedBatch::build(&ctx, interval, &gappy),
            Err(CommitError::NonContiguous { .. })
        ));

        let huge = CommitInterval::new(1, 300).unwrap();
        assert!(matches!(
            CommittedBatch::build(&ctx, huge, &entries(&ctx, huge)),
            Err(CommitError::BatchTooLarge { limit: 256, .. })
        ));
    }

    #[test]
    fn test_execution_proof_verifies() {
        let ctx = KeccakContext::new();
        let interval = CommitInterval::new(100, 110).unwrap();
        let batch = CommittedBatch::build(&ctx, interval, &entries(&ctx, interval)).unwrap();
        let report = batch.report();

        for seq_nrs in [vec![100], vec![110], vec![101, 102, 107], (100..=110).collect()] {
            let proof = batch.execution_proof(&seq_nrs).unwrap();
            assert_eq!(proof.leaf_hashes.len(), seq_nrs.len());
            proof.verify(&ctx, &report).unwrap();
        }
    }

    #[test]
    fn test_execution_proof_rejects_bad_sequence_numbers() {
        let ctx = KeccakContext::new();
        let interval = CommitInterval::new(10, 13).unwrap();
        let batch = CommittedBatch::build(&ctx, interval, &entries(&ctx, interval)).unwrap();

        assert!(matches!(
            batch.execution_proof(&[9]),
            Err(CommitError::OutOfInterval { seq_nr: 9, .. })
        ));
        assert!(matches!(batch.execution_proof(&[12, 11]), Err(CommitError::Unordered(_))));
        assert!(matches!(batch.execution_proof(&[11, 11]), Err(CommitError::Unordered(_))));
    }

    #[test]
    fn test_tampered_leaf_fails_verification() {
        let ctx = KeccakContext::new();
        let interval = CommitInterval::new(1, 6).unwrap();
        let batch = CommittedBatch::build(&ctx, interval, &entries(&ctx, interval)).unwrap();

        let mut proof = batch.execution_proof(&[2, 5]).unwrap();
        proof.leaf_hashes[1] = ctx.hash(b"forged");
        assert!(matches!(
            proof.verify(&ctx, &batch.report()),
            Err(CommitError::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_corrupted_flag_bits_are_invalid() {
        let ctx = KeccakContext::new();
        let interval = CommitInterval::new(1, 6).unwrap();
        let batch = CommittedBatch::build(&ctx, interval, &entries(&ctx, interval)).unwrap();

        let mut proof = batch.execution_proof(&[3]).unwrap();
        assert_eq!(proof.proof_flag_bits, ProofFlagBits::default());

        proof.proof_flag_bits = ProofFlagBits::from(u128::MAX);
        assert!(matches!(
            proof.verify(&ctx, &batch.report()),
            Err(CommitError::Merkle(MerkleError::Validation(
                ValidationError::ProofCountMismatch { flagged: 0, proofs: 3 }
            )))
        ));
    }

    #[test]
    fn test_oversized_payload_hits_size_limits() {
        let ctx = KeccakContext::new();
        let interval = CommitInterval::new(1, 256).unwrap();
        let batch = CommittedBatch::build(&ctx, interval, &entries(&ctx, interval)).unwrap();
        let report = batch.report();

        let mut proof = batch.execution_proof(&(1..=256).collect::<Vec<_>>()).unwrap();
        assert!(proof.proofs.is_empty());
        proof.leaf_hashes.extend((0..44u8).map(|i| ctx.hash(&[i])));
        assert_eq!(
            proof.verify(&ctx, &report),
            Err(CommitError::Merkle(MerkleError::Validation(
                ValidationError::SizeLimitExceeded {
                    leaves: 300,
                    proofs: 0,
                    limit: 257
                }
            )))
        );

        let mut proof = batch.execution_proof(&[1]).unwrap();
        proof.leaf_hashes = (0..200u8).map(|i| ctx.hash(&[i])).collect();
        proof.proofs = (0..100u8).map(|i| ctx.hash(&[i, i])).collect();
        assert_eq!(
            proof.verify(&ctx, &report),
            Err(CommitError::Merkle(MerkleError::Validation(
                ValidationError::TotalHashesExceeded {
                    total: 299,
                    limit: 256
                }
            )))
        );
    }
}
