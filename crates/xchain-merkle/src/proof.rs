//! Multi-proofs and stand-alone root reconstruction.
//!
//! [`verify_compute_root`] does not need a [`MerkleTree`](crate::MerkleTree): it is
//! the same algorithm the destination-chain verifier runs, and must stay
//! bit-for-bit identical to it. Callers compare the returned root against the
//! committed one themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::error::{MerkleError, MerkleResult, ValidationError};
use crate::hash::{HashContext, HashValue};
use crate::{HASH_LENGTH, MAX_NUMBER_TREE_LEAVES};

/// Where the first operand of a reconstruction step comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFlag {
    /// Already known: the next leaf, or a hash computed in an earlier step.
    FromHashes,
    /// Taken from [`Proof::hashes`].
    FromProof,
}

/// A multi-proof: the sibling hashes the verifier cannot derive plus one flag
/// per reconstruction step.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    hashes: Vec<HashValue>,
    source_flags: Vec<SourceFlag>,
}

impl Proof {
    pub fn new(hashes: Vec<HashValue>, source_flags: Vec<SourceFlag>) -> Self {
        Self {
            hashes,
            source_flags,
        }
    }

    /// Sibling hashes, in the order the verifier consumes them.
    pub fn hashes(&self) -> &[HashValue] {
        &self.hashes
    }

    pub fn source_flags(&self) -> &[SourceFlag] {
        &self.source_flags
    }

    /// Number of flags equal to `flag`.
    pub fn count_flags(&self, flag: SourceFlag) -> usize {
        self.source_flags.iter().filter(|f| **f == flag).count()
    }

    /// Pack the source flags for an execution payload.
    pub fn flag_bits(&self) -> MerkleResult<ProofFlagBits> {
        ProofFlagBits::from_flags(&self.source_flags)
    }

    pub fn into_parts(self) -> (Vec<HashValue>, Vec<SourceFlag>) {
        (self.hashes, self.source_flags)
    }
}

/// Source flags packed into a `uint256`, stored as 32 big-endian bytes.
///
/// Bit `i` (counting from the least significant bit) is set when step `i` is
/// [`SourceFlag::FromHashes`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ProofFlagBits([u8; HASH_LENGTH]);

impl ProofFlagBits {
    /// Maximum number of flags a single word can carry.
    pub const CAPACITY: usize = HASH_LENGTH * 8;

    pub fn from_flags(flags: &[SourceFlag]) -> MerkleResult<Self> {
        if flags.len() > Self::CAPACITY {
            return Err(ValidationError::TooManyFlags {
                count: flags.len(),
                limit: Self::CAPACITY,
            }
            .into());
        }
        let mut word = [0u8; HASH_LENGTH];
        for (i, flag) in flags.iter().enumerate() {
            if *flag == SourceFlag::FromHashes {
                word[HASH_LENGTH - 1 - i / 8] |= 1 << (i % 8);
            }
        }
        Ok(Self(word))
    }

    /// Unpack the first `count` flags.
    pub fn to_flags(&self, count: usize) -> MerkleResult<Vec<SourceFlag>> {
        if count > Self::CAPACITY {
            return Err(ValidationError::TooManyFlags {
                count,
                limit: Self::CAPACITY,
            }
            .into());
        }
        Ok((0..count)
            .map(|i| {
                if self.bit(i) {
                    SourceFlag::FromHashes
                } else {
                    SourceFlag::FromProof
                }
            })
            .collect())
    }

    fn bit(&self, index: usize) -> bool {
        (self.0[HASH_LENGTH - 1 - index / 8] >> (index % 8)) & 1 == 1
    }

    pub fn from_be_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn to_be_bytes(&self) -> [u8; HASH_LENGTH] {
        self.0
    }
}

impl From<u128> for ProofFlagBits {
    fn from(value: u128) -> Self {
        let mut word = [0u8; HASH_LENGTH];
        word[HASH_LENGTH - 16..].copy_from_slice(&value.to_be_bytes());
        Self(word)
    }
}

impl fmt::Display for ProofFlagBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ProofFlagBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProofFlagBits({})", self)
    }
}

/// Number of reconstruction steps for `leaves_len` leaves and `proofs_len`
/// proof hashes, after the size checks the verifier runs first.
///
/// This is also the number of source flags a valid proof carries, so callers
/// unpacking [`ProofFlagBits`] should size the unpacking with it.
pub fn total_hashes(leaves_len: usize, proofs_len: usize) -> MerkleResult<usize> {
    if leaves_len == 0 && proofs_len == 0 {
        return Err(ValidationError::EmptyInput.into());
    }
    if leaves_len > MAX_NUMBER_TREE_LEAVES + 1 || proofs_len > MAX_NUMBER_TREE_LEAVES + 1 {
        return Err(ValidationError::SizeLimitExceeded {
            leaves: leaves_len,
            proofs: proofs_len,
            limit: MAX_NUMBER_TREE_LEAVES + 1,
        }
        .into());
    }

    let total = leaves_len + proofs_len - 1;
    if total > MAX_NUMBER_TREE_LEAVES {
        return Err(ValidationError::TotalHashesExceeded {
            total,
            limit: MAX_NUMBER_TREE_LEAVES,
        }
        .into());
    }
    Ok(total)
}

/// Reconstruct the root committed to by `leaves` and `proof`.
///
/// `leaves` must be given in the same order as the indices that were proven.
/// The result is only a candidate root; it proves nothing until it has been
/// compared with a trusted one.
pub fn verify_compute_root<C>(ctx: &C, leaves: &[HashValue], proof: &Proof) -> MerkleResult<HashValue>
where
    C: HashContext + ?Sized,
{
    let result = compute_root(ctx, leaves, proof);
    if let Err(err) = &result {
        warn!(
            leaves = leaves.len(),
            proofs = proof.hashes.len(),
            flags = proof.source_flags.len(),
            error = %err,
            "Multi-proof rejected"
        );
    }
    result
}

fn compute_root<C>(ctx: &C, leaves: &[HashValue], proof: &Proof) -> MerkleResult<HashValue>
where
    C: HashContext + ?Sized,
{
    let leaves_len = leaves.len();
    let proofs_len = proof.hashes.len();

    let total = total_hashes(leaves_len, proofs_len)?;
    if total != proof.source_flags.len() {
        return Err(ValidationError::FlagLengthMismatch {
            total,
            flags: proof.source_flags.len(),
        }
        .into());
    }
    let flagged = proof.count_flags(SourceFlag::FromProof);
    if flagged != proofs_len {
        return Err(ValidationError::ProofCountMismatch {
            flagged,
            proofs: proofs_len,
        }
        .into());
    }

    if total == 0 {
        return leaves
            .first()
            .copied()
            .ok_or_else(|| ValidationError::NoLeaves.into());
    }

    // Slots not yet written read as zero, exactly like the verifier's memory array.
    let mut computed = vec![HashValue::ZERO; total];
    let mut cursor = Cursor {
        leaves,
        leaf_pos: 0,
        hash_pos: 0,
    };
    let mut proof_pos = 0;

    for i in 0..total {
        let a = match proof.source_flags[i] {
            SourceFlag::FromHashes => cursor.next_known(&computed)?,
            SourceFlag::FromProof => {
                let hash = proof.hashes[proof_pos];
                proof_pos += 1;
                hash
            }
        };
        let b = cursor.next_known(&computed)?;
        computed[i] = ctx.hash_internal(&a, &b);
    }

    if cursor.hash_pos != total - 1 || cursor.leaf_pos != leaves_len || proof_pos != proofs_len {
        return Err(ValidationError::NotAllProofsUsed.into());
    }
    Ok(computed[total - 1])
}

/// Read position over the leaves, then over the hashes computed so far.
struct Cursor<'a> {
    leaves: &'a [HashValue],
    leaf_pos: usize,
    hash_pos: usize,
}

impl Cursor<'_> {
    fn next_known(&mut self, computed: &[HashValue]) -> MerkleResult<HashValue> {
        if let Some(leaf) = self.leaves.get(self.leaf_pos) {
            self.leaf_pos += 1;
            return Ok(*leaf);
        }
        let hash = computed
            .get(self.hash_pos)
            .copied()
            .ok_or(MerkleError::Validation(ValidationError::BufferOverrun {
                position: self.hash_pos,
                total: computed.len(),
            }))?;
        self.hash_pos += 1;
        Ok(hash)
    }
}
