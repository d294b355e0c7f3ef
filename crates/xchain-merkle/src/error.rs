//! Merkle error types

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    #[error("Cannot construct a tree without leaves")]
    EmptyLeaves,

    #[error("Sibling index {index} out of bounds for layer {layer} of length {len}")]
    IndexOutOfBounds {
        index: usize,
        layer: usize,
        len: usize,
    },

    #[error("Invalid hash length: expected {expected}, got {got}")]
    InvalidHashLength { expected: usize, got: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Proof validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Reasons a multi-proof is rejected by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("leaves and proofs are empty")]
    EmptyInput,

    #[error("leaves ({leaves}) or proofs ({proofs}) exceed limit {limit}")]
    SizeLimitExceeded {
        leaves: usize,
        proofs: usize,
        limit: usize,
    },

    #[error("total hashes {total} exceed limit {limit}")]
    TotalHashesExceeded { total: usize, limit: usize },

    #[error("hashes {total} != source flags {flags}")]
    FlagLengthMismatch { total: usize, flags: usize },

    #[error("proof source flags {flagged} != proof hashes {proofs}")]
    ProofCountMismatch { flagged: usize, proofs: usize },

    #[error("a proof without leaves cannot be verified")]
    NoLeaves,

    #[error("reconstruction read hash {position} past the {total} allocated")]
    BufferOverrun { position: usize, total: usize },

    #[error("not all proofs used during processing")]
    NotAllProofsUsed,

    #[error("{count} source flags do not fit in {limit} flag bits")]
    TooManyFlags { count: usize, limit: usize },
}

pub type MerkleResult<T> = std::result::Result<T, MerkleError>;
