//! Commit pipeline error types

use thiserror::Error;
use xchain_merkle::{HashValue, MerkleError};
use xchain_types::{CommitInterval, TypesError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("Failed to decode {field}: {reason}")]
    Decode { field: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Tried building a tree without leaves")]
    EmptyBatch,

    #[error("Interval {interval} holds more than {limit} messages")]
    BatchTooLarge {
        interval: CommitInterval,
        limit: usize,
    },

    #[error("Do not have full range {interval}, have {seq_nrs:?}")]
    NonContiguous {
        interval: CommitInterval,
        seq_nrs: Vec<u64>,
    },

    #[error("Sequence number {seq_nr} is outside {interval}")]
    OutOfInterval {
        seq_nr: u64,
        interval: CommitInterval,
    },

    #[error("Sequence numbers must be strictly ascending: {0:?}")]
    Unordered(Vec<u64>),

    #[error("Root does not verify: committed {committed}, computed {computed}")]
    RootMismatch {
        committed: HashValue,
        computed: HashValue,
    },

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Types(#[from] TypesError),
}

impl CommitError {
    pub(crate) fn decode(field: &'static str, reason: impl Into<String>) -> Self {
        CommitError::Decode {
            field,
            reason: reason.into(),
        }
    }
}

pub type CommitResult<T> = std::result::Result<T, CommitError>;
