//! # xchain-commit
//!
//! Turns cross-chain message records into committed merkle roots and proves
//! subsets of them for execution.
//!
//! - [`LeafHasher`]: canonical per-message leaf hashing for one lane
//! - [`CommittedBatch`]: tree over one contiguous sequence-number interval
//! - [`ExecutionProof`]: leaves, proof hashes and packed flag bits, checked
//!   against a [`CommitReport`]

pub mod abi;
pub mod batch;
pub mod config;
pub mod error;
pub mod hasher;

pub use batch::{
    contiguous_sequence_numbers, CommitReport, CommittedBatch, ExecutionProof, SequencedLeaf,
};
pub use config::LeafHasherConfig;
pub use error::{CommitError, CommitResult};
pub use hasher::{hash_bytes_of_bytes, metadata_hash, LeafHasher, MESSAGE_HASH_VERSION_TAG};
