//! Shared data types for cross-chain message commitments.

pub mod interval;
pub mod message;

pub use alloy_primitives::{Address, Bytes, B256, U256};
pub use interval::CommitInterval;
pub use message::{Evm2EvmMessage, TokenAmount};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("Invalid interval: min {min} > max {max}")]
    InvalidInterval { min: u64, max: u64 },
}

pub type TypesResult<T> = std::result::Result<T, TypesError>;
