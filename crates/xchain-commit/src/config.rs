//! Lane configuration for leaf hashing

use serde::{Deserialize, Serialize};
use xchain_types::Address;

use crate::error::{CommitError, CommitResult};

pub const ENV_SOURCE_CHAIN_SELECTOR: &str = "XCHAIN_SOURCE_CHAIN_SELECTOR";
pub const ENV_DEST_CHAIN_SELECTOR: &str = "XCHAIN_DEST_CHAIN_SELECTOR";
pub const ENV_ONRAMP_ADDRESS: &str = "XCHAIN_ONRAMP_ADDRESS";

/// Identifies the lane a leaf hasher commits messages for.
///
/// A lane is one (source chain, destination chain, on-ramp) triple; its
/// metadata hash is mixed into every leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafHasherConfig {
    pub source_chain_selector: u64,
    pub dest_chain_selector: u64,
    /// On-ramp contract on the source chain
    pub on_ramp: Address,
}

impl LeafHasherConfig {
    pub fn new(source_chain_selector: u64, dest_chain_selector: u64, on_ramp: Address) -> Self {
        Self {
            source_chain_selector,
            dest_chain_selector,
            on_ramp,
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> CommitResult<Self> {
        let config = Self {
            source_chain_selector: parse_env_u64(ENV_SOURCE_CHAIN_SELECTOR)?,
            dest_chain_selector: parse_env_u64(ENV_DEST_CHAIN_SELECTOR)?,
            on_ramp: read_env(ENV_ONRAMP_ADDRESS)?
                .trim()
                .parse()
                .map_err(|e| CommitError::Config(format!("{}: {}", ENV_ONRAMP_ADDRESS, e)))?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON document
    pub fn from_json(json: &str) -> CommitResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| CommitError::Config(format!("Invalid lane config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> CommitResult<()> {
        if self.source_chain_selector == 0 || self.dest_chain_selector == 0 {
            return Err(CommitError::Config(
                "chain selectors must be non-zero".to_string(),
            ));
        }
        if self.source_chain_selector == self.dest_chain_selector {
            return Err(CommitError::Config(format!(
                "source and destination chain selectors are both {}",
                self.source_chain_selector
            )));
        }
        if self.on_ramp.is_zero() {
            return Err(CommitError::Config("on-ramp address is zero".to_string()));
        }
        Ok(())
    }
}

fn read_env(key: &str) -> CommitResult<String> {
    std::env::var(key).map_err(|_| CommitError::Config(format!("{} is not set", key)))
}

fn parse_env_u64(key: &str) -> CommitResult<u64> {
    read_env(key)?
        .trim()
        .parse()
        .map_err(|e| CommitError::Config(format!("{}: {}", key, e)))
}
