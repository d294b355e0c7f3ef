//! Canonical leaf hashing for cross-chain messages.
//!
//! ```text
//! metadataHash    = H(H(versionTag) || sourceChainSelector || destChainSelector || onRamp)
//! fixedFieldsHash = H(abi.encode(sender, receiver, seqNr, gasLimit, strict, nonce, feeToken, feeTokenAmount))
//! leaf            = H(0x00 || metadataHash || fixedFieldsHash || H(data)
//!                     || H(abi.encode(tokenAmounts)) || H(abi.encode(sourceTokenData)))
//! ```
//!
//! The pipeline is reproduced by the destination-chain verifier, so any change
//! here changes every root.

use tracing::trace;
use xchain_merkle::{HashContext, HashValue};
use xchain_types::{Address, Evm2EvmMessage};

use crate::abi;
use crate::config::LeafHasherConfig;
use crate::error::CommitResult;

/// Version tag mixed into the metadata hash
pub const MESSAGE_HASH_VERSION_TAG: &[u8] = b"EVM2EVMMessageHashV2";

/// Metadata hash for one lane.
pub fn metadata_hash<C>(
    ctx: &C,
    source_chain_selector: u64,
    dest_chain_selector: u64,
    on_ramp: &Address,
) -> HashValue
where
    C: HashContext + ?Sized,
{
    let version = ctx.hash(MESSAGE_HASH_VERSION_TAG);
    ctx.hash(&abi::encode_metadata(
        &version,
        source_chain_selector,
        dest_chain_selector,
        on_ramp,
    ))
}

/// Chained hash over a list of byte strings.
///
/// `h = H(b0)`, then `h = H(h || bi)` for the rest; an empty list gives the
/// all-zero word.
pub fn hash_bytes_of_bytes<C>(ctx: &C, list: &[Vec<u8>]) -> HashValue
where
    C: HashContext + ?Sized,
{
    let Some((first, rest)) = list.split_first() else {
        return HashValue::ZERO;
    };
    rest.iter().fold(ctx.hash(first), |acc, item| {
        let mut preimage = acc.to_vec();
        preimage.extend_from_slice(item);
        ctx.hash(&preimage)
    })
}

/// Turns message records of one lane into merkle leaves.
#[derive(Debug, Clone)]
pub struct LeafHasher<C> {
    ctx: C,
    config: LeafHasherConfig,
    metadata_hash: HashValue,
}

impl<C: HashContext> LeafHasher<C> {
    /// Create a hasher for a lane; the metadata hash is computed once here.
    pub fn new(config: LeafHasherConfig, ctx: C) -> Self {
        let metadata_hash = metadata_hash(
            &ctx,
            config.source_chain_selector,
            config.dest_chain_selector,
            &config.on_ramp,
        );
        Self {
            ctx,
            config,
            metadata_hash,
        }
    }

    pub fn config(&self) -> &LeafHasherConfig {
        &self.config
    }

    pub fn context(&self) -> &C {
        &self.ctx
    }

    pub fn metadata_hash(&self) -> HashValue {
        self.metadata_hash
    }

    /// Hash a decoded message record.
    pub fn hash_message(&self, msg: &Evm2EvmMessage) -> HashValue {
        let fixed_fields_hash = self.ctx.hash(&abi::encode_fixed_fields(msg));
        let data_hash = self.ctx.hash(&msg.data);
        let token_amounts_hash = self.ctx.hash(&abi::encode_token_amounts(&msg.token_amounts));
        let token_data_hash = self.ctx.hash(&abi::encode_bytes_array(&msg.source_token_data));

        let leaf = self.ctx.hash(&abi::encode_leaf_preimage(
            &self.metadata_hash,
            &fixed_fields_hash,
            &data_hash,
            &token_amounts_hash,
            &token_data_hash,
        ));
        trace!(seq_nr = msg.sequence_number, leaf = %leaf, "Hashed message leaf");
        leaf
    }

    /// Decode raw event data and hash the message it carries.
    ///
    /// A malformed record fails as a whole; no leaf is produced.
    pub fn hash_leaf(&self, event_data: &[u8]) -> CommitResult<HashValue> {
        let msg = abi::decode_message(event_data)?;
        Ok(self.hash_message(&msg))
    }
}
