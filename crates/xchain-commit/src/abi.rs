//! Ethereum ABI encoding for message records.
//!
//! The on-ramp emits each message as the single dynamic tuple argument of its
//! send-requested event. The leaf hash is built from `abi.encode` of pieces of
//! that record, so every encoder here mirrors one `abi.encode` call of the
//! verifying contract.

use alloy_primitives::{Address, B256};
use alloy_sol_types::{sol, SolValue};
use xchain_merkle::{hash::prefix, HashValue};
use xchain_types::{Bytes, Evm2EvmMessage, TokenAmount};

use crate::error::{CommitError, CommitResult};

sol! {
    /// On-chain token amount tuple
    #[derive(Debug, PartialEq, Eq)]
    struct EVMTokenAmount {
        address token;
        uint256 amount;
    }

    /// On-chain message tuple, field order as emitted by the on-ramp
    #[derive(Debug, PartialEq, Eq)]
    struct EVM2EVMMessage {
        uint64 sourceChainSelector;
        address sender;
        address receiver;
        uint64 sequenceNumber;
        uint256 gasLimit;
        bool strict;
        uint64 nonce;
        address feeToken;
        uint256 feeTokenAmount;
        bytes data;
        EVMTokenAmount[] tokenAmounts;
        bytes[] sourceTokenData;
        bytes32 messageId;
    }
}

impl From<&TokenAmount> for EVMTokenAmount {
    fn from(ta: &TokenAmount) -> Self {
        Self {
            token: ta.token,
            amount: ta.amount,
        }
    }
}

impl From<EVMTokenAmount> for TokenAmount {
    fn from(ta: EVMTokenAmount) -> Self {
        Self {
            token: ta.token,
            amount: ta.amount,
        }
    }
}

impl From<&Evm2EvmMessage> for EVM2EVMMessage {
    fn from(msg: &Evm2EvmMessage) -> Self {
        Self {
            sourceChainSelector: msg.source_chain_selector,
            sender: msg.sender,
            receiver: msg.receiver,
            sequenceNumber: msg.sequence_number,
            gasLimit: msg.gas_limit,
            strict: msg.strict,
            nonce: msg.nonce,
            feeToken: msg.fee_token,
            feeTokenAmount: msg.fee_token_amount,
            data: msg.data.clone(),
            tokenAmounts: msg.token_amounts.iter().map(EVMTokenAmount::from).collect(),
            sourceTokenData: msg.source_token_data.clone(),
            messageId: msg.message_id,
        }
    }
}

impl From<EVM2EVMMessage> for Evm2EvmMessage {
    fn from(msg: EVM2EVMMessage) -> Self {
        Self {
            source_chain_selector: msg.sourceChainSelector,
            sender: msg.sender,
            receiver: msg.receiver,
            sequence_number: msg.sequenceNumber,
            gas_limit: msg.gasLimit,
            strict: msg.strict,
            nonce: msg.nonce,
            fee_token: msg.feeToken,
            fee_token_amount: msg.feeTokenAmount,
            data: msg.data,
            token_amounts: msg.tokenAmounts.into_iter().map(TokenAmount::from).collect(),
            source_token_data: msg.sourceTokenData,
            message_id: msg.messageId,
        }
    }
}

fn word(hash: &HashValue) -> B256 {
    B256::from(*hash.as_bytes())
}

/// `abi.encode(keccak256(versionTag), sourceChainSelector, destChainSelector, onRamp)`
pub fn encode_metadata(
    version_hash: &HashValue,
    source_chain_selector: u64,
    dest_chain_selector: u64,
    on_ramp: &Address,
) -> Vec<u8> {
    (
        word(version_hash),
        source_chain_selector,
        dest_chain_selector,
        *on_ramp,
    )
        .abi_encode_params()
}

/// `abi.encode(sender, receiver, sequenceNumber, gasLimit, strict, nonce, feeToken, feeTokenAmount)`
pub fn encode_fixed_fields(msg: &Evm2EvmMessage) -> Vec<u8> {
    (
        msg.sender,
        msg.receiver,
        msg.sequence_number,
        msg.gas_limit,
        msg.strict,
        msg.nonce,
        msg.fee_token,
        msg.fee_token_amount,
    )
        .abi_encode_params()
}

/// `abi.encode(tokenAmounts)` for a `tuple(address token, uint256 amount)[]`
pub fn encode_token_amounts(token_amounts: &[TokenAmount]) -> Vec<u8> {
    token_amounts
        .iter()
        .map(EVMTokenAmount::from)
        .collect::<Vec<_>>()
        .abi_encode()
}

/// `abi.encode(list)` for a `bytes[]`
pub fn encode_bytes_array(list: &[Bytes]) -> Vec<u8> {
    list.to_vec().abi_encode()
}

/// Leaf preimage: leaf domain separator, then the five component hashes.
pub fn encode_leaf_preimage(
    metadata_hash: &HashValue,
    fixed_fields_hash: &HashValue,
    data_hash: &HashValue,
    token_amounts_hash: &HashValue,
    token_data_hash: &HashValue,
) -> Vec<u8> {
    (
        B256::from(prefix::LEAF_DOMAIN_SEPARATOR),
        word(metadata_hash),
        word(fixed_fields_hash),
        word(data_hash),
        word(token_amounts_hash),
        word(token_data_hash),
    )
        .abi_encode_params()
}

/// Encode a message the way the on-ramp emits it in its event data.
pub fn encode_message(msg: &Evm2EvmMessage) -> Vec<u8> {
    EVM2EVMMessage::from(msg).abi_encode()
}

/// Decode the event payload produced by [`encode_message`].
///
/// Static words are type-checked while decoding. The payload must also be the
/// canonical encoding of the decoded record, which rejects dirty padding after
/// dynamic `bytes`, unusual offsets and trailing data.
pub fn decode_message(data: &[u8]) -> CommitResult<Evm2EvmMessage> {
    let decoded = EVM2EVMMessage::abi_decode(data, true)
        .map_err(|e| CommitError::decode("message", e.to_string()))?;
    let msg = Evm2EvmMessage::from(decoded);

    if encode_message(&msg) != data {
        return Err(CommitError::decode("message", "non-canonical encoding"));
    }
    Ok(msg)
}
