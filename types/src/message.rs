//! Cross-chain message records
//!
//! A message is emitted by the source-chain on-ramp and later executed on the
//! destination chain. Every field takes part in the leaf hash, so the record is
//! kept as a plain data type; encoding lives with the hasher.

use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// A token transferred alongside a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub token: Address,
    pub amount: U256,
}

/// A message sent from the source chain to the destination chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evm2EvmMessage {
    pub source_chain_selector: u64,
    pub sender: Address,
    pub receiver: Address,
    /// Per-lane sequence number, assigned by the on-ramp
    pub sequence_number: u64,
    pub gas_limit: U256,
    pub strict: bool,
    /// Per-sender nonce
    pub nonce: u64,
    pub fee_token: Address,
    pub fee_token_amount: U256,
    /// Opaque payload for the receiver
    pub data: Bytes,
    pub token_amounts: Vec<TokenAmount>,
    /// Pool-specific data, one entry per token amount
    pub source_token_data: Vec<Bytes>,
    pub message_id: B256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_message_serde_roundtrip() {
        let msg = Evm2EvmMessage {
            source_chain_selector: 1,
            sender: Address::repeat_byte(1),
            receiver: Address::repeat_byte(2),
            sequence_number: 7,
            gas_limit: U256::from(100u64),
            strict: false,
            nonce: 3,
            fee_token: Address::ZERO,
            fee_token_amount: U256::from(1u64),
            data: Bytes::from_static(&[0xDE, 0xAD]),
            token_amounts: vec![TokenAmount {
                token: address!("4440000000000000000000000000000000000001"),
                amount: U256::from(12_345_678_900u64),
            }],
            source_token_data: vec![Bytes::from_static(&[0xBE, 0xEF])],
            message_id: B256::repeat_byte(9),
        };

        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"data\":\"0xdead\""));
        assert!(json.contains("\"source_token_data\":[\"0xbeef\"]"));
        let back: Evm2EvmMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn test_address_from_hex() {
        let on_ramp: Address = "0x5550000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(on_ramp, address!("5550000000000000000000000000000000000001"));
        assert_eq!(&on_ramp.into_word()[..12], &[0u8; 12]);
        assert!("0x1234".parse::<Address>().is_err());
    }
}
