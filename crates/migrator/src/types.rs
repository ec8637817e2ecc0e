//! Common types shared by the migration phases.

use alloy_primitives::{Address, Bytes, B256, U256};
use core::fmt::{self, Display};
use serde::{Deserialize, Serialize};

/// The two ERC721 token families being migrated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Card packs. Minted one transaction per pack.
    Packs,
    /// Individual cards. Minted in batches.
    Cards,
}

impl TokenKind {
    /// Returns the plural label used in logs and the state file.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Packs => "packs",
            Self::Cards => "cards",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The gas price paid for a transaction, next to what the network suggested.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GasPrice {
    /// Price used for the transaction, in wei.
    pub actual: u128,
    /// Network-suggested price rounded down to whole gwei, in wei.
    pub suggested: u128,
}

/// Sender parameters of a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxParams {
    /// Sending account.
    pub from: Address,
    /// Account nonce.
    pub nonce: u64,
    /// Gas price, in wei.
    pub gas_price: u128,
}

/// A log entry emitted by a transaction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReceiptLog {
    /// Emitting contract.
    pub address: Address,
    /// Indexed topics; topic 0 is the event signature.
    pub topics: Vec<B256>,
    /// Non-indexed event data.
    pub data: Bytes,
}

impl ReceiptLog {
    /// Reads the 32-byte data word at `index` as an unsigned integer.
    pub fn data_word(&self, index: usize) -> Option<U256> {
        let start = index.checked_mul(32)?;
        let word = self.data.get(start..start + 32)?;
        Some(U256::from_be_slice(word))
    }
}

/// The parts of a transaction receipt the migration reads.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash.
    pub transaction_hash: B256,
    /// `true` if the transaction did not revert.
    pub success: bool,
    /// Gas consumed by the transaction.
    pub gas_used: u64,
    /// Logs emitted by the transaction, in order.
    pub logs: Vec<ReceiptLog>,
}

impl TxReceipt {
    /// Returns the token id carried by the first log, read as an ERC721
    /// `Transfer(from, to, tokenId)` event.
    pub fn minted_token_id(&self) -> Option<U256> {
        let topic = self.logs.first()?.topics.get(3)?;
        Some(U256::from_be_bytes(topic.0))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use alloy_primitives::{b256, bytes};

    #[test]
    fn test_minted_token_id() {
        let receipt = TxReceipt {
            logs: vec![ReceiptLog {
                topics: vec![
                    b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"),
                    B256::ZERO,
                    B256::ZERO,
                    B256::from(U256::from(42u64).to_be_bytes::<32>()),
                ],
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(receipt.minted_token_id(), Some(U256::from(42u64)));
        assert_eq!(TxReceipt::default().minted_token_id(), None);
    }

    #[test]
    fn test_data_word() {
        let log = ReceiptLog {
            data: bytes!("00000000000000000000000000000000000000000000000000000000000000070000000000000000000000000000000000000000000000000de0b6b3a7640000"),
            ..Default::default()
        };
        assert_eq!(log.data_word(0), Some(U256::from(7u64)));
        assert_eq!(log.data_word(1), Some(U256::from(1_000_000_000_000_000_000u64)));
        assert_eq!(log.data_word(2), None);
    }
}
