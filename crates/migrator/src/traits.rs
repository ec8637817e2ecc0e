//! Contract-facing traits consumed by the migration phases.
//!
//! Every method is a network round trip. Read-only calls return decoded values; state-changing
//! calls send a transaction with the given [TxParams] and resolve once the receipt is available.

use crate::{TxParams, TxReceipt};
use alloy_primitives::{Address, U256};
use async_trait::async_trait;

/// Describes the chain-level queries needed to build transactions.
#[async_trait]
pub trait ChainClient {
    /// The error type for the client.
    type Error: core::error::Error + Send + Sync + 'static;

    /// Returns the network-suggested gas price, in wei.
    async fn gas_price(&self) -> Result<u128, Self::Error>;

    /// Returns the number of transactions sent from `account`, which is its next nonce.
    async fn transaction_count(&self, account: Address) -> Result<u64, Self::Error>;
}

/// Describes the token migrator contract: read access to the legacy ERC721 contracts and mint
/// access to the new ones.
#[async_trait]
pub trait TokenMigrator: ChainClient {
    /// Returns the number of legacy packs held by `account`.
    async fn packs_balance_of(&self, account: Address) -> Result<U256, Self::Error>;

    /// Returns the legacy pack id at `index` of `account`'s holdings.
    async fn packs_token_of_owner_by_index(
        &self,
        account: Address,
        index: U256,
    ) -> Result<U256, Self::Error>;

    /// Returns the number of legacy cards held by `account`.
    async fn cards_balance_of(&self, account: Address) -> Result<U256, Self::Error>;

    /// Returns the legacy card id at `index` of `account`'s holdings.
    async fn cards_token_of_owner_by_index(
        &self,
        account: Address,
        index: U256,
    ) -> Result<U256, Self::Error>;

    /// Returns `true` if the legacy pack has been opened.
    async fn is_token_frozen(&self, token_id: U256) -> Result<bool, Self::Error>;

    /// Returns the dot-separated card hashes inside a legacy pack.
    async fn pack_hash_by_id(&self, token_id: U256) -> Result<String, Self::Error>;

    /// Returns the hash of a legacy card.
    async fn card_hash_by_id(&self, token_id: U256) -> Result<U256, Self::Error>;

    /// Returns the rank encoded in a legacy card hash, as computed by the contract.
    async fn card_rank_from_hash(&self, hash: U256) -> Result<u64, Self::Error>;

    /// Returns the issue number encoded in a legacy card hash, as computed by the contract.
    async fn card_issue_from_hash(&self, hash: U256) -> Result<u64, Self::Error>;

    /// Mints a new pack holding the given cards to `account`.
    async fn mint_new_pack(
        &self,
        account: Address,
        pack_hash: String,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error>;

    /// Mints the given new cards to `account` in a single transaction.
    async fn mint_new_cards(
        &self,
        account: Address,
        cards: Vec<U256>,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error>;
}

/// Describes the ERC20 gum side of the token migrator contract.
#[async_trait]
pub trait GumMigrator: ChainClient {
    /// Moves `account`'s legacy gum balance to the new token.
    async fn migrate_token_holder(
        &self,
        account: Address,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error>;

    /// Mints the initial gum allocation to the reserve accounts.
    async fn distribute_initial_gum(&self, tx: TxParams) -> Result<TxReceipt, Self::Error>;
}

/// Describes the card library contract that tracks pack purchases.
#[async_trait]
pub trait CardLibrary: ChainClient {
    /// Sets the account allowed to call the library's restricted methods.
    async fn set_contract_controller(
        &self,
        controller: Address,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error>;

    /// Adds `count` to the number of packs `account` has purchased.
    async fn increment_purchased_pack_count(
        &self,
        account: Address,
        count: u64,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error>;
}
