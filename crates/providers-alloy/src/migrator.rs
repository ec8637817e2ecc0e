//! Contract access over an alloy provider.

use crate::bindings::{ICryptoCardsLib, ICryptoCardsTokenMigrator};
use alloy_primitives::{Address, U256};
use alloy_provider::{
    network::TransactionBuilder, PendingTransactionError, Provider, ReqwestProvider,
};
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_sol_types::SolCall;
use alloy_transport::TransportError;
use async_trait::async_trait;
use cards_migrator::{
    CardLibrary, ChainClient, GumMigrator, ReceiptLog, TokenMigrator, TxParams, TxReceipt,
};
use tracing::debug;

/// An error for the [AlloyMigrator].
#[derive(Debug, thiserror::Error)]
pub enum AlloyMigratorError {
    /// The JSON-RPC request failed.
    #[error("RPC error: {0}")]
    Rpc(#[from] TransportError),
    /// The transaction was sent but its receipt could not be retrieved.
    #[error("Pending transaction error: {0}")]
    Pending(#[from] PendingTransactionError),
    /// The contract returned data that does not match the call's return type.
    #[error("Failed to decode the return data of {call}: {source}")]
    Decode {
        /// The called function.
        call: &'static str,
        /// The underlying error.
        #[source]
        source: alloy_sol_types::Error,
    },
    /// The contract returned a number that does not fit the expected width.
    #[error("{call} returned {value}, which does not fit 64 bits")]
    Overflow {
        /// The called function.
        call: &'static str,
        /// The returned value.
        value: U256,
    },
}

/// The [AlloyMigrator] implements the migration contract traits over Ethereum JSON-RPC.
///
/// It talks to two contracts: the token migrator, which fronts the legacy and new token
/// contracts, and the card library.
#[derive(Debug, Clone)]
pub struct AlloyMigrator {
    inner: ReqwestProvider,
    token_migrator: Address,
    card_library: Address,
}

impl AlloyMigrator {
    /// Creates a new [AlloyMigrator] with the given alloy provider.
    pub const fn new(inner: ReqwestProvider, token_migrator: Address, card_library: Address) -> Self {
        Self { inner, token_migrator, card_library }
    }

    /// Creates a new [AlloyMigrator] from the provided [reqwest::Url].
    pub fn new_http(url: reqwest::Url, token_migrator: Address, card_library: Address) -> Self {
        Self::new(ReqwestProvider::new_http(url), token_migrator, card_library)
    }

    /// Returns the token migrator contract address.
    pub const fn token_migrator(&self) -> Address {
        self.token_migrator
    }

    /// Returns the card library contract address.
    pub const fn card_library(&self) -> Address {
        self.card_library
    }

    /// Returns the chain ID of the connected node.
    pub async fn chain_id(&self) -> Result<u64, AlloyMigratorError> {
        Ok(self.inner.get_chain_id().await?)
    }

    /// Performs a read-only call and decodes its return data.
    async fn call<C>(&self, to: Address, call: C) -> Result<C::Return, AlloyMigratorError>
    where
        C: SolCall + Send,
    {
        let mut request = TransactionRequest::default().to(to);
        request.input = call.abi_encode().into();
        let data = self.inner.call(&request).await?;
        C::abi_decode_returns(&data, true)
            .map_err(|source| AlloyMigratorError::Decode { call: C::SIGNATURE, source })
    }

    /// Sends a transaction and waits for its receipt.
    async fn send<C>(&self, to: Address, call: C, tx: TxParams) -> Result<TxReceipt, AlloyMigratorError>
    where
        C: SolCall + Send,
    {
        let mut request = TransactionRequest::default()
            .from(tx.from)
            .to(to)
            .nonce(tx.nonce)
            .with_gas_price(tx.gas_price);
        request.input = call.abi_encode().into();

        debug!(target: "provider", "Sending {} with nonce {}", C::SIGNATURE, tx.nonce);
        let pending = self.inner.send_transaction(request).await?;
        let receipt = pending.get_receipt().await?;
        Ok(convert_receipt(&receipt))
    }
}

fn narrow(call: &'static str, value: U256) -> Result<u64, AlloyMigratorError> {
    u64::try_from(value).map_err(|_| AlloyMigratorError::Overflow { call, value })
}

/// Keeps the parts of an RPC receipt the migration reads.
fn convert_receipt(receipt: &TransactionReceipt) -> TxReceipt {
    TxReceipt {
        transaction_hash: receipt.transaction_hash,
        success: receipt.status(),
        gas_used: u64::try_from(receipt.gas_used).unwrap_or(u64::MAX),
        logs: receipt
            .inner
            .logs()
            .iter()
            .map(|log| ReceiptLog {
                address: log.inner.address,
                topics: log.inner.data.topics().to_vec(),
                data: log.inner.data.data.clone(),
            })
            .collect(),
    }
}

#[async_trait]
impl ChainClient for AlloyMigrator {
    type Error = AlloyMigratorError;

    async fn gas_price(&self) -> Result<u128, Self::Error> {
        Ok(self.inner.get_gas_price().await?)
    }

    async fn transaction_count(&self, account: Address) -> Result<u64, Self::Error> {
        Ok(self.inner.get_transaction_count(account).await?)
    }
}

#[async_trait]
impl TokenMigrator for AlloyMigrator {
    async fn packs_balance_of(&self, account: Address) -> Result<U256, Self::Error> {
        let call = ICryptoCardsTokenMigrator::packsBalanceOfCall { owner: account };
        Ok(self.call(self.token_migrator, call).await?._0)
    }

    async fn packs_token_of_owner_by_index(
        &self,
        account: Address,
        index: U256,
    ) -> Result<U256, Self::Error> {
        let call = ICryptoCardsTokenMigrator::packsTokenOfOwnerByIndexCall { owner: account, index };
        Ok(self.call(self.token_migrator, call).await?._0)
    }

    async fn cards_balance_of(&self, account: Address) -> Result<U256, Self::Error> {
        let call = ICryptoCardsTokenMigrator::cardsBalanceOfCall { owner: account };
        Ok(self.call(self.token_migrator, call).await?._0)
    }

    async fn cards_token_of_owner_by_index(
        &self,
        account: Address,
        index: U256,
    ) -> Result<U256, Self::Error> {
        let call = ICryptoCardsTokenMigrator::cardsTokenOfOwnerByIndexCall { owner: account, index };
        Ok(self.call(self.token_migrator, call).await?._0)
    }

    async fn is_token_frozen(&self, token_id: U256) -> Result<bool, Self::Error> {
        let call = ICryptoCardsTokenMigrator::isTokenFrozenCall { tokenId: token_id };
        Ok(self.call(self.token_migrator, call).await?._0)
    }

    async fn pack_hash_by_id(&self, token_id: U256) -> Result<String, Self::Error> {
        let call = ICryptoCardsTokenMigrator::packHashByIdCall { tokenId: token_id };
        Ok(self.call(self.token_migrator, call).await?._0)
    }

    async fn card_hash_by_id(&self, token_id: U256) -> Result<U256, Self::Error> {
        let call = ICryptoCardsTokenMigrator::cardHashByIdCall { tokenId: token_id };
        Ok(self.call(self.token_migrator, call).await?._0)
    }

    async fn card_rank_from_hash(&self, hash: U256) -> Result<u64, Self::Error> {
        let call = ICryptoCardsLib::cardRankFromHashCall { cardHash: hash };
        let rank = self.call(self.card_library, call).await?._0;
        narrow(ICryptoCardsLib::cardRankFromHashCall::SIGNATURE, rank)
    }

    async fn card_issue_from_hash(&self, hash: U256) -> Result<u64, Self::Error> {
        let call = ICryptoCardsLib::cardIssueFromHashCall { cardHash: hash };
        let issue = self.call(self.card_library, call).await?._0;
        narrow(ICryptoCardsLib::cardIssueFromHashCall::SIGNATURE, issue)
    }

    async fn mint_new_pack(
        &self,
        account: Address,
        pack_hash: String,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let call = ICryptoCardsTokenMigrator::mintNewPackCall { to: account, packData: pack_hash };
        self.send(self.token_migrator, call, tx).await
    }

    async fn mint_new_cards(
        &self,
        account: Address,
        cards: Vec<U256>,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let call = ICryptoCardsTokenMigrator::mintNewCardsCall { to: account, cardHashes: cards };
        self.send(self.token_migrator, call, tx).await
    }
}

#[async_trait]
impl GumMigrator for AlloyMigrator {
    async fn migrate_token_holder(
        &self,
        account: Address,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let call = ICryptoCardsTokenMigrator::migrateTokenHolderCall { tokenHolder: account };
        self.send(self.token_migrator, call, tx).await
    }

    async fn distribute_initial_gum(&self, tx: TxParams) -> Result<TxReceipt, Self::Error> {
        let call = ICryptoCardsTokenMigrator::distributeInitialGumCall {};
        self.send(self.token_migrator, call, tx).await
    }
}

#[async_trait]
impl CardLibrary for AlloyMigrator {
    async fn set_contract_controller(
        &self,
        controller: Address,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let call = ICryptoCardsLib::setContractControllerCall { controller };
        self.send(self.card_library, call, tx).await
    }

    async fn increment_purchased_pack_count(
        &self,
        account: Address,
        count: u64,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let call =
            ICryptoCardsLib::incrementPurchasedPackCountCall { owner: account, amount: U256::from(count) };
        self.send(self.card_library, call, tx).await
    }
}
