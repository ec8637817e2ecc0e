//! An in-memory stand-in for the legacy and new token contracts.

use crate::{
    CardLibrary, ChainClient, GumMigrator, ReceiptLog, TokenKind, TokenMigrator, TxParams,
    TxReceipt,
};
use alloy_primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use cards_codec::LegacyCard;
use spin::Mutex;
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};
use thiserror::Error;

/// Gas reported for every mint transaction.
pub const MINT_GAS: u64 = 150_000;
/// Gas reported for every other transaction.
pub const TX_GAS: u64 = 45_000;

/// First token id handed out for minted packs.
const FIRST_NEW_PACK_ID: u64 = 1_000;

/// `keccak256("Transfer(address,address,uint256)")`
const TRANSFER_TOPIC: B256 = B256::new([
    0xdd, 0xf2, 0x52, 0xad, 0x1b, 0xe2, 0xc8, 0x9b, 0x69, 0xc2, 0xb0, 0x68, 0xfc, 0x37, 0x8d, 0xaa,
    0x95, 0x2b, 0xa7, 0xf1, 0x63, 0xc4, 0xa1, 0x16, 0x28, 0xf5, 0x5a, 0x4d, 0xf5, 0x23, 0xb3, 0xef,
]);

/// An error for the [TestChain].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TestChainError {
    /// A failure injected with [TestChain::fail_next_mint].
    #[error("injected failure")]
    Injected,
    /// No legacy token with this id exists.
    #[error("unknown token {0}")]
    UnknownToken(U256),
    /// The index is past the end of the holder's tokens.
    #[error("index {index} out of bounds for {account}")]
    IndexOutOfBounds {
        /// The holder.
        account: Address,
        /// The requested index.
        index: U256,
    },
}

#[derive(Debug, Default)]
struct Inner {
    gas_price: u128,
    gas_price_queries: usize,
    tx_counts: BTreeMap<Address, u64>,

    packs: BTreeMap<Address, Vec<U256>>,
    cards: BTreeMap<Address, Vec<U256>>,
    frozen: BTreeSet<U256>,
    pack_hashes: BTreeMap<U256, String>,
    card_hashes: BTreeMap<U256, U256>,
    index_queries: Vec<(TokenKind, Address, U256)>,
    contract_decodes: usize,

    fail_next_mint: bool,
    revert_next_tx: bool,
    omit_transfer_logs: bool,
    next_pack_id: u64,
    minted_packs: Vec<(Address, String)>,
    minted_cards: Vec<(Address, Vec<U256>)>,
    sent: Vec<TxParams>,

    gum_balances: BTreeMap<Address, (U256, U256)>,
    gum_migrated: Vec<Address>,
    gum_distributed: bool,

    controllers: Vec<Address>,
    purchases: Vec<(Address, u64)>,
}

impl Inner {
    fn receipt(&mut self, tx: TxParams, gas_used: u64, logs: Vec<ReceiptLog>) -> TxReceipt {
        self.sent.push(tx);
        let success = !core::mem::take(&mut self.revert_next_tx);
        TxReceipt {
            transaction_hash: B256::from(U256::from(tx.nonce).to_be_bytes::<32>()),
            success,
            gas_used,
            logs: if success { logs } else { Vec::new() },
        }
    }

    fn holdings(&self, kind: TokenKind, account: Address) -> &[U256] {
        let map = match kind {
            TokenKind::Packs => &self.packs,
            TokenKind::Cards => &self.cards,
        };
        map.get(&account).map(Vec::as_slice).unwrap_or_default()
    }

    fn token_at(
        &mut self,
        kind: TokenKind,
        account: Address,
        index: U256,
    ) -> Result<U256, TestChainError> {
        self.index_queries.push((kind, account, index));
        usize::try_from(index)
            .ok()
            .and_then(|i| self.holdings(kind, account).get(i).copied())
            .ok_or(TestChainError::IndexOutOfBounds { account, index })
    }

    fn take_mint_failure(&mut self) -> Result<(), TestChainError> {
        if core::mem::take(&mut self.fail_next_mint) {
            return Err(TestChainError::Injected);
        }
        Ok(())
    }
}

fn transfer_log(to: Address, token_id: U256) -> ReceiptLog {
    ReceiptLog {
        address: Address::ZERO,
        topics: vec![
            TRANSFER_TOPIC,
            B256::ZERO,
            to.into_word(),
            B256::from(token_id.to_be_bytes::<32>()),
        ],
        data: Bytes::new(),
    }
}

/// An in-memory chain holding legacy packs, cards and gum balances.
///
/// Cloning shares the underlying state, so a test can hand one clone to the code under test
/// and inspect another.
#[derive(Debug, Default, Clone)]
pub struct TestChain {
    inner: Arc<Mutex<Inner>>,
}

impl TestChain {
    /// Sets the gas price suggested by the network.
    pub fn set_gas_price(&self, wei: u128) {
        self.inner.lock().gas_price = wei;
    }

    /// Returns how many times the gas price was queried.
    pub fn gas_price_queries(&self) -> usize {
        self.inner.lock().gas_price_queries
    }

    /// Sets the on-chain transaction count of `account`.
    pub fn set_transaction_count(&self, account: Address, count: u64) {
        self.inner.lock().tx_counts.insert(account, count);
    }

    /// Gives `owner` a legacy pack holding the given dot-separated card hashes.
    pub fn add_pack(&self, owner: Address, token_id: u64, pack_hash: &str, frozen: bool) {
        let mut inner = self.inner.lock();
        let id = U256::from(token_id);
        inner.packs.entry(owner).or_default().push(id);
        inner.pack_hashes.insert(id, pack_hash.to_string());
        if frozen {
            inner.frozen.insert(id);
        }
    }

    /// Gives `owner` a legacy card with the given hash.
    pub fn add_card(&self, owner: Address, token_id: u64, hash: U256) {
        let mut inner = self.inner.lock();
        let id = U256::from(token_id);
        inner.cards.entry(owner).or_default().push(id);
        inner.card_hashes.insert(id, hash);
    }

    /// Gives `account` a legacy gum balance, reported as `(old, new)` on migration.
    pub fn set_gum_balance(&self, account: Address, old: U256, new: U256) {
        self.inner.lock().gum_balances.insert(account, (old, new));
    }

    /// Makes the next mint call fail before sending anything.
    pub fn fail_next_mint(&self) {
        self.inner.lock().fail_next_mint = true;
    }

    /// Makes the next transaction revert.
    pub fn revert_next_tx(&self) {
        self.inner.lock().revert_next_tx = true;
    }

    /// Stops pack mints from emitting a `Transfer` event.
    pub fn omit_transfer_logs(&self) {
        self.inner.lock().omit_transfer_logs = true;
    }

    /// Returns every `(account, pack_hash)` passed to `mint_new_pack`.
    pub fn minted_packs(&self) -> Vec<(Address, String)> {
        self.inner.lock().minted_packs.clone()
    }

    /// Returns every `(account, cards)` passed to `mint_new_cards`.
    pub fn minted_cards(&self) -> Vec<(Address, Vec<U256>)> {
        self.inner.lock().minted_cards.clone()
    }

    /// Returns the parameters of every transaction sent, in order.
    pub fn sent(&self) -> Vec<TxParams> {
        self.inner.lock().sent.clone()
    }

    /// Returns every `(kind, account, index)` lookup, in order.
    pub fn index_queries(&self) -> Vec<(TokenKind, Address, U256)> {
        self.inner.lock().index_queries.clone()
    }

    /// Returns how many hash fields were decoded by the contract.
    pub fn contract_decodes(&self) -> usize {
        self.inner.lock().contract_decodes
    }

    /// Returns the holders whose gum was migrated, in order.
    pub fn gum_migrated(&self) -> Vec<Address> {
        self.inner.lock().gum_migrated.clone()
    }

    /// Returns `true` once the initial gum has been distributed.
    pub fn gum_distributed(&self) -> bool {
        self.inner.lock().gum_distributed
    }

    /// Returns every controller set on the card library, in order.
    pub fn controllers(&self) -> Vec<Address> {
        self.inner.lock().controllers.clone()
    }

    /// Returns every purchase count increment, in order.
    pub fn purchases(&self) -> Vec<(Address, u64)> {
        self.inner.lock().purchases.clone()
    }
}

#[async_trait]
impl ChainClient for TestChain {
    type Error = TestChainError;

    async fn gas_price(&self) -> Result<u128, Self::Error> {
        let mut inner = self.inner.lock();
        inner.gas_price_queries += 1;
        Ok(inner.gas_price)
    }

    async fn transaction_count(&self, account: Address) -> Result<u64, Self::Error> {
        Ok(self.inner.lock().tx_counts.get(&account).copied().unwrap_or_default())
    }
}

#[async_trait]
impl TokenMigrator for TestChain {
    async fn packs_balance_of(&self, account: Address) -> Result<U256, Self::Error> {
        Ok(U256::from(self.inner.lock().holdings(TokenKind::Packs, account).len()))
    }

    async fn packs_token_of_owner_by_index(
        &self,
        account: Address,
        index: U256,
    ) -> Result<U256, Self::Error> {
        self.inner.lock().token_at(TokenKind::Packs, account, index)
    }

    async fn cards_balance_of(&self, account: Address) -> Result<U256, Self::Error> {
        Ok(U256::from(self.inner.lock().holdings(TokenKind::Cards, account).len()))
    }

    async fn cards_token_of_owner_by_index(
        &self,
        account: Address,
        index: U256,
    ) -> Result<U256, Self::Error> {
        self.inner.lock().token_at(TokenKind::Cards, account, index)
    }

    async fn is_token_frozen(&self, token_id: U256) -> Result<bool, Self::Error> {
        Ok(self.inner.lock().frozen.contains(&token_id))
    }

    async fn pack_hash_by_id(&self, token_id: U256) -> Result<String, Self::Error> {
        self.inner
            .lock()
            .pack_hashes
            .get(&token_id)
            .cloned()
            .ok_or(TestChainError::UnknownToken(token_id))
    }

    async fn card_hash_by_id(&self, token_id: U256) -> Result<U256, Self::Error> {
        self.inner
            .lock()
            .card_hashes
            .get(&token_id)
            .copied()
            .ok_or(TestChainError::UnknownToken(token_id))
    }

    async fn card_rank_from_hash(&self, hash: U256) -> Result<u64, Self::Error> {
        self.inner.lock().contract_decodes += 1;
        Ok(LegacyCard::from_hash(hash).rank)
    }

    async fn card_issue_from_hash(&self, hash: U256) -> Result<u64, Self::Error> {
        self.inner.lock().contract_decodes += 1;
        Ok(LegacyCard::from_hash(hash).issue)
    }

    async fn mint_new_pack(
        &self,
        account: Address,
        pack_hash: String,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let mut inner = self.inner.lock();
        inner.take_mint_failure()?;
        inner.minted_packs.push((account, pack_hash));

        let new_id = U256::from(FIRST_NEW_PACK_ID + inner.next_pack_id);
        inner.next_pack_id += 1;
        let logs =
            if inner.omit_transfer_logs { Vec::new() } else { vec![transfer_log(account, new_id)] };
        Ok(inner.receipt(tx, MINT_GAS, logs))
    }

    async fn mint_new_cards(
        &self,
        account: Address,
        cards: Vec<U256>,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let mut inner = self.inner.lock();
        inner.take_mint_failure()?;
        let logs = cards.iter().map(|card| transfer_log(account, *card)).collect();
        inner.minted_cards.push((account, cards));
        Ok(inner.receipt(tx, MINT_GAS, logs))
    }
}

#[async_trait]
impl GumMigrator for TestChain {
    async fn migrate_token_holder(
        &self,
        account: Address,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let mut inner = self.inner.lock();
        let (old, new) = inner.gum_balances.get(&account).copied().unwrap_or_default();
        inner.gum_migrated.push(account);

        let mut data = old.to_be_bytes::<32>().to_vec();
        data.extend_from_slice(&new.to_be_bytes::<32>());
        let log = ReceiptLog {
            address: Address::ZERO,
            topics: vec![B256::ZERO, account.into_word()],
            data: data.into(),
        };
        Ok(inner.receipt(tx, TX_GAS, vec![log]))
    }

    async fn distribute_initial_gum(&self, tx: TxParams) -> Result<TxReceipt, Self::Error> {
        let mut inner = self.inner.lock();
        inner.gum_distributed = true;
        Ok(inner.receipt(tx, TX_GAS, Vec::new()))
    }
}

#[async_trait]
impl CardLibrary for TestChain {
    async fn set_contract_controller(
        &self,
        controller: Address,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let mut inner = self.inner.lock();
        inner.controllers.push(controller);
        Ok(inner.receipt(tx, TX_GAS, Vec::new()))
    }

    async fn increment_purchased_pack_count(
        &self,
        account: Address,
        count: u64,
        tx: TxParams,
    ) -> Result<TxReceipt, Self::Error> {
        let mut inner = self.inner.lock();
        inner.purchases.push((account, count));
        Ok(inner.receipt(tx, TX_GAS, Vec::new()))
    }
}
