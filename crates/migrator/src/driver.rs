//! The resumable ERC721 batch migration driver.

use crate::{
    MigrationError, MigrationResult, MigrationStateStore, SubmissionContext, TokenKind,
    TokenMigrator,
};
use alloy_primitives::{Address, U256};
use cards_codec::{pack_mint_hash, split_pack_hash, CardToken, LegacyCard};
use core::ops::RangeInclusive;
use rand::Rng;
use tracing::{debug, info, warn};

/// Default number of tokens migrated per holder and batch.
pub const DEFAULT_BATCH_SIZE: u64 = 20;

/// Default range of the gum yield drawn for every migrated card.
pub const DEFAULT_GUM_RANGE: RangeInclusive<u64> = 15..=30;

/// Where the rank and issue of a legacy card hash are read from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Mask the fields out of the hash locally.
    #[default]
    Local,
    /// Ask the contract through `card_rank_from_hash` and `card_issue_from_hash`.
    Contract,
}

/// Tunables of the [MigrationDriver].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Tokens migrated per holder and batch.
    pub batch_size: u64,
    /// Inclusive range of the gum yield assigned to migrated cards.
    pub gum_range: RangeInclusive<u64>,
    /// How legacy card hashes are decoded.
    pub decode: DecodeMode,
    /// Radix of the card hashes inside a legacy pack hash.
    pub pack_hash_radix: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            gum_range: DEFAULT_GUM_RANGE,
            decode: DecodeMode::Local,
            pack_hash_radix: 16,
        }
    }
}

impl DriverConfig {
    fn validate<E: core::error::Error>(&self) -> MigrationResult<(), E> {
        if self.batch_size == 0 {
            return Err(MigrationError::Config("batch size must be at least 1"));
        }
        if self.gum_range.is_empty() {
            return Err(MigrationError::Config("gum range is empty"));
        }
        Ok(())
    }
}

/// Counters for one holder's batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    /// The batch index that was processed.
    pub batch_pass: u64,
    /// Legacy tokens replaced by new ones.
    pub minted: usize,
    /// Legacy tokens skipped because an earlier batch picked them up.
    pub skipped: usize,
    /// Opened packs that were retired without a replacement.
    pub frozen: usize,
    /// `true` if the holder's batch index moved forward.
    pub advanced: bool,
}

/// What happened to one holder during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountOutcome {
    /// The holder owns no legacy tokens of this kind.
    Empty,
    /// Every batch of the holder was processed by earlier passes.
    Complete,
    /// One batch was processed.
    Batch(BatchStats),
}

/// Totals over all holders of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// The token family migrated.
    pub kind: TokenKind,
    /// Holders visited.
    pub accounts: usize,
    /// Holders whose batch index moved forward.
    pub advanced: usize,
    /// Legacy tokens replaced by new ones.
    pub minted: usize,
    /// Legacy tokens skipped as already migrated.
    pub skipped: usize,
    /// Opened packs retired without a replacement.
    pub frozen: usize,
}

impl PassSummary {
    const fn new(kind: TokenKind) -> Self {
        Self { kind, accounts: 0, advanced: 0, minted: 0, skipped: 0, frozen: 0 }
    }

    fn record(&mut self, outcome: &AccountOutcome) {
        self.accounts += 1;
        if let AccountOutcome::Batch(stats) = outcome {
            self.advanced += stats.advanced as usize;
            self.minted += stats.minted;
            self.skipped += stats.skipped;
            self.frozen += stats.frozen;
        }
    }

    /// Returns `true` if another pass could still find work.
    pub const fn made_progress(&self) -> bool {
        self.advanced > 0
    }
}

/// Walks every holder's legacy packs or cards in fixed-size batches and mints their
/// replacements.
///
/// Each call to [MigrationDriver::migrate] processes at most one batch per holder, starting at
/// `batch_pass * batch_size` in the holder's token list. Tokens already recorded as migrated are
/// skipped. Packs are minted one transaction each and the state is saved after every pack; cards
/// are minted in one transaction per batch and the state is saved after it. Any error aborts the
/// pass and leaves the last saved state for the next run to resume from.
#[derive(Debug)]
pub struct MigrationDriver<'a, P, R> {
    provider: &'a P,
    ctx: &'a mut SubmissionContext,
    store: &'a mut MigrationStateStore,
    cfg: DriverConfig,
    rng: R,
}

impl<'a, P, R> MigrationDriver<'a, P, R>
where
    P: TokenMigrator + Sync,
    R: Rng,
{
    /// Creates a new [MigrationDriver].
    pub fn new(
        provider: &'a P,
        ctx: &'a mut SubmissionContext,
        store: &'a mut MigrationStateStore,
        cfg: DriverConfig,
        rng: R,
    ) -> Self {
        Self { provider, ctx, store, cfg, rng }
    }

    /// Returns the driver configuration.
    pub const fn config(&self) -> &DriverConfig {
        &self.cfg
    }

    /// Runs one pass over `accounts` for the given token family.
    pub async fn migrate(
        &mut self,
        kind: TokenKind,
        accounts: &[Address],
    ) -> MigrationResult<PassSummary, P::Error> {
        self.cfg.validate::<P::Error>()?;
        info!(target: "driver", "{} token holders: {}", kind, accounts.len());

        let mut summary = PassSummary::new(kind);
        for &account in accounts {
            let outcome = self.migrate_account(kind, account).await?;
            summary.record(&outcome);
        }
        info!(
            target: "driver",
            "Pass over {kind} done: {} minted, {} skipped, {} frozen",
            summary.minted,
            summary.skipped,
            summary.frozen
        );
        Ok(summary)
    }

    /// Processes the next batch of `account`'s legacy tokens.
    pub async fn migrate_account(
        &mut self,
        kind: TokenKind,
        account: Address,
    ) -> MigrationResult<AccountOutcome, P::Error> {
        self.cfg.validate::<P::Error>()?;
        let batch_pass = self.store.batch_pass(kind, account);
        let start = batch_pass.saturating_mul(self.cfg.batch_size);

        debug!(target: "driver", "Get {kind} for token holder {account}");
        let count = self.balance_of(kind, account).await?;
        if count == 0 {
            info!(target: "driver", "No {kind} found for {account}, skipping");
            return Ok(AccountOutcome::Empty);
        }
        if start >= count {
            info!(target: "driver", "All {kind} migrated for {account}, skipping");
            return Ok(AccountOutcome::Complete);
        }

        info!(
            target: "driver",
            "Found {count} {kind} for {account}; migrating up to {} starting at {start}",
            self.cfg.batch_size.min(count - start)
        );
        let stats = match kind {
            TokenKind::Packs => self.migrate_pack_batch(account, batch_pass, start, count).await?,
            TokenKind::Cards => self.migrate_card_batch(account, batch_pass, start, count).await?,
        };
        Ok(AccountOutcome::Batch(stats))
    }

    async fn migrate_pack_batch(
        &mut self,
        account: Address,
        batch_pass: u64,
        start: u64,
        count: u64,
    ) -> MigrationResult<BatchStats, P::Error> {
        let provider = self.provider;
        let mut stats = BatchStats { batch_pass, ..Default::default() };

        let mut index = start;
        while index < count && (stats.minted as u64) < self.cfg.batch_size {
            let token_id = self.token_at(TokenKind::Packs, account, index).await?;
            index += 1;

            if self.store.is_migrated(TokenKind::Packs, token_id) {
                debug!(target: "driver", "Skipping previously migrated pack {token_id}");
                stats.skipped += 1;
                continue;
            }
            self.store.mark_migrated(TokenKind::Packs, token_id);

            if provider.is_token_frozen(token_id).await.map_err(MigrationError::Provider)? {
                debug!(target: "driver", "Skipping opened pack {token_id}");
                stats.frozen += 1;
                continue;
            }

            let old_hash =
                provider.pack_hash_by_id(token_id).await.map_err(MigrationError::Provider)?;
            let mut cards = Vec::new();
            for hash in split_pack_hash(&old_hash, self.cfg.pack_hash_radix)? {
                cards.push(self.convert_card(hash).await?);
            }
            let new_hash = pack_mint_hash(&cards);
            debug!(target: "driver", "Minting pack {token_id}: {old_hash} -> {new_hash}");

            let receipt = self
                .ctx
                .submit(provider, |tx| provider.mint_new_pack(account, new_hash, tx))
                .await?;
            stats.minted += 1;
            self.store.save()?;

            match receipt.minted_token_id() {
                Some(new_id) => {
                    info!(target: "driver", "Migrated pack {token_id} to new pack {new_id}")
                }
                None => warn!(
                    target: "driver",
                    "Pack {token_id} minted in {} without a Transfer event",
                    receipt.transaction_hash
                ),
            }
        }

        self.store.set_batch_pass(TokenKind::Packs, account, batch_pass + 1);
        self.store.save()?;
        stats.advanced = true;
        Ok(stats)
    }

    async fn migrate_card_batch(
        &mut self,
        account: Address,
        batch_pass: u64,
        start: u64,
        count: u64,
    ) -> MigrationResult<BatchStats, P::Error> {
        let provider = self.provider;
        let mut stats = BatchStats { batch_pass, ..Default::default() };
        let mut batch = Vec::new();

        let mut index = start;
        while index < count && (batch.len() as u64) < self.cfg.batch_size {
            let token_id = self.token_at(TokenKind::Cards, account, index).await?;
            index += 1;

            if self.store.is_migrated(TokenKind::Cards, token_id) {
                debug!(target: "driver", "Skipping previously migrated card {token_id}");
                stats.skipped += 1;
                continue;
            }
            self.store.mark_migrated(TokenKind::Cards, token_id);

            let hash = provider.card_hash_by_id(token_id).await.map_err(MigrationError::Provider)?;
            let card = self.convert_card(hash).await?;
            debug!(target: "driver", "Adding new card {card} from old card {token_id} ({hash})");
            batch.push(card.value());
        }

        if batch.is_empty() {
            info!(target: "driver", "No cards left to migrate for {account}, skipping");
            return Ok(stats);
        }

        let minted = batch.len();
        info!(target: "driver", "Minting {minted} of {count} cards for {account}");
        self.ctx.submit(provider, |tx| provider.mint_new_cards(account, batch, tx)).await?;
        stats.minted = minted;

        self.store.set_batch_pass(TokenKind::Cards, account, batch_pass + 1);
        self.store.save()?;
        stats.advanced = true;
        Ok(stats)
    }

    /// Converts a legacy card hash into a new card with a freshly drawn gum yield.
    async fn convert_card(&mut self, hash: U256) -> MigrationResult<CardToken, P::Error> {
        let legacy = match self.cfg.decode {
            DecodeMode::Local => LegacyCard::from_hash(hash),
            DecodeMode::Contract => LegacyCard {
                rank: self
                    .provider
                    .card_rank_from_hash(hash)
                    .await
                    .map_err(MigrationError::Provider)?,
                issue: self
                    .provider
                    .card_issue_from_hash(hash)
                    .await
                    .map_err(MigrationError::Provider)?,
            },
        };
        let gum = self.rng.gen_range(self.cfg.gum_range.clone());
        Ok(legacy.into_token(gum)?)
    }

    async fn balance_of(&self, kind: TokenKind, account: Address) -> MigrationResult<u64, P::Error> {
        let count = match kind {
            TokenKind::Packs => self.provider.packs_balance_of(account).await,
            TokenKind::Cards => self.provider.cards_balance_of(account).await,
        }
        .map_err(MigrationError::Provider)?;
        u64::try_from(count).map_err(|_| MigrationError::Overflow { what: "token count", value: count })
    }

    async fn token_at(
        &self,
        kind: TokenKind,
        account: Address,
        index: u64,
    ) -> MigrationResult<U256, P::Error> {
        let index = U256::from(index);
        match kind {
            TokenKind::Packs => self.provider.packs_token_of_owner_by_index(account, index).await,
            TokenKind::Cards => self.provider.cards_token_of_owner_by_index(account, index).await,
        }
        .map_err(MigrationError::Provider)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        test_utils::{CollectingLayer, TestChain, TestChainError, TraceStorage, MINT_GAS},
        GasPriceOracle, MigrationState, GWEI,
    };
    use alloy_primitives::address;
    use cards_codec::CardFields;
    use rand::{rngs::StdRng, SeedableRng};
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    const OWNER: Address = address!("4DE7C0BEEdD7286074fE2b9CeA08774ba55C991b");
    const ALICE: Address = address!("7002FF8d83625DC59A2C23bCAb9e8939A201B0d6");
    const BOB: Address = address!("00000000000000000000000000000000000b0b00");

    /// A legacy card hash with the given rank and issue.
    fn legacy_hash(rank: u64, issue: u64) -> U256 {
        U256::from((rank << 22) | issue)
    }

    fn chain_with_cards(owner: Address, count: u64) -> TestChain {
        let chain = TestChain::default();
        chain.set_gas_price(5 * GWEI);
        for i in 0..count {
            chain.add_card(owner, 100 + i, legacy_hash(i + 1, 200 + i));
        }
        chain
    }

    fn store(dir: &tempfile::TempDir) -> MigrationStateStore {
        MigrationStateStore::load(dir.path().join("migration-state-local.json")).unwrap()
    }

    fn ctx() -> SubmissionContext {
        SubmissionContext::new(OWNER, 0, GasPriceOracle::new(GWEI, 20 * GWEI))
    }

    fn cfg(batch_size: u64) -> DriverConfig {
        DriverConfig { batch_size, ..Default::default() }
    }

    async fn run(
        chain: &TestChain,
        ctx: &mut SubmissionContext,
        store: &mut MigrationStateStore,
        cfg: DriverConfig,
        kind: TokenKind,
        accounts: &[Address],
    ) -> Result<PassSummary, MigrationError<TestChainError>> {
        MigrationDriver::new(chain, ctx, store, cfg, StdRng::seed_from_u64(7))
            .migrate(kind, accounts)
            .await
    }

    #[tokio::test]
    async fn test_card_batches_resume_across_runs() {
        let chain = chain_with_cards(ALICE, 5);
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx();

        let mut store = store(&dir);
        let first =
            run(&chain, &mut ctx, &mut store, cfg(3), TokenKind::Cards, &[ALICE]).await.unwrap();
        assert_eq!(first.minted, 3);
        assert_eq!(store.batch_pass(TokenKind::Cards, ALICE), 1);

        // A fresh store reads what the first run saved.
        let mut store = self::store(&dir);
        let second =
            run(&chain, &mut ctx, &mut store, cfg(3), TokenKind::Cards, &[ALICE]).await.unwrap();
        assert_eq!(second.minted, 2);
        assert_eq!(store.batch_pass(TokenKind::Cards, ALICE), 2);

        let mut store = self::store(&dir);
        let third =
            run(&chain, &mut ctx, &mut store, cfg(3), TokenKind::Cards, &[ALICE]).await.unwrap();
        assert_eq!(third.minted, 0);
        assert!(!third.made_progress());

        let minted = chain.minted_cards();
        assert_eq!(minted.len(), 2);
        assert_eq!(minted[0].1.len(), 3);
        assert_eq!(minted[1].1.len(), 2);
        let indices: Vec<_> = chain.index_queries().iter().map(|(_, _, i)| i.to::<u64>()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_pagination_starts_at_batch_pass() {
        let chain = chain_with_cards(ALICE, 10);
        let mut state = MigrationState::default();
        state.cards.batch_progress.insert(ALICE, 2);
        let dir = tempfile::tempdir().unwrap();
        let mut store = MigrationStateStore::with_state(dir.path().join("state.json"), state);

        run(&chain, &mut ctx(), &mut store, cfg(3), TokenKind::Cards, &[ALICE]).await.unwrap();

        let (kind, account, first) = chain.index_queries()[0];
        assert_eq!((kind, account), (TokenKind::Cards, ALICE));
        assert_eq!(first, U256::from(6u64));
        assert_eq!(store.batch_pass(TokenKind::Cards, ALICE), 3);
    }

    #[tokio::test]
    async fn test_cards_are_encoded_from_legacy_hash() {
        let chain = TestChain::default();
        chain.set_gas_price(5 * GWEI);
        chain.add_card(ALICE, 1, legacy_hash(5, 100));
        let dir = tempfile::tempdir().unwrap();

        run(&chain, &mut ctx(), &mut store(&dir), cfg(10), TokenKind::Cards, &[ALICE])
            .await
            .unwrap();

        let (account, cards) = &chain.minted_cards()[0];
        assert_eq!(account, &ALICE);
        let fields = CardToken::from_value(cards[0]).decode().unwrap();
        assert_eq!(fields, CardFields { rank: 5, issue: 100, gum: fields.gum, ..Default::default() });
        assert!(DEFAULT_GUM_RANGE.contains(&fields.gum));
    }

    #[tokio::test]
    async fn test_batch_size_caps_one_mint() {
        let chain = chain_with_cards(ALICE, 7);
        let dir = tempfile::tempdir().unwrap();

        let summary = run(&chain, &mut ctx(), &mut store(&dir), cfg(4), TokenKind::Cards, &[ALICE])
            .await
            .unwrap();

        assert_eq!(summary.minted, 4);
        assert_eq!(chain.minted_cards().len(), 1);
        assert_eq!(chain.minted_cards()[0].1.len(), 4);
    }

    #[tokio::test]
    async fn test_second_run_is_idempotent() {
        let chain = chain_with_cards(ALICE, 2);
        chain.add_pack(BOB, 9, "0x0140000a", false);
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx();

        for _ in 0..2 {
            let mut store = store(&dir);
            run(&chain, &mut ctx, &mut store, cfg(5), TokenKind::Packs, &[ALICE, BOB])
                .await
                .unwrap();
            run(&chain, &mut ctx, &mut store, cfg(5), TokenKind::Cards, &[ALICE, BOB])
                .await
                .unwrap();
        }

        assert_eq!(chain.minted_packs().len(), 1);
        assert_eq!(chain.minted_cards().len(), 1);
        assert_eq!(ctx.transactions(), 2);
    }

    #[tokio::test]
    async fn test_already_migrated_cards_do_not_count_towards_batch() {
        let chain = chain_with_cards(ALICE, 5);
        let mut state = MigrationState::default();
        state.cards.completed.insert(U256::from(100u64));
        state.cards.completed.insert(U256::from(101u64));
        let dir = tempfile::tempdir().unwrap();
        let mut store = MigrationStateStore::with_state(dir.path().join("state.json"), state);

        let summary = run(&chain, &mut ctx(), &mut store, cfg(3), TokenKind::Cards, &[ALICE])
            .await
            .unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.minted, 3);
        assert_eq!(chain.index_queries().len(), 5);
    }

    #[tokio::test]
    async fn test_fully_skipped_card_batch_does_not_advance() {
        let chain = chain_with_cards(ALICE, 2);
        let mut state = MigrationState::default();
        state.cards.completed.extend([U256::from(100u64), U256::from(101u64)]);
        let dir = tempfile::tempdir().unwrap();
        let mut store = MigrationStateStore::with_state(dir.path().join("state.json"), state);

        let summary = run(&chain, &mut ctx(), &mut store, cfg(3), TokenKind::Cards, &[ALICE])
            .await
            .unwrap();

        assert!(!summary.made_progress());
        assert_eq!(store.batch_pass(TokenKind::Cards, ALICE), 0);
        assert!(chain.minted_cards().is_empty());
    }

    #[tokio::test]
    async fn test_packs_mint_one_per_transaction() {
        let chain = TestChain::default();
        chain.set_gas_price(5 * GWEI);
        chain.add_pack(ALICE, 1, "0140000a.00800001", false);
        chain.add_pack(ALICE, 2, "0x00c00003", false);
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx();
        let mut store = store(&dir);

        let summary =
            run(&chain, &mut ctx, &mut store, cfg(5), TokenKind::Packs, &[ALICE]).await.unwrap();

        assert_eq!(summary.minted, 2);
        let minted = chain.minted_packs();
        assert_eq!(minted.len(), 2);
        assert!(minted[0].1.starts_with("0."));
        assert_eq!(minted[0].1.split('.').count(), 3);
        assert_eq!(minted[1].1.split('.').count(), 2);
        assert_eq!(ctx.total_gas(), 2 * MINT_GAS as u128);
        assert!(store.is_migrated(TokenKind::Packs, U256::from(1u64)));
        assert!(store.is_migrated(TokenKind::Packs, U256::from(2u64)));
        assert_eq!(store.batch_pass(TokenKind::Packs, ALICE), 1);
    }

    #[tokio::test]
    async fn test_frozen_pack_is_retired_without_mint() {
        let chain = TestChain::default();
        chain.set_gas_price(5 * GWEI);
        chain.add_pack(ALICE, 1, "0140000a", true);
        chain.add_pack(ALICE, 2, "00800001", false);
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let summary =
            run(&chain, &mut ctx(), &mut store, cfg(5), TokenKind::Packs, &[ALICE]).await.unwrap();

        assert_eq!(summary.frozen, 1);
        assert_eq!(summary.minted, 1);
        assert_eq!(chain.minted_packs().len(), 1);
        let reloaded = MigrationStateStore::load(store.path()).unwrap();
        assert!(reloaded.is_migrated(TokenKind::Packs, U256::from(1u64)));
    }

    #[tokio::test]
    async fn test_pack_batch_advances_even_when_all_skipped() {
        let chain = TestChain::default();
        chain.add_pack(ALICE, 1, "0140000a", true);
        let dir = tempfile::tempdir().unwrap();
        let mut store = store(&dir);

        let summary =
            run(&chain, &mut ctx(), &mut store, cfg(5), TokenKind::Packs, &[ALICE]).await.unwrap();

        assert!(summary.made_progress());
        assert_eq!(store.batch_pass(TokenKind::Packs, ALICE), 1);
        assert_eq!(chain.gas_price_queries(), 0);
    }

    #[tokio::test]
    async fn test_failed_mint_is_retried_on_rerun() {
        let chain = chain_with_cards(ALICE, 2);
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx();

        chain.fail_next_mint();
        let mut store = store(&dir);
        let err = run(&chain, &mut ctx, &mut store, cfg(5), TokenKind::Cards, &[ALICE])
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Provider(TestChainError::Injected)));

        let mut store = self::store(&dir);
        assert!(!store.is_migrated(TokenKind::Cards, U256::from(100u64)));
        let summary =
            run(&chain, &mut ctx, &mut store, cfg(5), TokenKind::Cards, &[ALICE]).await.unwrap();
        assert_eq!(summary.minted, 2);
    }

    #[tokio::test]
    async fn test_reverted_pack_mint_aborts() {
        let chain = TestChain::default();
        chain.set_gas_price(5 * GWEI);
        chain.add_pack(ALICE, 1, "0140000a", false);
        chain.revert_next_tx();
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx();
        let mut store = store(&dir);

        let err = run(&chain, &mut ctx, &mut store, cfg(5), TokenKind::Packs, &[ALICE])
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Reverted(_)));
        assert_eq!(ctx.total_gas(), MINT_GAS as u128);
        assert!(!self::store(&dir).is_migrated(TokenKind::Packs, U256::from(1u64)));
    }

    #[tokio::test]
    async fn test_missing_transfer_event_warns() {
        let storage = TraceStorage::default();
        let layer = CollectingLayer::new(storage.clone());
        let subscriber = tracing_subscriber::Registry::default().with(layer);
        let _guard = tracing::subscriber::set_default(subscriber);

        let chain = TestChain::default();
        chain.add_pack(ALICE, 1, "0140000a", false);
        chain.omit_transfer_logs();
        let dir = tempfile::tempdir().unwrap();

        run(&chain, &mut ctx(), &mut store(&dir), cfg(5), TokenKind::Packs, &[ALICE])
            .await
            .unwrap();

        assert!(storage.contains(Level::WARN, "without a Transfer event"));
    }

    #[tokio::test]
    async fn test_contract_decode_mode() {
        let chain = chain_with_cards(ALICE, 2);
        let dir = tempfile::tempdir().unwrap();
        let cfg = DriverConfig { decode: DecodeMode::Contract, ..cfg(5) };

        run(&chain, &mut ctx(), &mut store(&dir), cfg, TokenKind::Cards, &[ALICE]).await.unwrap();

        assert_eq!(chain.contract_decodes(), 4);
        let fields = CardToken::from_value(chain.minted_cards()[0].1[1]).decode().unwrap();
        assert_eq!((fields.rank, fields.issue), (2, 201));
    }

    #[tokio::test]
    async fn test_issue_overflow_aborts() {
        let chain = TestChain::default();
        chain.add_card(ALICE, 1, legacy_hash(1, 5_000));
        let dir = tempfile::tempdir().unwrap();

        let err = run(&chain, &mut ctx(), &mut store(&dir), cfg(5), TokenKind::Cards, &[ALICE])
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Codec(_)));
        assert!(chain.minted_cards().is_empty());
    }

    #[tokio::test]
    async fn test_seeded_gum_is_reproducible() {
        let mut yields = Vec::new();
        for _ in 0..2 {
            let chain = chain_with_cards(ALICE, 4);
            let dir = tempfile::tempdir().unwrap();
            run(&chain, &mut ctx(), &mut store(&dir), cfg(5), TokenKind::Cards, &[ALICE])
                .await
                .unwrap();
            yields.push(chain.minted_cards()[0].1.clone());
        }
        assert_eq!(yields[0], yields[1]);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let chain = chain_with_cards(ALICE, 1);
        let dir = tempfile::tempdir().unwrap();

        let err = run(&chain, &mut ctx(), &mut store(&dir), cfg(0), TokenKind::Cards, &[ALICE])
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Config(_)));

        #[allow(clippy::reversed_empty_ranges)]
        let cfg = DriverConfig { gum_range: 30..=15, ..cfg(5) };
        let err = run(&chain, &mut ctx(), &mut store(&dir), cfg, TokenKind::Cards, &[ALICE])
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Config(_)));
    }

    #[tokio::test]
    async fn test_holder_without_tokens() {
        let chain = TestChain::default();
        let dir = tempfile::tempdir().unwrap();

        let mut store = store(&dir);
        let mut ctx = ctx();
        let outcome = MigrationDriver::new(&chain, &mut ctx, &mut store, cfg(5), StdRng::seed_from_u64(1))
            .migrate_account(TokenKind::Packs, BOB)
            .await
            .unwrap();

        assert_eq!(outcome, AccountOutcome::Empty);
        assert!(chain.index_queries().is_empty());
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let mut summary = PassSummary::new(TokenKind::Cards);
        summary.record(&AccountOutcome::Empty);
        summary.record(&AccountOutcome::Complete);
        summary.record(&AccountOutcome::Batch(BatchStats {
            minted: 3,
            skipped: 1,
            advanced: true,
            ..Default::default()
        }));
        assert_eq!(summary.accounts, 3);
        assert_eq!(summary.advanced, 1);
        assert_eq!(summary.minted, 3);
        assert!(summary.made_progress());
    }
}
