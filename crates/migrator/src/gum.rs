//! ERC20 gum balance migration.

use crate::{GumMigrator, MigrationResult, SubmissionContext, TxReceipt};
use alloy_primitives::{Address, U256};
use tracing::{info, warn};

/// Decimals of the gum token.
pub const GUM_DECIMALS: u8 = 18;

/// The balances moved for one holder, as reported by the migration event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GumMigration {
    /// The holder.
    pub account: Address,
    /// Legacy balance, in the legacy token's base units.
    pub old_amount: Option<U256>,
    /// New balance, in wei-denominated units of the new token.
    pub new_amount: Option<U256>,
}

impl GumMigration {
    /// Reads the amounts out of the first log of a `migrateTokenHolder` receipt, whose data holds
    /// `oldAmount` and `newAmount` as two words.
    pub fn from_receipt(account: Address, receipt: &TxReceipt) -> Self {
        let log = receipt.logs.first();
        Self {
            account,
            old_amount: log.and_then(|l| l.data_word(0)),
            new_amount: log.and_then(|l| l.data_word(1)),
        }
    }

    /// Returns the new balance in whole tokens.
    pub fn new_tokens(&self) -> Option<U256> {
        let unit = U256::from(10u64).pow(U256::from(GUM_DECIMALS));
        self.new_amount.map(|amount| amount / unit)
    }
}

/// Moves every holder's legacy gum balance to the new token, one transaction per holder.
pub async fn migrate_gum_holders<P>(
    provider: &P,
    ctx: &mut SubmissionContext,
    holders: &[Address],
) -> MigrationResult<Vec<GumMigration>, P::Error>
where
    P: GumMigrator + Sync,
{
    info!(target: "gum", "Gum token holders: {}", holders.len());

    let mut migrated = Vec::with_capacity(holders.len());
    for &account in holders {
        info!(target: "gum", "Migrating gum for token holder {account}");
        let receipt = ctx.submit(provider, |tx| provider.migrate_token_holder(account, tx)).await?;

        let migration = GumMigration::from_receipt(account, &receipt);
        match (migration.old_amount, migration.new_tokens()) {
            (Some(old), Some(new)) => {
                info!(target: "gum", "Migrated {old} old tokens for {new} new tokens")
            }
            _ => warn!(
                target: "gum",
                "Migration of {account} in {} emitted no amounts",
                receipt.transaction_hash
            ),
        }
        migrated.push(migration);
    }
    Ok(migrated)
}

/// Mints the initial gum allocation to the reserve accounts.
pub async fn distribute_initial_gum<P>(
    provider: &P,
    ctx: &mut SubmissionContext,
) -> MigrationResult<TxReceipt, P::Error>
where
    P: GumMigrator + Sync,
{
    info!(target: "gum", "Distributing initial gum to reserve accounts");
    ctx.submit(provider, |tx| provider.distribute_initial_gum(tx)).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{test_utils::TestChain, GasPriceOracle, ReceiptLog, GWEI};
    use alloy_primitives::address;

    const OWNER: Address = address!("4DE7C0BEEdD7286074fE2b9CeA08774ba55C991b");
    const ALICE: Address = address!("7002FF8d83625DC59A2C23bCAb9e8939A201B0d6");
    const BOB: Address = address!("00000000000000000000000000000000000b0b00");

    fn ether(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18u64))
    }

    #[tokio::test]
    async fn test_migrates_every_holder_in_order() {
        let chain = TestChain::default();
        chain.set_gas_price(4 * GWEI);
        chain.set_gum_balance(ALICE, U256::from(1_500u64), ether(1_500));
        chain.set_gum_balance(BOB, U256::from(20u64), ether(20));
        let mut ctx = SubmissionContext::new(OWNER, 3, GasPriceOracle::new(GWEI, 20 * GWEI));

        let migrated = migrate_gum_holders(&chain, &mut ctx, &[ALICE, BOB]).await.unwrap();
        distribute_initial_gum(&chain, &mut ctx).await.unwrap();

        assert_eq!(chain.gum_migrated(), vec![ALICE, BOB]);
        assert!(chain.gum_distributed());
        assert_eq!(migrated[0].old_amount, Some(U256::from(1_500u64)));
        assert_eq!(migrated[0].new_tokens(), Some(U256::from(1_500u64)));
        assert_eq!(migrated[1].new_tokens(), Some(U256::from(20u64)));
        assert_eq!(chain.sent().iter().map(|tx| tx.nonce).collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(ctx.transactions(), 3);
    }

    #[test]
    fn test_receipt_without_event_has_no_amounts() {
        let migration = GumMigration::from_receipt(ALICE, &TxReceipt::default());
        assert_eq!(migration.old_amount, None);
        assert_eq!(migration.new_tokens(), None);

        let short = TxReceipt {
            logs: vec![ReceiptLog { data: vec![0u8; 32].into(), ..Default::default() }],
            ..Default::default()
        };
        let migration = GumMigration::from_receipt(ALICE, &short);
        assert_eq!(migration.old_amount, Some(U256::ZERO));
        assert_eq!(migration.new_amount, None);
    }
}
