//! Purchased-pack counter migration.

use crate::{CardLibrary, MigrationResult, SubmissionContext};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The number of packs an account bought from the legacy contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackPurchase {
    /// The purchasing account.
    pub account: Address,
    /// Packs purchased.
    pub count: u64,
}

/// Replays legacy pack purchase counts into the card library.
///
/// The library only accepts count updates from its controller, so the owner takes control for
/// the duration of the phase and hands it back to `controller` afterwards. Returns the number of
/// purchasers updated.
pub async fn migrate_pack_purchases<P>(
    provider: &P,
    ctx: &mut SubmissionContext,
    controller: Address,
    purchases: &[PackPurchase],
) -> MigrationResult<usize, P::Error>
where
    P: CardLibrary + Sync,
{
    let owner = ctx.owner();
    info!(target: "purchases", "Linking card library to owner {owner} as controller");
    ctx.submit(provider, |tx| provider.set_contract_controller(owner, tx)).await?;

    info!(target: "purchases", "Pack purchasers: {}", purchases.len());
    for purchase in purchases {
        debug!(
            target: "purchases",
            "Updating pack purchases for {}: {}",
            purchase.account,
            purchase.count
        );
        ctx.submit(provider, |tx| {
            provider.increment_purchased_pack_count(purchase.account, purchase.count, tx)
        })
        .await?;
    }

    info!(target: "purchases", "Linking card library to controller contract {controller}");
    ctx.submit(provider, |tx| provider.set_contract_controller(controller, tx)).await?;
    Ok(purchases.len())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{test_utils::TestChain, GasPriceOracle, MigrationError, GWEI};
    use alloy_primitives::address;

    const OWNER: Address = address!("4DE7C0BEEdD7286074fE2b9CeA08774ba55C991b");
    const CONTROLLER: Address = address!("c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0c0");
    const ALICE: Address = address!("7002FF8d83625DC59A2C23bCAb9e8939A201B0d6");
    const BOB: Address = address!("00000000000000000000000000000000000b0b00");

    fn ctx() -> SubmissionContext {
        SubmissionContext::new(OWNER, 0, GasPriceOracle::new(GWEI, 20 * GWEI))
    }

    #[tokio::test]
    async fn test_controller_is_restored() {
        let chain = TestChain::default();
        let purchases = [
            PackPurchase { account: ALICE, count: 3 },
            PackPurchase { account: BOB, count: 11 },
        ];
        let mut ctx = ctx();

        let updated = migrate_pack_purchases(&chain, &mut ctx, CONTROLLER, &purchases).await.unwrap();

        assert_eq!(updated, 2);
        assert_eq!(chain.controllers(), vec![OWNER, CONTROLLER]);
        assert_eq!(chain.purchases(), vec![(ALICE, 3), (BOB, 11)]);
        assert_eq!(ctx.transactions(), 4);
    }

    #[tokio::test]
    async fn test_revert_stops_the_phase() {
        let chain = TestChain::default();
        chain.revert_next_tx();

        let err = migrate_pack_purchases(&chain, &mut ctx(), CONTROLLER, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, MigrationError::Reverted(_)));
        assert_eq!(chain.controllers(), vec![OWNER]);
    }

    #[test]
    fn test_purchase_from_json() {
        let purchase: PackPurchase = serde_json::from_str(
            r#"{"account":"0x7002ff8d83625dc59a2c23bcab9e8939a201b0d6","count":4}"#,
        )
        .unwrap();
        assert_eq!(purchase, PackPurchase { account: ALICE, count: 4 });
    }
}
