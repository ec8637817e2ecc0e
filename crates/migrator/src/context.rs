//! Transaction sequencing and gas accounting for a single sending account.

use crate::{
    ChainClient, GasPrice, GasPriceOracle, MigrationError, MigrationResult, TxParams, TxReceipt,
    GWEI,
};
use alloy_primitives::{Address, U256};
use core::future::Future;
use tracing::{debug, info};

/// Owns everything that must stay consistent across the transactions of a run: the sending
/// account, its nonce counter, the gas price policy, and the running gas totals.
///
/// Transactions are sent one at a time, each awaited to its receipt, so nonces are handed out
/// strictly in order and without gaps.
#[derive(Debug, Clone)]
pub struct SubmissionContext {
    owner: Address,
    next_nonce: u64,
    oracle: GasPriceOracle,
    transactions: u64,
    total_gas: u128,
    total_cost: U256,
}

impl SubmissionContext {
    /// Creates a context that starts at the given nonce.
    pub const fn new(owner: Address, next_nonce: u64, oracle: GasPriceOracle) -> Self {
        Self { owner, next_nonce, oracle, transactions: 0, total_gas: 0, total_cost: U256::ZERO }
    }

    /// Creates a context that starts at the owner's on-chain transaction count.
    pub async fn from_chain<C: ChainClient + Sync>(
        client: &C,
        owner: Address,
        oracle: GasPriceOracle,
    ) -> Result<Self, C::Error> {
        let nonce = client.transaction_count(owner).await?;
        info!(target: "migrate", "Starting at nonce {nonce} for {owner}");
        Ok(Self::new(owner, nonce, oracle))
    }

    /// Returns the sending account.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Returns the nonce the next transaction will use.
    pub const fn next_nonce(&self) -> u64 {
        self.next_nonce
    }

    /// Returns the gas price policy.
    pub const fn oracle(&self) -> &GasPriceOracle {
        &self.oracle
    }

    /// Looks up the current gas price and allocates the next nonce.
    pub async fn prepare<C: ChainClient + Sync>(&mut self, client: &C) -> Result<TxParams, C::Error> {
        let price = self.oracle.current_price(client).await?;
        Ok(self.allocate(price))
    }

    /// Allocates the next nonce at the given price.
    pub fn allocate(&mut self, price: GasPrice) -> TxParams {
        debug!(
            target: "gas",
            "Paying gas price: {} gwei ({} suggested)",
            price.actual / GWEI,
            price.suggested / GWEI
        );
        let params = TxParams { from: self.owner, nonce: self.next_nonce, gas_price: price.actual };
        self.next_nonce += 1;
        params
    }

    /// Adds a mined transaction to the running totals.
    pub fn record(&mut self, receipt: &TxReceipt, params: &TxParams) {
        debug!(
            target: "migrate",
            "TX {} (nonce {}): success={} gas_used={}",
            receipt.transaction_hash,
            params.nonce,
            receipt.success,
            receipt.gas_used
        );
        self.transactions += 1;
        self.total_gas += receipt.gas_used as u128;
        self.total_cost += U256::from(receipt.gas_used) * U256::from(params.gas_price);
    }

    /// Sends one transaction built by `send` and waits for its receipt.
    ///
    /// The gas price is looked up and a nonce allocated first. The receipt is recorded even if
    /// the transaction reverted; a revert is then returned as [MigrationError::Reverted].
    pub async fn submit<C, F, Fut>(
        &mut self,
        client: &C,
        send: F,
    ) -> MigrationResult<TxReceipt, C::Error>
    where
        C: ChainClient + Sync,
        F: FnOnce(TxParams) -> Fut,
        Fut: Future<Output = Result<TxReceipt, C::Error>>,
    {
        let tx = self.prepare(client).await.map_err(MigrationError::Provider)?;
        let receipt = send(tx).await.map_err(MigrationError::Provider)?;
        self.record(&receipt, &tx);
        if !receipt.success {
            return Err(MigrationError::Reverted(receipt.transaction_hash));
        }
        Ok(receipt)
    }

    /// Returns the number of recorded transactions.
    pub const fn transactions(&self) -> u64 {
        self.transactions
    }

    /// Returns the total gas used by recorded transactions.
    pub const fn total_gas(&self) -> u128 {
        self.total_gas
    }

    /// Returns the total cost of recorded transactions, in wei.
    pub const fn total_cost(&self) -> U256 {
        self.total_cost
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        test_utils::{TestChain, TX_GAS},
        GumMigrator,
    };
    use alloy_primitives::address;

    const OWNER: Address = address!("4DE7C0BEEdD7286074fE2b9CeA08774ba55C991b");

    #[tokio::test]
    async fn test_nonces_are_sequential() {
        let chain = TestChain::default();
        chain.set_transaction_count(OWNER, 7);
        chain.set_gas_price(3 * GWEI);

        let mut ctx = SubmissionContext::from_chain(&chain, OWNER, GasPriceOracle::new(GWEI, 20 * GWEI))
            .await
            .unwrap();
        let first = ctx.prepare(&chain).await.unwrap();
        let second = ctx.prepare(&chain).await.unwrap();

        assert_eq!(first, TxParams { from: OWNER, nonce: 7, gas_price: 3 * GWEI });
        assert_eq!(second.nonce, 8);
        assert_eq!(ctx.next_nonce(), 9);
    }

    #[tokio::test]
    async fn test_submit_records_reverted_receipts() {
        let chain = TestChain::default();
        chain.set_gas_price(2 * GWEI);
        let mut ctx = SubmissionContext::new(OWNER, 0, GasPriceOracle::new(GWEI, 20 * GWEI));

        chain.revert_next_tx();
        let err = ctx
            .submit(&chain, |tx| chain.distribute_initial_gum(tx))
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Reverted(_)));
        assert_eq!(ctx.transactions(), 1);
        assert_eq!(ctx.total_gas(), TX_GAS as u128);

        let receipt = ctx.submit(&chain, |tx| chain.distribute_initial_gum(tx)).await.unwrap();
        assert!(receipt.success);
        assert_eq!(ctx.next_nonce(), 2);
        assert_eq!(chain.sent().iter().map(|tx| tx.nonce).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_record_accumulates_cost() {
        let mut ctx = SubmissionContext::new(OWNER, 0, GasPriceOracle::new(GWEI, 20 * GWEI));
        let a = ctx.allocate(GasPrice { actual: 2 * GWEI, suggested: 2 * GWEI });
        ctx.record(&TxReceipt { gas_used: 21_000, success: true, ..Default::default() }, &a);
        let b = ctx.allocate(GasPrice { actual: 5 * GWEI, suggested: 5 * GWEI });
        ctx.record(&TxReceipt { gas_used: 100_000, success: true, ..Default::default() }, &b);

        assert_eq!(ctx.transactions(), 2);
        assert_eq!(ctx.total_gas(), 121_000);
        assert_eq!(ctx.total_cost(), U256::from(21_000u128 * 2 * GWEI + 100_000u128 * 5 * GWEI));
    }
}
