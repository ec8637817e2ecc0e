//! Clamped gas price lookups.

use crate::{ChainClient, GasPrice};

/// One gwei, in wei.
pub const GWEI: u128 = 1_000_000_000;

/// Turns the network-suggested gas price into the price a transaction pays.
///
/// The suggestion is rounded down to whole gwei and clamped into `[min, max]`. Every lookup goes
/// to the network; prices are not cached between transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPriceOracle {
    min: u128,
    max: u128,
}

impl GasPriceOracle {
    /// Creates a new [GasPriceOracle]. If `min > max`, `max` wins.
    pub const fn new(min: u128, max: u128) -> Self {
        Self { min, max }
    }

    /// Returns the price floor, in wei.
    pub const fn min(&self) -> u128 {
        self.min
    }

    /// Returns the price ceiling, in wei.
    pub const fn max(&self) -> u128 {
        self.max
    }

    /// Applies rounding and clamping to a suggested price.
    pub const fn price_for(&self, suggested_wei: u128) -> GasPrice {
        let suggested = suggested_wei / GWEI * GWEI;
        let mut actual = suggested;
        if actual < self.min {
            actual = self.min;
        }
        if actual > self.max {
            actual = self.max;
        }
        GasPrice { actual, suggested }
    }

    /// Queries the network and returns the price to pay.
    pub async fn current_price<C: ChainClient + Sync>(&self, client: &C) -> Result<GasPrice, C::Error> {
        let suggested = client.gas_price().await?;
        Ok(self.price_for(suggested))
    }
}
