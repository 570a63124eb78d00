use sep_40_oracle::{Asset, PriceFeedClient};
use soroban_sdk::{contracttype, log, panic_with_error, Address, Env};

use crate::errors::LedgerError;

/// A price reading normalized for the ledger
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct OraclePrice {
    pub price: i128,      // the price of one whole token in the oracle's base asset
    pub confidence: i128, // the reported confidence band around `price`, zero if the feed reports none
    pub timestamp: u64,   // the time the price was reported
}

/// A source of asset prices for valuing positions
pub trait PriceOracle {
    /// Fetch the number of decimals prices are reported with
    fn decimals(&self, e: &Env) -> u32;

    /// Fetch the current price of an asset
    ///
    /// ### Arguments
    /// * `asset` - The address of the asset
    /// * `max_staleness` - The maximum age of the price in seconds
    ///
    /// ### Panics
    /// If the price is older than `max_staleness` or cannot be read, or if
    /// the oracle has no price for the asset
    fn get_price(&self, e: &Env, asset: &Address, max_staleness: u64) -> OraclePrice;
}

/// Reads prices from a SEP-40 price feed contract
#[derive(Clone)]
pub struct Sep40Oracle {
    pub address: Address,
}

impl Sep40Oracle {
    pub fn new(address: &Address) -> Self {
        Sep40Oracle {
            address: address.clone(),
        }
    }
}

impl PriceOracle for Sep40Oracle {
    fn decimals(&self, e: &Env) -> u32 {
        PriceFeedClient::new(e, &self.address).decimals()
    }

    fn get_price(&self, e: &Env, asset: &Address, max_staleness: u64) -> OraclePrice {
        let oracle_client = PriceFeedClient::new(e, &self.address);
        let oracle_asset = Asset::Stellar(asset.clone());
        let price_data = match oracle_client.try_lastprice(&oracle_asset) {
            Ok(Ok(Some(price_data))) => price_data,
            Ok(Ok(None)) => panic_with_error!(e, LedgerError::UnknownAsset),
            _ => {
                log!(e, "oracle read failed", asset.clone());
                panic_with_error!(e, LedgerError::StalePrice)
            }
        };
        require_fresh(
            e,
            asset,
            price_data.price,
            price_data.timestamp,
            max_staleness,
        );
        OraclePrice {
            price: price_data.price,
            confidence: 0,
            timestamp: price_data.timestamp,
        }
    }
}

/// Require that a price reading is positive, not older than `max_staleness`, and not
/// reported in the future
fn require_fresh(e: &Env, asset: &Address, price: i128, timestamp: u64, max_staleness: u64) {
    let now = e.ledger().timestamp();
    if price <= 0 || timestamp > now || timestamp.saturating_add(max_staleness) < now {
        log!(e, "unusable price", asset.clone(), price, timestamp, now);
        panic_with_error!(e, LedgerError::StalePrice);
    }
}
