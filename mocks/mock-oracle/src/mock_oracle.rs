use sep_40_oracle::{Asset, PriceData};
use soroban_sdk::{contract, contracterror, contractimpl, contracttype, panic_with_error, Env};

#[derive(Clone)]
#[contracttype]
pub enum MockOracleDataKey {
    // The asset prices are denominated in
    Base,
    // The number of decimals reported
    Decimals,
    // MOCK: The last price reported for an asset
    Price(Asset),
    // MOCK: If the oracle should fail
    ToError,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MockOracleError {
    OracleUnavailable = 1,
}

/// ### Mock Price Oracle
///
/// Contract exposing the SEP-40 price feed reads with mocked prices.
///
/// ### Dev
/// For testing purposes only!
#[contract]
pub struct MockPriceOracle;

pub trait MockOracle {
    /// Set the base asset and the decimals prices are reported with
    fn set_data(e: Env, base: Asset, decimals: u32);

    /// Set the price of an asset as last reported at `timestamp`
    fn set_price(e: Env, asset: Asset, price: i128, timestamp: u64);

    /// Set the price of an asset as reported at the current ledger timestamp
    fn set_price_stable(e: Env, asset: Asset, price: i128);

    /// Remove the price of an asset, making it unknown to the oracle
    fn remove_price(e: Env, asset: Asset);

    /// Set if every price read should fail
    fn set_error(e: Env, to_error: bool);

    // NOTE: Matches the SEP-40 `PriceFeed` read functions
    fn base(e: Env) -> Asset;

    fn decimals(e: Env) -> u32;

    fn lastprice(e: Env, asset: Asset) -> Option<PriceData>;
}

#[contractimpl]
impl MockOracle for MockPriceOracle {
    fn set_data(e: Env, base: Asset, decimals: u32) {
        e.storage()
            .instance()
            .set::<MockOracleDataKey, Asset>(&MockOracleDataKey::Base, &base);
        e.storage()
            .instance()
            .set::<MockOracleDataKey, u32>(&MockOracleDataKey::Decimals, &decimals);
    }

    fn set_price(e: Env, asset: Asset, price: i128, timestamp: u64) {
        e.storage().instance().set::<MockOracleDataKey, PriceData>(
            &MockOracleDataKey::Price(asset),
            &PriceData { price, timestamp },
        );
    }

    fn set_price_stable(e: Env, asset: Asset, price: i128) {
        let timestamp = e.ledger().timestamp();
        Self::set_price(e, asset, price, timestamp);
    }

    fn remove_price(e: Env, asset: Asset) {
        e.storage()
            .instance()
            .remove(&MockOracleDataKey::Price(asset));
    }

    fn set_error(e: Env, to_error: bool) {
        e.storage()
            .instance()
            .set::<MockOracleDataKey, bool>(&MockOracleDataKey::ToError, &to_error);
    }

    fn base(e: Env) -> Asset {
        e.storage()
            .instance()
            .get::<MockOracleDataKey, Asset>(&MockOracleDataKey::Base)
            .unwrap_or_else(|| panic_with_error!(&e, MockOracleError::OracleUnavailable))
    }

    fn decimals(e: Env) -> u32 {
        e.storage()
            .instance()
            .get::<MockOracleDataKey, u32>(&MockOracleDataKey::Decimals)
            .unwrap_or(7)
    }

    fn lastprice(e: Env, asset: Asset) -> Option<PriceData> {
        let to_error = e
            .storage()
            .instance()
            .get::<MockOracleDataKey, bool>(&MockOracleDataKey::ToError)
            .unwrap_or(false);
        if to_error {
            panic_with_error!(&e, MockOracleError::OracleUnavailable);
        }

        e.storage()
            .instance()
            .get::<MockOracleDataKey, PriceData>(&MockOracleDataKey::Price(asset))
    }
}
