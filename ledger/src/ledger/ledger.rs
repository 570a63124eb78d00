use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{map, unwrap::UnwrapOptimized, vec, Address, Env, Map, Vec};

use crate::{
    constants::SCALAR_7,
    oracle::{PriceOracle, Sep40Oracle},
    storage::{self, LedgerConfig},
};

use super::bank::AssetBank;

/// The state of the ledger for a single operation. Banks are accrued once
/// when first loaded and each price is read from the oracle at most once.
pub struct Ledger<O: PriceOracle> {
    pub config: LedgerConfig,
    pub oracle: O,
    pub banks: Map<Address, AssetBank>,
    banks_to_store: Vec<Address>,
    price_decimals: Option<u32>,
    prices: Map<Address, i128>,
}

impl Ledger<Sep40Oracle> {
    /// Load the Ledger from storage, reading prices from the configured SEP-40 oracle
    pub fn load(e: &Env) -> Self {
        let config = storage::get_config(e);
        let oracle = Sep40Oracle::new(&config.oracle);
        Ledger::new(e, config, oracle)
    }
}

impl<O: PriceOracle> Ledger<O> {
    /// Create a Ledger for an operation with a specific price oracle
    pub fn new(e: &Env, config: LedgerConfig, oracle: O) -> Self {
        Ledger {
            config,
            oracle,
            banks: map![e],
            banks_to_store: vec![e],
            price_decimals: None,
            prices: map![e],
        }
    }

    /// Load an AssetBank from the ledger and accrue it to the current ledger timestamp.
    /// Returns a cached version if it exists.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    pub fn load_bank(&self, e: &Env, asset: &Address) -> AssetBank {
        if let Some(bank) = self.banks.get(asset.clone()) {
            return bank;
        }
        AssetBank::load(e, asset)
    }

    /// Cache the updated bank.
    ///
    /// ### Arguments
    /// * bank - The updated bank
    /// * write - If the bank needs to be written to the ledger
    pub fn cache_bank(&mut self, bank: AssetBank, write: bool) {
        if !self.banks_to_store.contains(&bank.asset) && write {
            self.banks_to_store.push_back(bank.asset.clone());
        }
        self.banks.set(bank.asset.clone(), bank);
    }

    /// Store the cached banks that need to be written to the ledger.
    pub fn store_cached_banks(&self, e: &Env) {
        for address in self.banks_to_store.iter() {
            let bank = self.banks.get_unchecked(address);
            bank.store(e);
        }
    }

    /// Load the decimals of the oracle's prices. Returns a cached version if one exists.
    pub fn load_price_decimals(&mut self, e: &Env) -> u32 {
        if let Some(decimals) = self.price_decimals {
            return decimals;
        }
        let decimals = self.oracle.decimals(e);
        self.price_decimals = Some(decimals);
        decimals
    }

    /// Load the price of an asset from the oracle. Returns a cached version if one exists.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    ///
    /// ### Panics
    /// If the price is stale or unknown
    pub fn load_price(&mut self, e: &Env, asset: &Address) -> i128 {
        if let Some(price) = self.prices.get(asset.clone()) {
            return price;
        }
        let price = self
            .oracle
            .get_price(e, asset, self.config.max_price_age)
            .price;
        self.prices.set(asset.clone(), price);
        price
    }

    /// Value an amount of a bank's asset in the base asset with 7 decimals, rounding down
    ///
    /// ### Arguments
    /// * bank - The bank of the asset
    /// * amount - The amount of the underlying asset
    pub fn to_base_floor(&mut self, e: &Env, bank: &AssetBank, amount: i128) -> i128 {
        let price = self.load_price(e, &bank.asset);
        let price_scalar = 10i128.pow(self.load_price_decimals(e));
        amount
            .fixed_mul_floor(price, bank.scalar)
            .and_then(|value| value.fixed_mul_floor(SCALAR_7, price_scalar))
            .unwrap_optimized()
    }

    /// Value an amount of a bank's asset in the base asset with 7 decimals, rounding up.
    /// Any positive amount of a priced asset has a positive value.
    ///
    /// ### Arguments
    /// * bank - The bank of the asset
    /// * amount - The amount of the underlying asset
    pub fn to_base_ceil(&mut self, e: &Env, bank: &AssetBank, amount: i128) -> i128 {
        let price = self.load_price(e, &bank.asset);
        let price_scalar = 10i128.pow(self.load_price_decimals(e));
        amount
            .fixed_mul_ceil(price, bank.scalar)
            .and_then(|value| value.fixed_mul_ceil(SCALAR_7, price_scalar))
            .unwrap_optimized()
    }

    /// Convert a base asset value with 7 decimals to an amount of a bank's asset, rounding down
    ///
    /// ### Arguments
    /// * bank - The bank of the asset
    /// * base - The value in the base asset
    pub fn from_base_floor(&mut self, e: &Env, bank: &AssetBank, base: i128) -> i128 {
        let price = self.load_price(e, &bank.asset);
        let price_scalar = 10i128.pow(self.load_price_decimals(e));
        base.fixed_mul_floor(bank.scalar, price)
            .and_then(|amount| amount.fixed_mul_floor(price_scalar, SCALAR_7))
            .unwrap_optimized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage::BankData, testutils};
    use soroban_sdk::testutils::{Address as _, Ledger as _};

    #[test]
    fn test_bank_cache() {
        let e = Env::default();
        e.mock_all_auths();
        e.ledger().with_mut(|li| li.timestamp = 100_000);

        let ledger = testutils::create_ledger(&e);
        let bombadil = Address::generate(&e);
        let (underlying, _) = testutils::create_token_contract(&e, &bombadil);
        let (bank_config, mut bank_data) = testutils::default_bank_meta();
        bank_data.total_deposit_shares = 100_0000000;
        bank_data.total_deposited = 100_0000000;
        bank_data.total_borrow_shares = 50_0000000;
        bank_data.total_borrowed = 50_0000000;
        bank_data.last_time = 10_000;
        testutils::create_bank(&e, &ledger, &underlying, &bank_config, &bank_data);

        e.as_contract(&ledger, || {
            let oracle = testutils::FixedPriceOracle::new(&e, 7);
            let mut cache = Ledger::new(&e, testutils::default_ledger_config(&e), oracle);
            let bank = cache.load_bank(&e, &underlying);
            assert_eq!(bank.last_time, 100_000);
            cache.cache_bank(bank.clone(), true);

            // overwrite the stored data to ensure it is loaded from the cache
            storage::set_bank_data(
                &e,
                &underlying,
                &BankData {
                    total_deposit_shares: 0,
                    total_borrow_shares: 0,
                    total_deposited: 0,
                    total_borrowed: 0,
                    fee_shares: 0,
                    last_time: 0,
                },
            );

            let cached_bank = cache.load_bank(&e, &underlying);
            assert_eq!(cached_bank, bank);

            cache.store_cached_banks(&e);
            let stored_data = storage::get_bank_data(&e, &underlying);
            assert_eq!(stored_data.total_borrowed, bank.total_borrowed);
            assert_eq!(stored_data.last_time, 100_000);
        });
    }

    #[test]
    fn test_bank_cache_stores_only_marked() {
        let e = Env::default();
        e.mock_all_auths();
        e.ledger().with_mut(|li| li.timestamp = 100_000);

        let ledger = testutils::create_ledger(&e);
        let bombadil = Address::generate(&e);
        let (underlying_0, _) = testutils::create_token_contract(&e, &bombadil);
        let (underlying_1, _) = testutils::create_token_contract(&e, &bombadil);
        let (bank_config, mut bank_data) = testutils::default_bank_meta();
        bank_data.last_time = 10_000;
        testutils::create_bank(&e, &ledger, &underlying_0, &bank_config, &bank_data);
        testutils::create_bank(&e, &ledger, &underlying_1, &bank_config, &bank_data);

        e.as_contract(&ledger, || {
            let oracle = testutils::FixedPriceOracle::new(&e, 7);
            let mut cache = Ledger::new(&e, testutils::default_ledger_config(&e), oracle);
            let bank_0 = cache.load_bank(&e, &underlying_0);
            let bank_1 = cache.load_bank(&e, &underlying_1);
            cache.cache_bank(bank_0, true);
            cache.cache_bank(bank_1, false);
            cache.store_cached_banks(&e);

            assert_eq!(storage::get_bank_data(&e, &underlying_0).last_time, 100_000);
            assert_eq!(storage::get_bank_data(&e, &underlying_1).last_time, 10_000);
        });
    }

    #[test]
    fn test_price_cache() {
        let e = Env::default();
        e.ledger().with_mut(|li| li.timestamp = 100_000);

        let ledger = testutils::create_ledger(&e);
        let usdc = Address::generate(&e);
        let sol = Address::generate(&e);

        e.as_contract(&ledger, || {
            let mut oracle = testutils::FixedPriceOracle::new(&e, 7);
            oracle.set_price(&usdc, 1_0000000);
            oracle.set_price(&sol, 150_0000000);
            let mut cache = Ledger::new(&e, testutils::default_ledger_config(&e), oracle);

            assert_eq!(cache.load_price_decimals(&e), 7);
            assert_eq!(cache.load_price(&e, &usdc), 1_0000000);
            assert_eq!(cache.load_price(&e, &sol), 150_0000000);

            // a price is read once per operation
            cache.oracle.set_price(&sol, 100_0000000);
            assert_eq!(cache.load_price(&e, &sol), 150_0000000);
        });
    }

    #[test]
    fn test_base_value() {
        let e = Env::default();
        e.ledger().with_mut(|li| li.timestamp = 100_000);

        let ledger = testutils::create_ledger(&e);
        let mut sol_bank = testutils::default_bank(&e);
        sol_bank.decimals = 9;
        sol_bank.scalar = 1_000_000_000;

        e.as_contract(&ledger, || {
            let mut oracle = testutils::FixedPriceOracle::new(&e, 7);
            oracle.set_price(&sol_bank.asset, 150_1234567);
            let mut cache = Ledger::new(&e, testutils::default_ledger_config(&e), oracle);

            assert_eq!(cache.to_base_floor(&e, &sol_bank, 2_000_000_000), 300_2469134);
            assert_eq!(cache.to_base_ceil(&e, &sol_bank, 2_000_000_000), 300_2469134);
            // 1e-9 SOL is worth 1.5e-7 USD
            assert_eq!(cache.to_base_floor(&e, &sol_bank, 1), 1);
            assert_eq!(cache.to_base_ceil(&e, &sol_bank, 1), 2);
            assert_eq!(cache.from_base_floor(&e, &sol_bank, 300_2469134), 2_000_000_000);
        });
    }

    #[test]
    fn test_base_value_high_precision_oracle() {
        let e = Env::default();
        e.ledger().with_mut(|li| li.timestamp = 100_000);

        let ledger = testutils::create_ledger(&e);
        let mut sol_bank = testutils::default_bank(&e);
        sol_bank.decimals = 9;
        sol_bank.scalar = 1_000_000_000;
        let usdc_bank = testutils::default_bank(&e);

        e.as_contract(&ledger, || {
            let mut oracle = testutils::FixedPriceOracle::new(&e, 14);
            oracle.set_price(&usdc_bank.asset, 1_00000000000000);
            // 5e-8 is below the smallest 7 decimal price
            oracle.set_price(&sol_bank.asset, 5_000_000);
            let mut cache = Ledger::new(&e, testutils::default_ledger_config(&e), oracle);

            assert_eq!(cache.load_price_decimals(&e), 14);
            assert_eq!(cache.load_price(&e, &sol_bank.asset), 5_000_000);
            assert_eq!(cache.to_base_floor(&e, &usdc_bank, 100_0000000), 100_0000000);

            // 1000 SOL is worth 0.00005 USD
            let sol_amount = 1_000 * 1_000_000_000;
            assert_eq!(cache.to_base_floor(&e, &sol_bank, sol_amount), 0_0000500);
            assert_eq!(cache.to_base_ceil(&e, &sol_bank, sol_amount), 0_0000500);
            // a dust amount still carries debt
            assert_eq!(cache.to_base_floor(&e, &sol_bank, 1), 0);
            assert_eq!(cache.to_base_ceil(&e, &sol_bank, 1), 1);
            assert_eq!(cache.from_base_floor(&e, &sol_bank, 0_0000500), sol_amount);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1207)")]
    fn test_price_unknown_asset() {
        let e = Env::default();

        let ledger = testutils::create_ledger(&e);
        let usdc = Address::generate(&e);

        e.as_contract(&ledger, || {
            let oracle = testutils::FixedPriceOracle::new(&e, 7);
            let mut cache = Ledger::new(&e, testutils::default_ledger_config(&e), oracle);
            cache.load_price(&e, &usdc);
        });
    }
}
