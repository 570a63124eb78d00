#![cfg(test)]

use crate::{
    ledger::{AssetBank, Ledger, UserPosition},
    oracle::{OraclePrice, PriceOracle},
    storage::{self, BankConfig, BankData, LedgerConfig},
    LedgerError, LendingLedgerContract,
};
use mock_oracle::{MockPriceOracle, MockPriceOracleClient};
use sep_40_oracle::Asset;
use sep_41_token::testutils::{MockTokenClient, MockTokenWASM};
use soroban_sdk::{
    map, panic_with_error, testutils::Address as _, Address, Env, IntoVal, Map, Symbol,
};

pub(crate) fn create_ledger(e: &Env) -> Address {
    e.register_contract(None, LendingLedgerContract {})
}

//************************************************
//           External Contract Helpers
//************************************************

// ***** Token *****

pub(crate) fn create_token_contract<'a>(
    e: &Env,
    admin: &Address,
) -> (Address, MockTokenClient<'a>) {
    let contract_address = Address::generate(e);
    e.register_contract_wasm(&contract_address, MockTokenWASM);
    let client = MockTokenClient::new(e, &contract_address);
    client.initialize(admin, &7, &"unit".into_val(e), &"test".into_val(e));
    (contract_address, client)
}

//***** Oracle ******

pub(crate) fn create_mock_oracle<'a>(e: &Env) -> (Address, MockPriceOracleClient<'a>) {
    let contract_address = e.register_contract(None, MockPriceOracle {});
    let client = MockPriceOracleClient::new(e, &contract_address);
    client.set_data(&Asset::Other(Symbol::new(e, "USD")), &7);
    (contract_address, client)
}

/// A price oracle with fixed prices reported at the current ledger time
pub(crate) struct FixedPriceOracle {
    pub decimals: u32,
    pub prices: Map<Address, i128>,
}

impl FixedPriceOracle {
    pub fn new(e: &Env, decimals: u32) -> Self {
        FixedPriceOracle {
            decimals,
            prices: map![e],
        }
    }

    pub fn set_price(&mut self, asset: &Address, price: i128) {
        self.prices.set(asset.clone(), price);
    }
}

impl PriceOracle for FixedPriceOracle {
    fn decimals(&self, _e: &Env) -> u32 {
        self.decimals
    }

    fn get_price(&self, e: &Env, asset: &Address, _max_staleness: u64) -> OraclePrice {
        match self.prices.get(asset.clone()) {
            Some(price) => OraclePrice {
                price,
                confidence: 0,
                timestamp: e.ledger().timestamp(),
            },
            None => panic_with_error!(e, LedgerError::UnknownAsset),
        }
    }
}

//************************************************
//           Ledger Helpers
//************************************************

pub(crate) fn default_ledger_config(e: &Env) -> LedgerConfig {
    LedgerConfig {
        oracle: Address::generate(e),
        min_health: 1_5000000,
        max_price_age: 3600,
    }
}

/// Create a Ledger for an operation that reads prices from a FixedPriceOracle with 7 decimals
pub(crate) fn create_fixed_ledger(e: &Env) -> Ledger<FixedPriceOracle> {
    Ledger::new(e, default_ledger_config(e), FixedPriceOracle::new(e, 7))
}

pub(crate) fn default_bank_meta() -> (BankConfig, BankData) {
    (
        BankConfig {
            index: 0,
            decimals: 7,
            deposit_rate: 0_0500000,
            borrow_rate: 0_1000000,
            liquidation_threshold: 0_8000000,
            liquidation_bonus: 0_0500000,
            close_factor: 0_5000000,
        },
        BankData {
            total_deposit_shares: 0,
            total_borrow_shares: 0,
            total_deposited: 0,
            total_borrowed: 0,
            fee_shares: 0,
            last_time: 0,
        },
    )
}

pub(crate) fn default_bank(e: &Env) -> AssetBank {
    AssetBank {
        asset: Address::generate(e),
        index: 0,
        decimals: 7,
        deposit_rate: 0_0500000,
        borrow_rate: 0_1000000,
        liquidation_threshold: 0_8000000,
        liquidation_bonus: 0_0500000,
        close_factor: 0_5000000,
        scalar: 1_0000000,
        total_deposit_shares: 0,
        total_borrow_shares: 0,
        total_deposited: 0,
        total_borrowed: 0,
        fee_shares: 0,
        last_time: 0,
    }
}

pub(crate) fn create_bank(
    e: &Env,
    ledger_address: &Address,
    asset: &Address,
    bank_config: &BankConfig,
    bank_data: &BankData,
) {
    e.as_contract(ledger_address, || {
        let index = storage::push_bank_list(e, asset);
        let mut config = bank_config.clone();
        config.index = index;
        storage::set_bank_config(e, asset, &config);
        storage::set_bank_data(e, asset, bank_data);
    });
}

/// Store an empty position for `user`. Must be called as the ledger contract.
pub(crate) fn create_position(e: &Env, user: &Address) {
    UserPosition::new(e, user).store(e);
}
