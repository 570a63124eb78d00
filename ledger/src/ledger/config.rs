use cast::i128;
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{panic_with_error, Address, Env};

use crate::{
    constants::{MAX_BANK_RATE, SCALAR_7},
    errors::LedgerError,
    storage::{self, BankConfig, BankData, LedgerConfig},
};

/// Initialize the ledger
///
/// ### Panics
/// If the ledger is already initialized or the arguments are invalid
pub fn execute_initialize(
    e: &Env,
    admin: &Address,
    oracle: &Address,
    min_health: u32,
    max_price_age: u64,
) {
    if storage::has_admin(e) {
        panic_with_error!(e, LedgerError::AlreadyInitialized);
    }

    // a position must hold at least as much collateral as debt
    if min_health < 1_0000000 || max_price_age == 0 {
        panic_with_error!(e, LedgerError::InvalidLedgerInitArgs);
    }

    storage::set_admin(e, admin);
    storage::set_config(
        e,
        &LedgerConfig {
            oracle: oracle.clone(),
            min_health,
            max_price_age,
        },
    );
}

/// Initialize a bank for an asset
///
/// Returns the index of the new bank
///
/// ### Panics
/// If the bank already exists or the config is invalid
pub fn execute_init_bank(e: &Env, asset: &Address, config: &BankConfig) -> u32 {
    if storage::has_bank(e, asset) {
        panic_with_error!(e, LedgerError::AlreadyInitialized);
    }

    let ledger_config = storage::get_config(e);
    require_valid_bank_config(e, &ledger_config, config);
    let index = storage::push_bank_list(e, asset);

    let bank_config = BankConfig {
        index,
        ..config.clone()
    };
    storage::set_bank_config(e, asset, &bank_config);
    let init_data = BankData {
        total_deposit_shares: 0,
        total_borrow_shares: 0,
        total_deposited: 0,
        total_borrowed: 0,
        fee_shares: 0,
        last_time: e.ledger().timestamp(),
    };
    storage::set_bank_data(e, asset, &init_data);
    index
}

#[allow(clippy::zero_prefixed_literal)]
fn require_valid_bank_config(e: &Env, ledger_config: &LedgerConfig, config: &BankConfig) {
    if config.decimals > 18
        || config.deposit_rate > config.borrow_rate
        || config.borrow_rate > MAX_BANK_RATE
        || config.liquidation_threshold == 0
        || config.liquidation_threshold > 1_0000000
        || config.close_factor == 0
        || config.close_factor > 1_0000000
    {
        panic_with_error!(e, LedgerError::InvalidBankConfig);
    }

    // positions opened at the minimum health ratio must not be liquidatable
    let threshold_at_min_health = i128(config.liquidation_threshold)
        .fixed_mul_floor(i128(ledger_config.min_health), SCALAR_7)
        .unwrap_or(0);
    // the seized collateral plus bonus must stay within the collateral counted for the debt
    let threshold_with_bonus = i128(config.liquidation_threshold)
        .fixed_mul_ceil(SCALAR_7 + i128(config.liquidation_bonus), SCALAR_7)
        .unwrap_or(i128::MAX);
    if threshold_at_min_health < SCALAR_7 || threshold_with_bonus > SCALAR_7 {
        panic_with_error!(e, LedgerError::InvalidBankConfig);
    }
}
