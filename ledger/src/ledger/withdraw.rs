use sep_41_token::TokenClient;
use soroban_sdk::{panic_with_error, Address, Env};

use crate::{errors::LedgerError, oracle::PriceOracle, validator::require_positive};

use super::{
    actions::Receipt, health::PositionData, ledger::Ledger, position::UserPosition,
};

/// Withdraw `amount` of `asset` from the bank to `from`
///
/// ### Panics
/// If the amount is not positive or exceeds the deposit value, if the bank lacks the liquidity,
/// if the position or bank does not exist, or if a position with debt would fall below the
/// minimum health ratio
pub fn execute_withdraw<O: PriceOracle>(
    e: &Env,
    ledger: &mut Ledger<O>,
    from: &Address,
    asset: &Address,
    amount: i128,
) -> Receipt {
    require_positive(e, amount);
    let mut position = UserPosition::load(e, from);
    let mut bank = ledger.load_bank(e, asset);

    let held_shares = position.deposit_shares(asset);
    if amount > bank.to_deposit_amount_down(e, held_shares) {
        panic_with_error!(e, LedgerError::InsufficientBalance);
    }
    bank.require_liquidity(e, amount);

    let shares = bank.to_deposit_shares_up(e, amount).min(held_shares);
    bank.remove_deposit(e, amount, shares);
    position.remove_deposit(e, asset, shares);
    ledger.cache_bank(bank.clone(), true);

    if position.has_borrows() {
        let position_data = PositionData::calculate_from_position(e, ledger, &position);
        position_data.require_healthy(e, ledger.config.min_health);
    }

    ledger.store_cached_banks(e);
    position.store(e);

    TokenClient::new(e, asset).transfer(&e.current_contract_address(), from, &amount);

    Receipt {
        amount,
        shares,
        position,
        bank,
    }
}
