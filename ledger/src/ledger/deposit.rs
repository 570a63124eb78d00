use sep_41_token::TokenClient;
use soroban_sdk::{panic_with_error, Address, Env};

use crate::{errors::LedgerError, oracle::PriceOracle, validator::require_positive};

use super::{actions::Receipt, ledger::Ledger, position::UserPosition};

/// Deposit `amount` of `asset` from `from` into its bank
///
/// Deposits only improve a position's health, so no price is read.
///
/// ### Panics
/// If the amount is not positive or mints no shares, or if the position or bank does not exist
pub fn execute_deposit<O: PriceOracle>(
    e: &Env,
    ledger: &mut Ledger<O>,
    from: &Address,
    asset: &Address,
    amount: i128,
) -> Receipt {
    require_positive(e, amount);
    let mut position = UserPosition::load(e, from);
    let mut bank = ledger.load_bank(e, asset);

    let shares = bank.to_deposit_shares_down(e, amount);
    if shares <= 0 {
        panic_with_error!(e, LedgerError::InvalidAmount);
    }
    bank.add_deposit(e, amount, shares);
    position.add_deposit(asset, shares);

    ledger.cache_bank(bank.clone(), true);
    ledger.store_cached_banks(e);
    position.store(e);

    TokenClient::new(e, asset).transfer(from, &e.current_contract_address(), &amount);

    Receipt {
        amount,
        shares,
        position,
        bank,
    }
}
