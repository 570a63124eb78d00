use sep_41_token::TokenClient;
use soroban_sdk::{panic_with_error, Address, Env};

use crate::{errors::LedgerError, oracle::PriceOracle, validator::require_positive};

use super::{actions::Receipt, ledger::Ledger, position::UserPosition};

/// Repay up to `amount` of `from`'s debt in `asset`
///
/// Any amount over the outstanding debt is not taken from the user. A partial repayment burns
/// the borrow shares it covers rounded down.
///
/// ### Panics
/// If the amount is not positive, if the user owes nothing in `asset`, or if the position or
/// bank does not exist
pub fn execute_repay<O: PriceOracle>(
    e: &Env,
    ledger: &mut Ledger<O>,
    from: &Address,
    asset: &Address,
    amount: i128,
) -> Receipt {
    require_positive(e, amount);
    let mut position = UserPosition::load(e, from);
    let mut bank = ledger.load_bank(e, asset);

    let held_shares = position.borrow_shares(asset);
    if held_shares == 0 {
        panic_with_error!(e, LedgerError::OverRepayment);
    }
    let owed = bank.to_borrow_amount_up(e, held_shares);
    let (repaid, shares) = if amount >= owed {
        (owed, held_shares)
    } else {
        (amount, bank.to_borrow_shares_down(e, amount))
    };
    bank.remove_borrow(e, repaid, shares);
    position.remove_borrow(e, asset, shares);

    ledger.cache_bank(bank.clone(), true);
    ledger.store_cached_banks(e);
    position.store(e);

    TokenClient::new(e, asset).transfer(from, &e.current_contract_address(), &repaid);

    Receipt {
        amount: repaid,
        shares,
        position,
        bank,
    }
}
