use sep_41_token::TokenClient;
use soroban_sdk::{Address, Env};

use crate::{oracle::PriceOracle, validator::require_positive};

use super::{
    actions::Receipt, health::PositionData, ledger::Ledger, position::UserPosition,
};

/// Borrow `amount` of `asset` from the bank to `from`
///
/// ### Panics
/// If the amount is not positive, if the bank lacks the liquidity, if the position or bank does
/// not exist, or if the position would fall below the minimum health ratio
pub fn execute_borrow<O: PriceOracle>(
    e: &Env,
    ledger: &mut Ledger<O>,
    from: &Address,
    asset: &Address,
    amount: i128,
) -> Receipt {
    require_positive(e, amount);
    let mut position = UserPosition::load(e, from);
    let mut bank = ledger.load_bank(e, asset);
    bank.require_liquidity(e, amount);

    let shares = bank.to_borrow_shares_up(e, amount);
    bank.add_borrow(e, amount, shares);
    position.add_borrow(asset, shares);
    ledger.cache_bank(bank.clone(), true);

    let position_data = PositionData::calculate_from_position(e, ledger, &position);
    position_data.require_healthy(e, ledger.config.min_health);

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
