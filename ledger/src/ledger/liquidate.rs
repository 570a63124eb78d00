use cast::i128;
use sep_41_token::TokenClient;
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{panic_with_error, unwrap::UnwrapOptimized, Address, Env, Map, Symbol};

use crate::{
    constants::SCALAR_7, errors::LedgerError, oracle::PriceOracle, validator::require_positive,
};

use super::{
    actions::Liquidation, health::PositionData, ledger::Ledger, position::UserPosition,
};

/// Liquidate part of an unhealthy position. The liquidator repays up to `amount` of the user's
/// `debt_asset` debt and receives the user's `collateral_asset` deposit shares worth the repaid
/// value plus the collateral bank's liquidation bonus.
///
/// The repayment is capped by the debt bank's close factor, and scaled down if the user does not
/// hold enough collateral to cover it. If the user is left with debt but no collateral, the
/// remaining debt is written off against each bank's depositors.
///
/// ### Arguments
/// * `liquidator` - The address repaying the debt, with an initialized position
/// * `user` - The address of the position being liquidated
/// * `debt_asset` - The asset to repay
/// * `collateral_asset` - The asset to seize
/// * `amount` - The maximum amount of `debt_asset` to repay
///
/// ### Panics
/// If the position is not liquidatable or holds no debt in `debt_asset` or no collateral in
/// `collateral_asset`, or if either position does not exist
pub fn execute_liquidate<O: PriceOracle>(
    e: &Env,
    ledger: &mut Ledger<O>,
    liquidator: &Address,
    user: &Address,
    debt_asset: &Address,
    collateral_asset: &Address,
    amount: i128,
) -> Liquidation {
    require_positive(e, amount);
    if liquidator == user {
        panic_with_error!(e, LedgerError::Unauthorized);
    }
    let mut position = UserPosition::load(e, user);
    let mut liquidator_position = UserPosition::load(e, liquidator);

    let position_data = PositionData::calculate_from_position(e, ledger, &position);
    if !position_data.is_liquidatable() {
        panic_with_error!(e, LedgerError::NotLiquidatable);
    }
    let debt_shares = position.borrow_shares(debt_asset);
    let collateral_shares = position.deposit_shares(collateral_asset);
    if debt_shares == 0 || collateral_shares == 0 {
        panic_with_error!(e, LedgerError::NotLiquidatable);
    }

    let mut debt_bank = ledger.load_bank(e, debt_asset);
    let collateral_bank = ledger.load_bank(e, collateral_asset);

    let owed = debt_bank.to_borrow_amount_up(e, debt_shares);
    let max_repay = owed
        .fixed_mul_ceil(i128(debt_bank.close_factor), SCALAR_7)
        .unwrap_optimized();
    let mut repaid = amount.min(max_repay);

    // value the repayment in the base asset and convert it, with the bonus, to collateral
    let seize_base = ledger
        .to_base_floor(e, &debt_bank, repaid)
        .fixed_mul_floor(SCALAR_7 + i128(collateral_bank.liquidation_bonus), SCALAR_7)
        .unwrap_optimized();
    let mut seized = ledger.from_base_floor(e, &collateral_bank, seize_base);
    let collateral_amount = collateral_bank.to_deposit_amount_down(e, collateral_shares);
    let seized_shares = if seized >= collateral_amount {
        repaid = repaid
            .fixed_mul_ceil(collateral_amount, seized)
            .unwrap_optimized();
        seized = collateral_amount;
        collateral_shares
    } else {
        collateral_bank
            .to_deposit_shares_down(e, seized)
            .min(collateral_shares)
    };
    if repaid <= 0 {
        panic_with_error!(e, LedgerError::InvalidAmount);
    }

    let repaid_shares = if repaid >= owed {
        debt_shares
    } else {
        debt_bank.to_borrow_shares_down(e, repaid)
    };
    debt_bank.remove_borrow(e, repaid, repaid_shares);
    position.remove_borrow(e, debt_asset, repaid_shares);
    ledger.cache_bank(debt_bank, true);

    position.remove_deposit(e, collateral_asset, seized_shares);
    liquidator_position.add_deposit(collateral_asset, seized_shares);

    let bad_debt = if !position.has_deposits() && position.has_borrows() {
        write_off_bad_debt(e, ledger, &mut position)
    } else {
        0
    };

    ledger.store_cached_banks(e);
    position.store(e);
    liquidator_position.store(e);

    TokenClient::new(e, debt_asset).transfer(liquidator, &e.current_contract_address(), &repaid);

    Liquidation {
        repaid,
        repaid_shares,
        seized,
        seized_shares,
        bad_debt,
    }
}

/// Write off all remaining debt of a position without collateral
///
/// Returns the base value of the debt written off
fn write_off_bad_debt<O: PriceOracle>(
    e: &Env,
    ledger: &mut Ledger<O>,
    position: &mut UserPosition,
) -> i128 {
    let mut bad_debt_base = 0;
    for (asset, shares) in position.borrows.iter() {
        let mut bank = ledger.load_bank(e, &asset);
        let owed = bank
            .to_borrow_amount_up(e, shares)
            .min(bank.total_borrowed);
        bank.write_off_borrow(e, owed, shares);
        bad_debt_base += ledger.to_base_floor(e, &bank, owed);
        ledger.cache_bank(bank, true);

        e.events().publish(
            (Symbol::new(e, "bad_debt"), position.owner.clone()),
            (asset, owed, shares),
        );
    }
    position.borrows = Map::new(e);
    bad_debt_base
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{storage, testutils};
    use soroban_sdk::testutils::{Address as _, Ledger as _};

    #[test]
    fn test_liquidate_capped_by_close_factor() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();
        e.ledger().with_mut(|li| li.timestamp = 100_000);

        let ledger = testutils::create_ledger(&e);
        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);

        let (usdc, _) = testutils::create_token_contract(&e, &bombadil);
        let (sol, sol_client) = testutils::create_token_contract(&e, &bombadil);
        let (bank_config, mut bank_data) = testutils::default_bank_meta();
        bank_data.total_deposit_shares = 100_0000000;
        bank_data.total_deposited = 100_0000000;
        bank_data.last_time = 100_000;
        testutils::create_bank(&e, &ledger, &usdc, &bank_config, &bank_data);
        bank_data.total_borrow_shares = 50_0000000;
        bank_data.total_borrowed = 50_0000000;
        testutils::create_bank(&e, &ledger, &sol, &bank_config, &bank_data);
        sol_client.mint(&frodo, &100_0000000);

        e.as_contract(&ledger, || {
            e.mock_all_auths_allowing_non_root_auth();
            let mut position = UserPosition::new(&e, &samwise);
            position.add_deposit(&usdc, 100_0000000);
            position.add_borrow(&sol, 50_0000000);
            position.store(&e);
            testutils::create_position(&e, &frodo);
            let mut cache = testutils::create_fixed_ledger(&e);
            cache.oracle.set_price(&usdc, 1_0000000);
            // debt is now worth 90 against 80 of threshold collateral
            cache.oracle.set_price(&sol, 1_8000000);

            let result = execute_liquidate(&e, &mut cache, &frodo, &samwise, &sol, &usdc, 30_0000000);

            assert_eq!(result.repaid, 25_0000000);
            assert_eq!(result.repaid_shares, 25_0000000);
            // 25 * 1.8 * 1.05
            assert_eq!(result.seized, 47_2500000);
            assert_eq!(result.seized_shares, 47_2500000);
            assert_eq!(result.bad_debt, 0);

            let position = UserPosition::load(&e, &samwise);
            assert_eq!(position.deposit_shares(&usdc), 52_7500000);
            assert_eq!(position.borrow_shares(&sol), 25_0000000);
            let liquidator_position = UserPosition::load(&e, &frodo);
            assert_eq!(liquidator_position.deposit_shares(&usdc), 47_2500000);

            let sol_data = storage::get_bank_data(&e, &sol);
            assert_eq!(sol_data.total_borrowed, 25_0000000);
            assert_eq!(sol_data.total_borrow_shares, 25_0000000);
            // seized shares move between positions
            let usdc_data = storage::get_bank_data(&e, &usdc);
            assert_eq!(usdc_data.total_deposit_shares, 100_0000000);

            assert_eq!(sol_client.balance(&frodo), 75_0000000);
            assert_eq!(sol_client.balance(&ledger), 25_0000000);
        });
    }

    #[test]
    fn test_liquidate_writes_off_bad_debt() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();
        e.ledger().with_mut(|li| li.timestamp = 100_000);

        let ledger = testutils::create_ledger(&e);
        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);

        let (usdc, _) = testutils::create_token_contract(&e, &bombadil);
        let (sol, sol_client) = testutils::create_token_contract(&e, &bombadil);
        let (mut bank_config, mut bank_data) = testutils::default_bank_meta();
        bank_data.total_deposit_shares = 100_0000000;
        bank_data.total_deposited = 100_0000000;
        bank_data.last_time = 100_000;
        testutils::create_bank(&e, &ledger, &usdc, &bank_config, &bank_data);
        bank_config.close_factor = 1_0000000;
        bank_data.total_borrow_shares = 50_0000000;
        bank_data.total_borrowed = 50_0000000;
        testutils::create_bank(&e, &ledger, &sol, &bank_config, &bank_data);
        sol_client.mint(&frodo, &100_0000000);

        e.as_contract(&ledger, || {
            e.mock_all_auths_allowing_non_root_auth();
            let mut position = UserPosition::new(&e, &samwise);
            position.add_deposit(&usdc, 100_0000000);
            position.add_borrow(&sol, 50_0000000);
            position.store(&e);
            testutils::create_position(&e, &frodo);
            let mut cache = testutils::create_fixed_ledger(&e);
            cache.oracle.set_price(&usdc, 1_0000000);
            cache.oracle.set_price(&sol, 3_0000000);

            let result =
                execute_liquidate(&e, &mut cache, &frodo, &samwise, &sol, &usdc, 100_0000000);

            // 157.5 of collateral is owed for the full debt, only 100 exists
            assert_eq!(result.seized, 100_0000000);
            assert_eq!(result.seized_shares, 100_0000000);
            assert_eq!(result.repaid, 31_7460318);
            assert_eq!(result.repaid_shares, 31_7460318);
            assert_eq!(result.bad_debt, 54_7619046);

            let position = UserPosition::load(&e, &samwise);
            assert!(!position.has_deposits());
            assert!(!position.has_borrows());

            let sol_data = storage::get_bank_data(&e, &sol);
            assert_eq!(sol_data.total_borrowed, 0);
            assert_eq!(sol_data.total_borrow_shares, 0);
            assert_eq!(sol_data.total_deposited, 81_7460318);
            assert_eq!(sol_client.balance(&frodo), 100_0000000 - 31_7460318);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1208)")]
    fn test_liquidate_healthy_position() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();
        e.ledger().with_mut(|li| li.timestamp = 100_000);

        let ledger = testutils::create_ledger(&e);
        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);

        let (usdc, _) = testutils::create_token_contract(&e, &bombadil);
        let (sol, sol_client) = testutils::create_token_contract(&e, &bombadil);
        let (bank_config, mut bank_data) = testutils::default_bank_meta();
        bank_data.total_deposit_shares = 100_0000000;
        bank_data.total_deposited = 100_0000000;
        bank_data.last_time = 100_000;
        testutils::create_bank(&e, &ledger, &usdc, &bank_config, &bank_data);
        bank_data.total_borrow_shares = 50_0000000;
        bank_data.total_borrowed = 50_0000000;
        testutils::create_bank(&e, &ledger, &sol, &bank_config, &bank_data);
        sol_client.mint(&frodo, &100_0000000);

        e.as_contract(&ledger, || {
            let mut position = UserPosition::new(&e, &samwise);
            position.add_deposit(&usdc, 100_0000000);
            position.add_borrow(&sol, 50_0000000);
            position.store(&e);
            testutils::create_position(&e, &frodo);
            let mut cache = testutils::create_fixed_ledger(&e);
            cache.oracle.set_price(&usdc, 1_0000000);
            // threshold collateral of 80 exactly covers a debt of 80
            cache.oracle.set_price(&sol, 1_6000000);

            execute_liquidate(&e, &mut cache, &frodo, &samwise, &sol, &usdc, 10_0000000);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #4)")]
    fn test_liquidate_self() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let ledger = testutils::create_ledger(&e);
        let samwise = Address::generate(&e);
        let usdc = Address::generate(&e);
        let sol = Address::generate(&e);

        e.as_contract(&ledger, || {
            testutils::create_position(&e, &samwise);
            let mut cache = testutils::create_fixed_ledger(&e);
            execute_liquidate(&e, &mut cache, &samwise, &samwise, &sol, &usdc, 10_0000000);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1200)")]
    fn test_liquidate_without_liquidator_position() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let ledger = testutils::create_ledger(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let usdc = Address::generate(&e);
        let sol = Address::generate(&e);

        e.as_contract(&ledger, || {
            testutils::create_position(&e, &samwise);
            let mut cache = testutils::create_fixed_ledger(&e);
            execute_liquidate(&e, &mut cache, &frodo, &samwise, &sol, &usdc, 10_0000000);
        });
    }
}
