use crate::{
    errors::LedgerError,
    ledger::{self, AssetBank, HealthData, Ledger, Liquidation, PositionData, Receipt, UserPosition},
    storage::{self, BankConfig, LedgerConfig},
};
use soroban_sdk::{contract, contractclient, contractimpl, panic_with_error, Address, Env, Symbol};

/// ### Lending Ledger
///
/// A collateralized lending ledger. Users deposit assets into per-asset banks and borrow
/// against them, valued by a SEP-40 price oracle.
#[contract]
pub struct LendingLedgerContract;

#[contractclient(name = "LendingLedgerClient")]
pub trait LendingLedger {
    /// Initialize the ledger
    ///
    /// ### Arguments
    /// * `admin` - The Address for the admin
    /// * `oracle` - The contract address of the SEP-40 price oracle
    /// * `min_health` - The minimum health ratio for borrows and withdrawals (7 decimals)
    /// * `max_price_age` - The maximum age of an oracle price in seconds
    ///
    /// ### Panics
    /// If the ledger is already initialized or the arguments are invalid
    fn initialize(e: Env, admin: Address, oracle: Address, min_health: u32, max_price_age: u64);

    /// (Admin only) Set a new address as the admin of this ledger
    ///
    /// ### Arguments
    /// * `new_admin` - The new admin address
    ///
    /// ### Panics
    /// If the caller is not the admin
    fn set_admin(e: Env, new_admin: Address);

    /// Initialize an empty position for `user`
    ///
    /// ### Panics
    /// If the user already has a position
    fn init_user(e: Env, user: Address) -> UserPosition;

    /// (Admin only) Initialize a bank for an asset
    ///
    /// Returns the index of the bank
    ///
    /// ### Arguments
    /// * `caller` - The admin
    /// * `asset` - The underlying asset of the bank
    /// * `config` - The BankConfig for the bank
    ///
    /// ### Panics
    /// If the caller is not the admin, the bank already exists or the config is invalid
    fn init_bank(e: Env, caller: Address, asset: Address, config: BankConfig) -> u32;

    /// Deposit `amount` of `asset` from `from`
    fn deposit(e: Env, from: Address, asset: Address, amount: i128) -> Receipt;

    /// Withdraw `amount` of `asset` to `from`
    ///
    /// ### Panics
    /// If `from` does not hold the amount, the bank lacks the liquidity, or `from` would
    /// fall below the minimum health ratio
    fn withdraw(e: Env, from: Address, asset: Address, amount: i128) -> Receipt;

    /// Borrow `amount` of `asset` to `from`
    ///
    /// ### Panics
    /// If the bank lacks the liquidity or `from` would fall below the minimum health ratio
    fn borrow(e: Env, from: Address, asset: Address, amount: i128) -> Receipt;

    /// Repay up to `amount` of `from`'s debt in `asset`. Amounts over the debt are not taken.
    ///
    /// ### Panics
    /// If `from` has no debt in `asset`
    fn repay(e: Env, from: Address, asset: Address, amount: i128) -> Receipt;

    /// Liquidate an unhealthy position by repaying up to `amount` of its `debt_asset` debt in
    /// exchange for its `collateral_asset` deposit shares
    ///
    /// ### Panics
    /// If the position is not liquidatable
    fn liquidate(
        e: Env,
        liquidator: Address,
        user: Address,
        debt_asset: Address,
        collateral_asset: Address,
        amount: i128,
    ) -> Liquidation;

    /// (Admin only) Claim the protocol fees of a bank
    ///
    /// Returns the amount of underlying sent to `to`
    fn claim_fees(e: Env, asset: Address, to: Address) -> i128;

    /// Accrue interest on a bank
    fn accrue(e: Env, asset: Address) -> AssetBank;

    /// Fetch the ledger's configuration
    fn get_config(e: Env) -> LedgerConfig;

    /// Fetch a bank, accrued to the current time
    fn get_bank(e: Env, asset: Address) -> AssetBank;

    /// Fetch the position for a user
    fn get_position(e: Env, user: Address) -> UserPosition;

    /// Fetch the valuation and health ratio of a user's position
    fn get_health(e: Env, user: Address) -> HealthData;
}

#[contractimpl]
impl LendingLedger for LendingLedgerContract {
    fn initialize(e: Env, admin: Address, oracle: Address, min_health: u32, max_price_age: u64) {
        storage::extend_instance(&e);

        ledger::execute_initialize(&e, &admin, &oracle, min_health, max_price_age);
    }

    fn set_admin(e: Env, new_admin: Address) {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        storage::set_admin(&e, &new_admin);

        e.events()
            .publish((Symbol::new(&e, "set_admin"), admin), new_admin);
    }

    fn init_user(e: Env, user: Address) -> UserPosition {
        storage::extend_instance(&e);
        user.require_auth();

        ledger::execute_init_user(&e, &user)
    }

    fn init_bank(e: Env, caller: Address, asset: Address, config: BankConfig) -> u32 {
        storage::extend_instance(&e);
        caller.require_auth();
        if caller != storage::get_admin(&e) {
            panic_with_error!(&e, LedgerError::Unauthorized);
        }

        let index = ledger::execute_init_bank(&e, &asset, &config);

        e.events()
            .publish((Symbol::new(&e, "init_bank"), caller), (asset, index));
        index
    }

    fn deposit(e: Env, from: Address, asset: Address, amount: i128) -> Receipt {
        storage::extend_instance(&e);
        from.require_auth();

        let mut ledger_state = Ledger::load(&e);
        let receipt = ledger::execute_deposit(&e, &mut ledger_state, &from, &asset, amount);

        e.events().publish(
            (Symbol::new(&e, "deposit"), asset, from),
            (receipt.amount, receipt.shares),
        );
        receipt
    }

    fn withdraw(e: Env, from: Address, asset: Address, amount: i128) -> Receipt {
        storage::extend_instance(&e);
        from.require_auth();

        let mut ledger_state = Ledger::load(&e);
        let receipt = ledger::execute_withdraw(&e, &mut ledger_state, &from, &asset, amount);

        e.events().publish(
            (Symbol::new(&e, "withdraw"), asset, from),
            (receipt.amount, receipt.shares),
        );
        receipt
    }

    fn borrow(e: Env, from: Address, asset: Address, amount: i128) -> Receipt {
        storage::extend_instance(&e);
        from.require_auth();

        let mut ledger_state = Ledger::load(&e);
        let receipt = ledger::execute_borrow(&e, &mut ledger_state, &from, &asset, amount);

        e.events().publish(
            (Symbol::new(&e, "borrow"), asset, from),
            (receipt.amount, receipt.shares),
        );
        receipt
    }

    fn repay(e: Env, from: Address, asset: Address, amount: i128) -> Receipt {
        storage::extend_instance(&e);
        from.require_auth();

        let mut ledger_state = Ledger::load(&e);
        let receipt = ledger::execute_repay(&e, &mut ledger_state, &from, &asset, amount);

        e.events().publish(
            (Symbol::new(&e, "repay"), asset, from),
            (receipt.amount, receipt.shares),
        );
        receipt
    }

    fn liquidate(
        e: Env,
        liquidator: Address,
        user: Address,
        debt_asset: Address,
        collateral_asset: Address,
        amount: i128,
    ) -> Liquidation {
        storage::extend_instance(&e);
        liquidator.require_auth();

        let mut ledger_state = Ledger::load(&e);
        let liquidation = ledger::execute_liquidate(
            &e,
            &mut ledger_state,
            &liquidator,
            &user,
            &debt_asset,
            &collateral_asset,
            amount,
        );

        e.events().publish(
            (Symbol::new(&e, "liquidate"), user, liquidator),
            (
                debt_asset,
                liquidation.repaid,
                collateral_asset,
                liquidation.seized,
            ),
        );
        liquidation
    }

    fn claim_fees(e: Env, asset: Address, to: Address) -> i128 {
        storage::extend_instance(&e);
        let admin = storage::get_admin(&e);
        admin.require_auth();

        let mut ledger_state = Ledger::load(&e);
        let amount = ledger::execute_claim_fees(&e, &mut ledger_state, &asset, &to);

        e.events()
            .publish((Symbol::new(&e, "claim_fees"), asset, to), amount);
        amount
    }

    fn accrue(e: Env, asset: Address) -> AssetBank {
        storage::extend_instance(&e);

        let mut ledger_state = Ledger::load(&e);
        ledger::execute_accrue(&e, &mut ledger_state, &asset)
    }

    fn get_config(e: Env) -> LedgerConfig {
        storage::get_config(&e)
    }

    fn get_bank(e: Env, asset: Address) -> AssetBank {
        AssetBank::load(&e, &asset)
    }

    fn get_position(e: Env, user: Address) -> UserPosition {
        UserPosition::load(&e, &user)
    }

    fn get_health(e: Env, user: Address) -> HealthData {
        let position = UserPosition::load(&e, &user);
        let mut ledger_state = Ledger::load(&e);
        PositionData::calculate_from_position(&e, &mut ledger_state, &position).as_health_data()
    }
}
