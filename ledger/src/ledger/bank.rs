use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{contracttype, panic_with_error, unwrap::UnwrapOptimized, Address, Env};

use crate::{
    errors::LedgerError,
    storage::{self, BankData},
};

use super::interest::{calc_accrual, max_accrual_window};

/// The pooled ledger for one supported asset
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct AssetBank {
    pub asset: Address,             // the underlying asset address
    pub index: u32,                 // the bank index in the ledger
    pub decimals: u32,              // the decimals of the underlying asset
    pub deposit_rate: u32,          // the annual deposit rate (7 decimals)
    pub borrow_rate: u32,           // the annual borrow rate (7 decimals)
    pub liquidation_threshold: u32, // the share of collateral value counted before liquidation (7 decimals)
    pub liquidation_bonus: u32,     // the bonus paid on seized collateral (7 decimals)
    pub close_factor: u32,          // the maximum share of a debt repaid by one liquidation (7 decimals)
    pub scalar: i128,               // scalar used for balances
    pub total_deposit_shares: i128, // the total supply of deposit shares
    pub total_borrow_shares: i128,  // the total supply of borrow shares
    pub total_deposited: i128,      // the underlying amount owed to deposit share holders
    pub total_borrowed: i128,       // the underlying amount owed by borrow share holders
    pub fee_shares: i128,           // the deposit shares owned by the protocol
    pub last_time: u64,             // the last time interest was accrued
}

impl AssetBank {
    /// Load an AssetBank from the ledger and accrue interest to the current ledger timestamp.
    ///
    /// **NOTE**: This function is not cached, and should be called from the Ledger.
    ///
    /// ### Arguments
    /// * asset - The address of the underlying asset
    ///
    /// ### Panics
    /// If no bank exists for the asset
    pub fn load(e: &Env, asset: &Address) -> AssetBank {
        if !storage::has_bank(e, asset) {
            panic_with_error!(e, LedgerError::AccountNotFound);
        }
        let bank_config = storage::get_bank_config(e, asset);
        let bank_data = storage::get_bank_data(e, asset);
        let mut bank = AssetBank {
            asset: asset.clone(),
            index: bank_config.index,
            decimals: bank_config.decimals,
            deposit_rate: bank_config.deposit_rate,
            borrow_rate: bank_config.borrow_rate,
            liquidation_threshold: bank_config.liquidation_threshold,
            liquidation_bonus: bank_config.liquidation_bonus,
            close_factor: bank_config.close_factor,
            scalar: 10i128.pow(bank_config.decimals),
            total_deposit_shares: bank_data.total_deposit_shares,
            total_borrow_shares: bank_data.total_borrow_shares,
            total_deposited: bank_data.total_deposited,
            total_borrowed: bank_data.total_borrowed,
            fee_shares: bank_data.fee_shares,
            last_time: bank_data.last_time,
        };
        bank.accrue(e.ledger().timestamp());
        bank
    }

    /// Accrue interest up to `now`.
    ///
    /// Borrow interest is added to both the borrowed and deposited totals. The part of it that
    /// exceeds the depositors' interest is minted to the protocol as fee shares.
    ///
    /// ### Arguments
    /// * now - The current timestamp
    pub fn accrue(&mut self, now: u64) {
        // short circuit if the bank has already been updated
        if now <= self.last_time {
            return;
        }

        let max_window = max_accrual_window(self.borrow_rate);
        while self.last_time < now {
            let window = (now - self.last_time).min(max_window);
            self.accrue_window(window);
            self.last_time += window;
        }
    }

    fn accrue_window(&mut self, delta_time: u64) {
        let (borrow_interest, deposit_interest) = calc_accrual(
            self.total_deposited,
            self.total_borrowed,
            self.deposit_rate,
            self.borrow_rate,
            delta_time,
        );
        if borrow_interest > 0 {
            let fee = borrow_interest - deposit_interest;
            if fee > 0 && self.total_deposit_shares > 0 {
                let new_fee_shares = fee
                    .fixed_mul_floor(
                        self.total_deposit_shares,
                        self.total_deposited + deposit_interest,
                    )
                    .unwrap_optimized();
                self.total_deposit_shares += new_fee_shares;
                self.fee_shares += new_fee_shares;
            }
            self.total_borrowed += borrow_interest;
            self.total_deposited += borrow_interest;
        }
    }

    /// Store the updated bank to the ledger.
    pub fn store(&self, e: &Env) {
        let bank_data = BankData {
            total_deposit_shares: self.total_deposit_shares,
            total_borrow_shares: self.total_borrow_shares,
            total_deposited: self.total_deposited,
            total_borrowed: self.total_borrowed,
            fee_shares: self.fee_shares,
            last_time: self.last_time,
        };
        storage::set_bank_data(e, &self.asset, &bank_data);
    }

    /// Fetch the underlying amount available to be borrowed or withdrawn
    pub fn available_liquidity(&self) -> i128 {
        self.total_deposited - self.total_borrowed
    }

    /// Require that the bank holds at least `amount` of available liquidity, or panic.
    pub fn require_liquidity(&self, e: &Env, amount: i128) {
        if amount > self.available_liquidity() {
            panic_with_error!(e, LedgerError::InsufficientLiquidity);
        }
    }

    /// Require that outstanding deposit shares are backed by a deposit, or panic
    pub fn require_solvent(&self, e: &Env) {
        if self.total_deposit_shares > 0 && self.total_deposited == 0 {
            panic_with_error!(e, LedgerError::InsolventBank);
        }
    }

    /********** Share Accounting **********/

    /// Add deposited underlying and the shares minted for it
    pub fn add_deposit(&mut self, e: &Env, amount: i128, shares: i128) {
        self.total_deposited = checked(e, self.total_deposited.checked_add(amount));
        self.total_deposit_shares = checked(e, self.total_deposit_shares.checked_add(shares));
    }

    /// Remove withdrawn underlying and the shares burnt for it
    pub fn remove_deposit(&mut self, e: &Env, amount: i128, shares: i128) {
        if amount > self.total_deposited || shares > self.total_deposit_shares {
            panic_with_error!(e, LedgerError::InternalError);
        }
        self.total_deposited -= amount;
        self.total_deposit_shares -= shares;
    }

    /// Add borrowed underlying and the shares minted for it
    pub fn add_borrow(&mut self, e: &Env, amount: i128, shares: i128) {
        self.total_borrowed = checked(e, self.total_borrowed.checked_add(amount));
        self.total_borrow_shares = checked(e, self.total_borrow_shares.checked_add(shares));
    }

    /// Remove repaid underlying and the shares burnt for it
    pub fn remove_borrow(&mut self, e: &Env, amount: i128, shares: i128) {
        if amount > self.total_borrowed || shares > self.total_borrow_shares {
            panic_with_error!(e, LedgerError::InternalError);
        }
        self.total_borrowed -= amount;
        self.total_borrow_shares -= shares;
    }

    /// Write off unrecoverable debt. The loss is shared by the bank's depositors.
    pub fn write_off_borrow(&mut self, e: &Env, amount: i128, shares: i128) {
        self.remove_borrow(e, amount, shares);
        self.total_deposited -= amount;
    }

    /********** Conversion Functions **********/

    /// Convert an underlying amount to deposit shares - rounding down
    ///
    /// ### Arguments
    /// * `amount` - The amount of tokens to convert
    ///
    /// ### Panics
    /// If outstanding shares are backed by nothing
    pub fn to_deposit_shares_down(&self, e: &Env, amount: i128) -> i128 {
        if self.total_deposit_shares == 0 {
            return amount;
        }
        self.require_solvent(e);
        checked(
            e,
            amount.fixed_mul_floor(self.total_deposit_shares, self.total_deposited),
        )
    }

    /// Convert an underlying amount to deposit shares - rounding up
    ///
    /// ### Arguments
    /// * `amount` - The amount of tokens to convert
    ///
    /// ### Panics
    /// If outstanding shares are backed by nothing
    pub fn to_deposit_shares_up(&self, e: &Env, amount: i128) -> i128 {
        if self.total_deposit_shares == 0 {
            return amount;
        }
        self.require_solvent(e);
        checked(
            e,
            amount.fixed_mul_ceil(self.total_deposit_shares, self.total_deposited),
        )
    }

    /// Convert deposit shares to their underlying amount - rounding down
    ///
    /// ### Arguments
    /// * `shares` - The amount of shares to convert
    pub fn to_deposit_amount_down(&self, e: &Env, shares: i128) -> i128 {
        if self.total_deposit_shares == 0 {
            return shares;
        }
        checked(
            e,
            shares.fixed_mul_floor(self.total_deposited, self.total_deposit_shares),
        )
    }

    /// Convert an underlying amount to borrow shares - rounding up
    ///
    /// ### Arguments
    /// * `amount` - The amount of tokens to convert
    pub fn to_borrow_shares_up(&self, e: &Env, amount: i128) -> i128 {
        if self.total_borrow_shares == 0 || self.total_borrowed == 0 {
            return amount;
        }
        checked(
            e,
            amount.fixed_mul_ceil(self.total_borrow_shares, self.total_borrowed),
        )
    }

    /// Convert an underlying amount to borrow shares - rounding down
    ///
    /// ### Arguments
    /// * `amount` - The amount of tokens to convert
    pub fn to_borrow_shares_down(&self, e: &Env, amount: i128) -> i128 {
        if self.total_borrow_shares == 0 || self.total_borrowed == 0 {
            return amount;
        }
        checked(
            e,
            amount.fixed_mul_floor(self.total_borrow_shares, self.total_borrowed),
        )
    }

    /// Convert borrow shares to the underlying amount owed - rounding up
    ///
    /// ### Arguments
    /// * `shares` - The amount of shares to convert
    pub fn to_borrow_amount_up(&self, e: &Env, shares: i128) -> i128 {
        if self.total_borrow_shares == 0 {
            return shares;
        }
        checked(
            e,
            shares.fixed_mul_ceil(self.total_borrowed, self.total_borrow_shares),
        )
    }
}

/// Unwrap the result of a checked operation, or panic with `InvalidAmount` on overflow
fn checked(e: &Env, result: Option<i128>) -> i128 {
    match result {
        Some(value) => value,
        None => panic_with_error!(e, LedgerError::InvalidAmount),
    }
}
