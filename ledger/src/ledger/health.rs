use cast::i128;
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::{contracttype, log, panic_with_error, unwrap::UnwrapOptimized, Env};

use crate::{constants::SCALAR_7, errors::LedgerError, oracle::PriceOracle};

use super::{ledger::Ledger, position::UserPosition};

/// The valuation of a position, reported by `get_health`
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct HealthData {
    pub collateral: i128, // the deposit value in the base asset (7 decimals)
    pub debt: i128,       // the borrow value in the base asset (7 decimals)
    pub ratio: i128,      // collateral / debt expressed in 7 decimals, i128::MAX if there is no debt
}

pub struct PositionData {
    /// The deposit value denominated in the base asset
    pub collateral_base: i128,
    /// The deposit value weighted by each bank's liquidation threshold
    pub threshold_base: i128,
    /// The borrow value denominated in the base asset
    pub debt_base: i128,
}

impl PositionData {
    /// Value a position with the ledger's banks and prices
    ///
    /// ### Arguments
    /// * ledger - The ledger
    /// * position - The position to value
    pub fn calculate_from_position<O: PriceOracle>(
        e: &Env,
        ledger: &mut Ledger<O>,
        position: &UserPosition,
    ) -> Self {
        let mut collateral_base = 0;
        let mut threshold_base = 0;
        let mut debt_base = 0;
        for (asset, shares) in position.deposits.iter() {
            let bank = ledger.load_bank(e, &asset);
            let amount = bank.to_deposit_amount_down(e, shares);
            let value = ledger.to_base_floor(e, &bank, amount);
            collateral_base += value;
            threshold_base += value
                .fixed_mul_floor(i128(bank.liquidation_threshold), SCALAR_7)
                .unwrap_optimized();
            ledger.cache_bank(bank, false);
        }
        for (asset, shares) in position.borrows.iter() {
            let bank = ledger.load_bank(e, &asset);
            let amount = bank.to_borrow_amount_up(e, shares);
            debt_base += ledger.to_base_ceil(e, &bank, amount);
            ledger.cache_bank(bank, false);
        }

        PositionData {
            collateral_base,
            threshold_base,
            debt_base,
        }
    }

    /// Return the health ratio, expressed in 7 decimals. Positions without debt return i128::MAX.
    pub fn as_health_ratio(&self) -> i128 {
        if self.debt_base == 0 {
            return i128::MAX;
        }
        self.collateral_base
            .fixed_div_floor(self.debt_base, SCALAR_7)
            .unwrap_optimized()
    }

    pub fn as_health_data(&self) -> HealthData {
        HealthData {
            collateral: self.collateral_base,
            debt: self.debt_base,
            ratio: self.as_health_ratio(),
        }
    }

    /// Check if the position meets the minimum health ratio, panic if not. A position
    /// exactly at the minimum is healthy.
    ///
    /// ### Arguments
    /// * min_health - The minimum health ratio (7 decimals)
    pub fn require_healthy(&self, e: &Env, min_health: u32) {
        if self.debt_base == 0 {
            return;
        }

        let required_collateral = self
            .debt_base
            .fixed_mul_ceil(i128(min_health), SCALAR_7)
            .unwrap_optimized();
        if self.collateral_base < required_collateral {
            log!(
                e,
                "undercollateralized action",
                self.as_health_ratio(),
                min_health
            );
            panic_with_error!(e, LedgerError::UndercollateralizedAction);
        }
    }

    /// Check if the threshold weighted collateral has fallen below the debt
    pub fn is_liquidatable(&self) -> bool {
        self.debt_base > 0 && self.threshold_base < self.debt_base
    }
}
