use cast::i128;
use soroban_fixed_point_math::FixedPoint;
use soroban_sdk::unwrap::UnwrapOptimized;

use crate::constants::{SCALAR_12, SCALAR_18, SCALAR_7, SECONDS_PER_YEAR};

/// Calculates the interest accrued by a bank over a period of time.
///
/// Rates compound every second, so splitting a period into several accruals only changes the
/// result by rounding. Borrowers are charged the borrow rate on the total borrowed. Depositors
/// earn the deposit rate on the total deposited, capped at the interest paid by borrowers.
///
/// The period must not exceed `max_accrual_window(borrow_rate)`.
///
/// ### Arguments
/// * `total_deposited` - The underlying amount owed to depositors
/// * `total_borrowed` - The underlying amount owed by borrowers
/// * `deposit_rate` - The annual deposit rate (7 decimals)
/// * `borrow_rate` - The annual borrow rate (7 decimals)
/// * `delta_time` - The number of seconds since the last accrual
///
/// ### Returns
/// * (i128, i128) - (interest charged to borrowers, interest earned by depositors)
pub fn calc_accrual(
    total_deposited: i128,
    total_borrowed: i128,
    deposit_rate: u32,
    borrow_rate: u32,
    delta_time: u64,
) -> (i128, i128) {
    if delta_time == 0 || total_borrowed == 0 {
        return (0, 0);
    }
    let borrow_growth = calc_growth_factor(borrow_rate, delta_time, true);
    let deposit_growth = calc_growth_factor(deposit_rate, delta_time, false);

    let borrow_interest = total_borrowed
        .fixed_mul_ceil(borrow_growth - SCALAR_12, SCALAR_12)
        .unwrap_optimized();
    let deposit_interest = total_deposited
        .fixed_mul_floor(deposit_growth - SCALAR_12, SCALAR_12)
        .unwrap_optimized();
    (borrow_interest, deposit_interest.min(borrow_interest))
}

/// Calculates `(1 + rate / SECONDS_PER_YEAR) ^ delta_time`, expressed in 12 decimals.
///
/// Every step rounds up if `round_up` is set, and down otherwise.
///
/// ### Arguments
/// * `rate` - The annual rate (7 decimals)
/// * `delta_time` - The number of seconds to compound over
pub fn calc_growth_factor(rate: u32, delta_time: u64, round_up: bool) -> i128 {
    let mul = |x: i128, y: i128, denominator: i128| {
        if round_up {
            x.fixed_mul_ceil(y, denominator).unwrap_optimized()
        } else {
            x.fixed_mul_floor(y, denominator).unwrap_optimized()
        }
    };

    let mut base = SCALAR_18 + mul(i128(rate), SCALAR_18 / SCALAR_7, SECONDS_PER_YEAR);
    let mut factor = SCALAR_18;
    let mut exp = delta_time;
    while exp > 0 {
        if exp & 1 == 1 {
            factor = mul(factor, base, SCALAR_18);
        }
        exp >>= 1;
        if exp > 0 {
            base = mul(base, base, SCALAR_18);
        }
    }
    mul(factor, SCALAR_12, SCALAR_18)
}

/// The longest period `calc_accrual` accepts for a borrow rate. Growth over the window
/// stays below e, keeping 18 decimal intermediates within an i128.
pub fn max_accrual_window(borrow_rate: u32) -> u64 {
    if borrow_rate == 0 {
        return u64::MAX;
    }
    (SECONDS_PER_YEAR * SCALAR_7 / i128(borrow_rate)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calc_accrual() {
        let (borrow_interest, deposit_interest) =
            calc_accrual(1000_0000000, 500_0000000, 0_0400000, 0_1000000, 86400);

        assert_eq!(borrow_interest, 0_1370051);
        assert_eq!(deposit_interest, 0_1095950);
    }

    #[test]
    fn test_calc_accrual_full_year() {
        // 50 * (e^0.1 - 1) and 100 * (e^0.05 - 1)
        let (borrow_interest, deposit_interest) = calc_accrual(
            100_0000000,
            50_0000000,
            0_0500000,
            0_1000000,
            SECONDS_PER_YEAR as u64,
        );

        assert_eq!(borrow_interest, 5_2585459);
        assert_eq!(deposit_interest, 5_1271096);
    }

    #[test]
    fn test_calc_accrual_deposit_capped_by_borrow() {
        let (borrow_interest, deposit_interest) = calc_accrual(
            100_0000000,
            10_0000000,
            0_0800000,
            0_1000000,
            SECONDS_PER_YEAR as u64,
        );

        assert_eq!(borrow_interest, 1_0517092);
        assert_eq!(deposit_interest, 1_0517092);
    }

    #[test]
    fn test_calc_accrual_no_borrows() {
        let (borrow_interest, deposit_interest) =
            calc_accrual(100_0000000, 0, 0_0500000, 0_1000000, 86400);

        assert_eq!(borrow_interest, 0);
        assert_eq!(deposit_interest, 0);
    }

    #[test]
    fn test_calc_accrual_no_time() {
        let (borrow_interest, deposit_interest) =
            calc_accrual(100_0000000, 50_0000000, 0_0500000, 0_1000000, 0);

        assert_eq!(borrow_interest, 0);
        assert_eq!(deposit_interest, 0);
    }

    #[test]
    fn test_calc_accrual_rounds_borrow_up() {
        let (borrow_interest, deposit_interest) = calc_accrual(10, 10, 0_0100000, 0_0100000, 1);

        assert_eq!(borrow_interest, 1);
        assert_eq!(deposit_interest, 0);
    }

    #[test]
    fn test_calc_growth_factor() {
        assert_eq!(calc_growth_factor(0_1000000, 0, true), SCALAR_12);
        assert_eq!(calc_growth_factor(0, 86400, true), SCALAR_12);

        // e^0.1
        let up = calc_growth_factor(0_1000000, SECONDS_PER_YEAR as u64, true);
        let down = calc_growth_factor(0_1000000, SECONDS_PER_YEAR as u64, false);
        assert!(up >= down);
        assert!(up - down < 100);
        assert!(down > 1_105170900000 && up < 1_105171000000);
    }

    #[test]
    fn test_calc_growth_factor_composes() {
        let whole = calc_growth_factor(0_2500000, 1_000_000, false);
        let part_a = calc_growth_factor(0_2500000, 400_000, false);
        let part_b = calc_growth_factor(0_2500000, 600_000, false);
        let composed = part_a.fixed_mul_floor(part_b, SCALAR_12).unwrap();
        assert!((whole - composed).abs() <= 2);
    }

    #[test]
    fn test_max_accrual_window() {
        assert_eq!(max_accrual_window(0), u64::MAX);
        assert_eq!(max_accrual_window(1_0000000), SECONDS_PER_YEAR as u64);
        assert_eq!(max_accrual_window(10_0000000), SECONDS_PER_YEAR as u64 / 10);

        // the largest window at the largest rate stays in range
        let growth = calc_growth_factor(10_0000000, max_accrual_window(10_0000000), true);
        assert!(growth > 2_718281000000 && growth < 2_718282000000);
    }
}
