use soroban_sdk::{panic_with_error, Env};

use crate::errors::LedgerError;

/// Require that an incoming amount is positive
///
/// ### Arguments
/// * `amount` - The amount to check
///
/// ### Panics
/// If the amount is zero or negative
pub fn require_positive(e: &Env, amount: i128) {
    if amount <= 0 {
        panic_with_error!(e, LedgerError::InvalidAmount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils;

    #[test]
    fn test_require_positive() {
        let e = Env::default();
        let ledger = testutils::create_ledger(&e);
        e.as_contract(&ledger, || {
            require_positive(&e, 1);
            require_positive(&e, i128::MAX);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #8)")]
    fn test_require_positive_zero() {
        let e = Env::default();
        let ledger = testutils::create_ledger(&e);
        e.as_contract(&ledger, || {
            require_positive(&e, 0);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #8)")]
    fn test_require_positive_negative() {
        let e = Env::default();
        let ledger = testutils::create_ledger(&e);
        e.as_contract(&ledger, || {
            require_positive(&e, -1);
        });
    }
}
