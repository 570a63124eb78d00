/// Fixed point scalar for 7 decimal values (rates, factors and ratios)
pub const SCALAR_7: i128 = 1_0000000;

/// Fixed point scalar for interest growth factors
pub(crate) const SCALAR_12: i128 = 1_000_000_000_000;

/// Fixed point scalar for per second growth
pub(crate) const SCALAR_18: i128 = 1_000_000_000_000_000_000;

pub const SECONDS_PER_YEAR: i128 = 31536000;

/// The maximum annual borrow rate a bank can be configured with (1000%)
pub(crate) const MAX_BANK_RATE: u32 = 10_0000000;

/// The maximum number of banks the ledger supports
pub(crate) const MAX_BANKS: u32 = 32;
