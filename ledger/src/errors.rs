use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
/// Error codes for the lending ledger contract. Common errors are codes that match up with the
/// built-in contracts error reporting. Ledger specific errors start at 1200.
pub enum LedgerError {
    // Common Errors
    InternalError = 1,
    AlreadyInitialized = 3,

    Unauthorized = 4,

    InvalidAmount = 8,
    InsufficientBalance = 10,

    // Ledger Setup Errors (start at 1200)
    AccountNotFound = 1200,
    InvalidLedgerInitArgs = 1201,
    InvalidBankConfig = 1202,

    // Ledger State Errors
    InsufficientLiquidity = 1203,
    UndercollateralizedAction = 1204,
    OverRepayment = 1205,
    InsolventBank = 1209,

    // Oracle Errors
    StalePrice = 1206,
    UnknownAsset = 1207,

    // Liquidation Errors
    NotLiquidatable = 1208,
}
