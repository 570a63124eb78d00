#![no_std]

#[cfg(any(test, feature = "testutils"))]
extern crate std;

mod constants;
mod contract;
mod errors;
mod ledger;
mod oracle;
mod storage;
mod validator;

pub mod testutils;

pub use constants::{SCALAR_7, SECONDS_PER_YEAR};
pub use contract::{LendingLedger, LendingLedgerClient, LendingLedgerContract};
pub use errors::LedgerError;
pub use ledger::{AssetBank, HealthData, Liquidation, Receipt, UserPosition};
pub use oracle::{OraclePrice, PriceOracle, Sep40Oracle};
pub use storage::{BankConfig, BankData, LedgerConfig};
