mod actions;
pub use actions::{Liquidation, Receipt};

mod bank;
pub use bank::AssetBank;

mod borrow;
pub use borrow::execute_borrow;

mod config;
pub use config::{execute_init_bank, execute_initialize};

mod deposit;
pub use deposit::execute_deposit;

mod health;
pub use health::{HealthData, PositionData};

mod interest;

#[allow(clippy::module_inception)]
mod ledger;
pub use ledger::Ledger;

mod liquidate;
pub use liquidate::execute_liquidate;

mod position;
pub use position::{execute_init_user, UserPosition};

mod repay;
pub use repay::execute_repay;

mod treasury;
pub use treasury::{execute_accrue, execute_claim_fees};

mod withdraw;
pub use withdraw::execute_withdraw;
