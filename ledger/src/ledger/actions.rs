use soroban_sdk::contracttype;

use super::{bank::AssetBank, position::UserPosition};

/// The confirmation of a deposit, withdraw, borrow or repay
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Receipt {
    pub amount: i128, // the underlying amount moved
    pub shares: i128, // the shares minted or burnt
    pub position: UserPosition,
    pub bank: AssetBank,
}

/// The result of a liquidation
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct Liquidation {
    pub repaid: i128,          // the debt asset amount paid by the liquidator
    pub repaid_shares: i128,   // the borrow shares burnt from the user
    pub seized: i128,          // the collateral asset amount moved to the liquidator
    pub seized_shares: i128,   // the deposit shares moved to the liquidator
    pub bad_debt: i128,        // the base value of debt written off, zero if none
}
