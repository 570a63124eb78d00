use soroban_sdk::{contracttype, panic_with_error, Address, Env, Map, Symbol};

use crate::{errors::LedgerError, storage};

/// A user's deposit and borrow shares with the ledger
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct UserPosition {
    pub owner: Address,
    pub deposits: Map<Address, i128>, // Map of bank asset to deposit share balance
    pub borrows: Map<Address, i128>,  // Map of bank asset to borrow share balance
    pub last_time: u64,               // the last time the position was updated
}

impl UserPosition {
    /// Create an empty position for `owner`
    pub fn new(e: &Env, owner: &Address) -> Self {
        UserPosition {
            owner: owner.clone(),
            deposits: Map::new(e),
            borrows: Map::new(e),
            last_time: e.ledger().timestamp(),
        }
    }

    /// Load the position for `owner` from the ledger
    ///
    /// ### Panics
    /// If the position has not been initialized
    pub fn load(e: &Env, owner: &Address) -> Self {
        match storage::get_position(e, owner) {
            Some(position) => position,
            None => panic_with_error!(e, LedgerError::AccountNotFound),
        }
    }

    /// Store the position to the ledger, marking it as updated now
    pub fn store(&mut self, e: &Env) {
        self.last_time = e.ledger().timestamp();
        storage::set_position(e, &self.owner, self);
    }

    /// Get the deposit shares held for an asset
    pub fn deposit_shares(&self, asset: &Address) -> i128 {
        self.deposits.get(asset.clone()).unwrap_or(0)
    }

    /// Get the borrow shares owed for an asset
    pub fn borrow_shares(&self, asset: &Address) -> i128 {
        self.borrows.get(asset.clone()).unwrap_or(0)
    }

    pub fn has_deposits(&self) -> bool {
        !self.deposits.is_empty()
    }

    pub fn has_borrows(&self) -> bool {
        !self.borrows.is_empty()
    }

    /// Add deposit shares for an asset
    pub fn add_deposit(&mut self, asset: &Address, shares: i128) {
        let balance = self.deposit_shares(asset);
        self.deposits.set(asset.clone(), balance + shares);
    }

    /// Remove deposit shares for an asset
    ///
    /// ### Panics
    /// If the position holds fewer shares than `shares`
    pub fn remove_deposit(&mut self, e: &Env, asset: &Address, shares: i128) {
        let new_balance = self.deposit_shares(asset) - shares;
        if new_balance < 0 {
            panic_with_error!(e, LedgerError::InsufficientBalance);
        }
        if new_balance == 0 {
            self.deposits.remove(asset.clone());
        } else {
            self.deposits.set(asset.clone(), new_balance);
        }
    }

    /// Add borrow shares for an asset
    pub fn add_borrow(&mut self, asset: &Address, shares: i128) {
        let balance = self.borrow_shares(asset);
        self.borrows.set(asset.clone(), balance + shares);
    }

    /// Remove borrow shares for an asset
    ///
    /// ### Panics
    /// If the position owes fewer shares than `shares`
    pub fn remove_borrow(&mut self, e: &Env, asset: &Address, shares: i128) {
        let new_balance = self.borrow_shares(asset) - shares;
        if new_balance < 0 {
            panic_with_error!(e, LedgerError::OverRepayment);
        }
        if new_balance == 0 {
            self.borrows.remove(asset.clone());
        } else {
            self.borrows.set(asset.clone(), new_balance);
        }
    }
}

/// Initialize an empty position for a user
///
/// ### Panics
/// If the user already has a position
pub fn execute_init_user(e: &Env, user: &Address) -> UserPosition {
    if storage::has_position(e, user) {
        panic_with_error!(e, LedgerError::AlreadyInitialized);
    }
    let mut position = UserPosition::new(e, user);
    position.store(e);

    e.events()
        .publish((Symbol::new(e, "init_user"), user.clone()), ());
    position
}
