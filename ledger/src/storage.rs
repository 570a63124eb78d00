use soroban_sdk::{
    contracttype, panic_with_error, unwrap::UnwrapOptimized, vec, Address, Env, IntoVal, Symbol,
    TryFromVal, Val, Vec,
};

use crate::{constants::MAX_BANKS, errors::LedgerError, ledger::UserPosition};

pub(crate) const LEDGER_THRESHOLD_SHARED: u32 = 172800; // ~ 10 days
pub(crate) const LEDGER_BUMP_SHARED: u32 = 241920; // ~ 14 days

pub(crate) const LEDGER_THRESHOLD_USER: u32 = 518400; // ~ 30 days
pub(crate) const LEDGER_BUMP_USER: u32 = 535670; // ~ 31 days

/********** Storage Types **********/

/// The ledger's config
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct LedgerConfig {
    pub oracle: Address,     // the SEP-40 price feed used to value positions
    pub min_health: u32,     // the minimum health ratio for borrows and withdrawals, expressed in 7 decimals
    pub max_price_age: u64,  // the maximum age of an oracle price in seconds
}

/// The configuration information about an asset bank
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct BankConfig {
    pub index: u32,                 // the index of the bank in the list
    pub decimals: u32,              // the decimals of the underlying token
    pub deposit_rate: u32,          // the annual deposit interest rate expressed in 7 decimals
    pub borrow_rate: u32,           // the annual borrow interest rate expressed in 7 decimals
    pub liquidation_threshold: u32, // the share of collateral value counted before liquidation, expressed in 7 decimals
    pub liquidation_bonus: u32,     // the bonus paid to liquidators on seized collateral, expressed in 7 decimals
    pub close_factor: u32,          // the maximum share of a debt repaid by one liquidation, expressed in 7 decimals
}

/// The accounting data for an asset bank
#[derive(Clone, Debug, Eq, PartialEq)]
#[contracttype]
pub struct BankData {
    pub total_deposit_shares: i128, // the total supply of deposit shares
    pub total_borrow_shares: i128,  // the total supply of borrow shares
    pub total_deposited: i128,      // the underlying amount owed to deposit share holders
    pub total_borrowed: i128,       // the underlying amount owed by borrow share holders
    pub fee_shares: i128,           // the deposit shares owned by the protocol
    pub last_time: u64,             // the last time interest was accrued
}

/********** Storage Key Types **********/

const ADMIN_KEY: &str = "Admin";
const CONFIG_KEY: &str = "Config";
const BANK_LIST_KEY: &str = "BankList";

#[derive(Clone)]
#[contracttype]
pub enum LedgerDataKey {
    // A map of underlying asset's contract address to bank config
    BankConfig(Address),
    // A map of underlying asset's contract address to bank data
    BankData(Address),
    // The position of a user
    Position(Address),
}

/********** Storage **********/

/// Bump the instance rent for the contract
pub fn extend_instance(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/// Fetch an entry in persistent storage that has a default value if it doesn't exist
fn get_persistent_default<K: IntoVal<Env, Val>, V: TryFromVal<Env, Val>>(
    e: &Env,
    key: &K,
    default: V,
    bump_threshold: u32,
    bump_amount: u32,
) -> V {
    if let Some(result) = e.storage().persistent().get::<K, V>(key) {
        e.storage()
            .persistent()
            .extend_ttl(key, bump_threshold, bump_amount);
        result
    } else {
        default
    }
}

/********** Admin **********/

/// Fetch the current admin Address
///
/// ### Panics
/// If the admin does not exist
pub fn get_admin(e: &Env) -> Address {
    e.storage()
        .instance()
        .get(&Symbol::new(e, ADMIN_KEY))
        .unwrap_optimized()
}

/// Set a new admin
///
/// ### Arguments
/// * `new_admin` - The Address for the admin
pub fn set_admin(e: &Env, new_admin: &Address) {
    e.storage()
        .instance()
        .set::<Symbol, Address>(&Symbol::new(e, ADMIN_KEY), new_admin);
}

/// Checks if an admin is set
pub fn has_admin(e: &Env) -> bool {
    e.storage().instance().has(&Symbol::new(e, ADMIN_KEY))
}

/********** Ledger Config **********/

/// Fetch the ledger configuration
///
/// ### Panics
/// If the ledger's config is not set
pub fn get_config(e: &Env) -> LedgerConfig {
    e.storage()
        .instance()
        .get(&Symbol::new(e, CONFIG_KEY))
        .unwrap_optimized()
}

/// Set the ledger configuration
///
/// ### Arguments
/// * `config` - The ledger configuration
pub fn set_config(e: &Env, config: &LedgerConfig) {
    e.storage()
        .instance()
        .set::<Symbol, LedgerConfig>(&Symbol::new(e, CONFIG_KEY), config);
}

/********** User Positions **********/

/// Checks if a user has an initialized position
///
/// ### Arguments
/// * `user` - The address of the user
pub fn has_position(e: &Env, user: &Address) -> bool {
    let key = LedgerDataKey::Position(user.clone());
    e.storage().persistent().has(&key)
}

/// Fetch the user's position, if it exists
///
/// ### Arguments
/// * `user` - The address of the user
pub fn get_position(e: &Env, user: &Address) -> Option<UserPosition> {
    let key = LedgerDataKey::Position(user.clone());
    let position = e
        .storage()
        .persistent()
        .get::<LedgerDataKey, UserPosition>(&key);
    if position.is_some() {
        e.storage()
            .persistent()
            .extend_ttl(&key, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER);
    }
    position
}

/// Set the user's position
///
/// ### Arguments
/// * `user` - The address of the user
/// * `position` - The new position for the user
pub fn set_position(e: &Env, user: &Address, position: &UserPosition) {
    let key = LedgerDataKey::Position(user.clone());
    e.storage()
        .persistent()
        .set::<LedgerDataKey, UserPosition>(&key, position);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER);
}

/********** Bank Config **********/

/// Checks if a bank exists for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
pub fn has_bank(e: &Env, asset: &Address) -> bool {
    let key = LedgerDataKey::BankConfig(asset.clone());
    e.storage().persistent().has(&key)
}

/// Fetch the bank configuration for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
///
/// ### Panics
/// If the bank does not exist
pub fn get_bank_config(e: &Env, asset: &Address) -> BankConfig {
    let key = LedgerDataKey::BankConfig(asset.clone());
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    e.storage()
        .persistent()
        .get::<LedgerDataKey, BankConfig>(&key)
        .unwrap_optimized()
}

/// Set the bank configuration for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
/// * `config` - The bank configuration for the asset
pub fn set_bank_config(e: &Env, asset: &Address, config: &BankConfig) {
    let key = LedgerDataKey::BankConfig(asset.clone());
    e.storage()
        .persistent()
        .set::<LedgerDataKey, BankConfig>(&key, config);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Bank Data **********/

/// Fetch the bank data for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
///
/// ### Panics
/// If the bank does not exist
pub fn get_bank_data(e: &Env, asset: &Address) -> BankData {
    let key = LedgerDataKey::BankData(asset.clone());
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    e.storage()
        .persistent()
        .get::<LedgerDataKey, BankData>(&key)
        .unwrap_optimized()
}

/// Set the bank data for an asset
///
/// ### Arguments
/// * `asset` - The contract address of the asset
/// * `data` - The bank data for the asset
pub fn set_bank_data(e: &Env, asset: &Address, data: &BankData) {
    let key = LedgerDataKey::BankData(asset.clone());
    e.storage()
        .persistent()
        .set::<LedgerDataKey, BankData>(&key, data);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Bank List **********/

/// Fetch the list of bank assets
pub fn get_bank_list(e: &Env) -> Vec<Address> {
    get_persistent_default(
        e,
        &Symbol::new(e, BANK_LIST_KEY),
        vec![e],
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    )
}

/// Add a bank to the back of the list and returns the index
///
/// ### Arguments
/// * `asset` - The contract address of the underlying asset
///
/// ### Panics
/// If the number of banks in the list exceeds the maximum
pub fn push_bank_list(e: &Env, asset: &Address) -> u32 {
    let mut bank_list = get_bank_list(e);
    if bank_list.len() >= MAX_BANKS {
        panic_with_error!(e, LedgerError::InvalidBankConfig)
    }
    bank_list.push_back(asset.clone());
    let new_index = bank_list.len() - 1;
    e.storage()
        .persistent()
        .set::<Symbol, Vec<Address>>(&Symbol::new(e, BANK_LIST_KEY), &bank_list);
    e.storage().persistent().extend_ttl(
        &Symbol::new(e, BANK_LIST_KEY),
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    );
    new_index
}
