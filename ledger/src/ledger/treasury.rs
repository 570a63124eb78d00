use sep_41_token::TokenClient;
use soroban_sdk::{Address, Env};

use crate::oracle::PriceOracle;

use super::{bank::AssetBank, ledger::Ledger};

/// Accrue interest on a bank and write it to the ledger
pub fn execute_accrue<O: PriceOracle>(e: &Env, ledger: &mut Ledger<O>, asset: &Address) -> AssetBank {
    let bank = ledger.load_bank(e, asset);
    ledger.cache_bank(bank.clone(), true);
    ledger.store_cached_banks(e);
    bank
}

/// Burn the bank's fee shares and send their value to `to`. The claim is limited
/// to the bank's available liquidity, any remainder stays as fee shares.
///
/// Returns the amount of underlying sent
pub fn execute_claim_fees<O: PriceOracle>(
    e: &Env,
    ledger: &mut Ledger<O>,
    asset: &Address,
    to: &Address,
) -> i128 {
    let mut bank = ledger.load_bank(e, asset);
    let mut amount = bank.to_deposit_amount_down(e, bank.fee_shares);
    let mut shares = bank.fee_shares;
    if amount > bank.available_liquidity() {
        amount = bank.available_liquidity();
        shares = bank.to_deposit_shares_up(e, amount).min(bank.fee_shares);
    }
    bank.remove_deposit(e, amount, shares);
    bank.fee_shares -= shares;

    ledger.cache_bank(bank, true);
    ledger.store_cached_banks(e);

    if amount > 0 {
        TokenClient::new(e, asset).transfer(&e.current_contract_address(), to, &amount);
    }
    amount
}
