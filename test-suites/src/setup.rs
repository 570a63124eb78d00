use lending_ledger::BankConfig;

use crate::test_fixture::{TestFixture, TokenIndex};

/// Create a bank config for a token with `decimals`
///
/// Rates are 4% for deposits and 10% for borrows, with an 80% liquidation threshold,
/// a 5% liquidation bonus and a 50% close factor.
pub fn default_bank_config(decimals: u32) -> BankConfig {
    BankConfig {
        index: 0,
        decimals,
        deposit_rate: 0_0400000,
        borrow_rate: 0_1000000,
        liquidation_threshold: 0_8000000,
        liquidation_bonus: 0_0500000,
        close_factor: 0_5000000,
    }
}

/// Create a test fixture with USDC and SOL banks
///
/// Frodo (users[0]) deposits 100k USDC and 1k SOL to provide liquidity.
pub fn create_fixture_with_data<'a>() -> TestFixture<'a> {
    let mut fixture = TestFixture::create();

    fixture.create_bank(TokenIndex::USDC, &default_bank_config(7));
    let mut sol_config = default_bank_config(9);
    sol_config.deposit_rate = 0_0300000;
    sol_config.borrow_rate = 0_0800000;
    sol_config.liquidation_threshold = 0_7500000;
    sol_config.liquidation_bonus = 0_1000000;
    fixture.create_bank(TokenIndex::SOL, &sol_config);

    let usdc_amount = fixture.amount(TokenIndex::USDC, 100_000);
    let sol_amount = fixture.amount(TokenIndex::SOL, 1_000);
    let frodo = fixture.create_user(&[
        (TokenIndex::USDC, usdc_amount),
        (TokenIndex::SOL, sol_amount),
    ]);
    let usdc = fixture.tokens[TokenIndex::USDC].address.clone();
    let sol = fixture.tokens[TokenIndex::SOL].address.clone();
    fixture.ledger.deposit(&frodo, &usdc, &usdc_amount);
    fixture.ledger.deposit(&frodo, &sol, &sol_amount);

    fixture
}
