use std::ops::Index;

use lending_ledger::{AssetBank, BankConfig, LendingLedgerClient, LendingLedgerContract};
use mock_oracle::{MockPriceOracle, MockPriceOracleClient};
use sep_40_oracle::Asset;
use sep_41_token::testutils::{MockTokenClient, MockTokenWASM};
use soroban_sdk::testutils::{Address as _, Ledger, LedgerInfo};
use soroban_sdk::{Address, Env, IntoVal, Symbol};

pub const SCALAR_7: i128 = 1_0000000;

/// The minimum health ratio of the fixture's ledger
pub const MIN_HEALTH: u32 = 1_5000000;
/// The maximum age of an oracle price accepted by the fixture's ledger
pub const MAX_PRICE_AGE: u64 = 60 * 60;

#[derive(Clone, Copy, Debug)]
pub enum TokenIndex {
    USDC = 0,
    SOL = 1,
    XLM = 2,
}

impl<T> Index<TokenIndex> for Vec<T> {
    type Output = T;

    fn index(&self, index: TokenIndex) -> &Self::Output {
        &self[index as usize]
    }
}

pub struct TestFixture<'a> {
    pub env: Env,
    pub bombadil: Address,
    pub users: Vec<Address>,
    pub ledger: LendingLedgerClient<'a>,
    pub oracle: MockPriceOracleClient<'a>,
    pub tokens: Vec<MockTokenClient<'a>>,
}

impl TestFixture<'_> {
    /// Create a new TestFixture for the lending ledger
    ///
    /// Deploys USDC (0), SOL (1), and XLM (2) test tokens with 7, 9, and 7 decimals, a mock
    /// oracle reporting prices with 7 decimals, and an initialized ledger. No banks are created.
    pub fn create<'a>() -> TestFixture<'a> {
        let e = Env::default();
        e.mock_all_auths();
        e.budget().reset_unlimited();

        let bombadil = Address::generate(&e);

        e.ledger().set(LedgerInfo {
            timestamp: 1_700_000_000,
            protocol_version: 20,
            sequence_number: 100,
            network_id: Default::default(),
            base_reserve: 10,
            min_temp_entry_ttl: 10,
            min_persistent_entry_ttl: 10,
            max_entry_ttl: 3110400,
        });

        // deploy tokens
        let usdc_client = create_token(&e, &bombadil, 7, "USDC");
        let sol_client = create_token(&e, &bombadil, 9, "SOL");
        let xlm_client = create_token(&e, &bombadil, 7, "XLM");

        // deploy oracle
        let oracle_id = e.register_contract(None, MockPriceOracle {});
        let oracle_client = MockPriceOracleClient::new(&e, &oracle_id);
        oracle_client.set_data(&Asset::Other(Symbol::new(&e, "USD")), &7);
        oracle_client.set_price_stable(&Asset::Stellar(usdc_client.address.clone()), &1_0000000);
        oracle_client.set_price_stable(&Asset::Stellar(sol_client.address.clone()), &100_0000000);
        oracle_client.set_price_stable(&Asset::Stellar(xlm_client.address.clone()), &0_1000000);

        // deploy ledger
        let ledger_id = e.register_contract(None, LendingLedgerContract {});
        let ledger_client = LendingLedgerClient::new(&e, &ledger_id);
        ledger_client.initialize(&bombadil, &oracle_id, &MIN_HEALTH, &MAX_PRICE_AGE);

        TestFixture {
            env: e,
            bombadil,
            users: vec![],
            ledger: ledger_client,
            oracle: oracle_client,
            tokens: vec![usdc_client, sol_client, xlm_client],
        }
    }

    /// Create a bank for a token and return its index
    pub fn create_bank(&self, token_index: TokenIndex, config: &BankConfig) -> u32 {
        let token = &self.tokens[token_index];
        self.ledger
            .init_bank(&self.bombadil, &token.address, config)
    }

    /// Create a user with an initialized position and `balances` of each token
    pub fn create_user(&mut self, balances: &[(TokenIndex, i128)]) -> Address {
        let user = Address::generate(&self.env);
        self.ledger.init_user(&user);
        for (token_index, amount) in balances {
            self.tokens[*token_index].mint(&user, amount);
        }
        self.users.push(user.clone());
        user
    }

    /// Scale a whole number of tokens by the token's decimals
    pub fn amount(&self, token_index: TokenIndex, tokens: i128) -> i128 {
        tokens * 10i128.pow(self.tokens[token_index].decimals())
    }

    /********** Oracle Helpers ***********/

    /// Report a new price for a token at the current time
    pub fn set_price(&self, token_index: TokenIndex, price: i128) {
        let asset = Asset::Stellar(self.tokens[token_index].address.clone());
        self.oracle.set_price_stable(&asset, &price);
    }

    /// Fetch the last reported price for a token
    pub fn read_price(&self, token_index: TokenIndex) -> i128 {
        let asset = Asset::Stellar(self.tokens[token_index].address.clone());
        self.oracle.lastprice(&asset).unwrap().price
    }

    /********** Ledger Helpers ***********/

    pub fn read_bank(&self, token_index: TokenIndex) -> AssetBank {
        self.ledger.get_bank(&self.tokens[token_index].address)
    }

    /// Fetch the deposit shares a user holds in a token's bank
    pub fn read_deposit_shares(&self, user: &Address, token_index: TokenIndex) -> i128 {
        let position = self.ledger.get_position(user);
        position
            .deposits
            .get(self.tokens[token_index].address.clone())
            .unwrap_or(0)
    }

    /// Fetch the borrow shares a user holds in a token's bank
    pub fn read_borrow_shares(&self, user: &Address, token_index: TokenIndex) -> i128 {
        let position = self.ledger.get_position(user);
        position
            .borrows
            .get(self.tokens[token_index].address.clone())
            .unwrap_or(0)
    }

    /********** Chain Helpers ***********/

    /// Move time forward and have the oracle report its current prices again
    pub fn jump(&self, time: u64) {
        self.jump_no_prices(time);
        for token in self.tokens.iter() {
            let asset = Asset::Stellar(token.address.clone());
            if let Some(price_data) = self.oracle.lastprice(&asset) {
                self.oracle.set_price_stable(&asset, &price_data.price);
            }
        }
    }

    /// Move time forward without any new oracle reports
    pub fn jump_no_prices(&self, time: u64) {
        let blocks = time / 5;
        self.env.ledger().set(LedgerInfo {
            timestamp: self.env.ledger().timestamp().saturating_add(time),
            protocol_version: 20,
            sequence_number: self.env.ledger().sequence().saturating_add(blocks as u32),
            network_id: Default::default(),
            base_reserve: 10,
            min_temp_entry_ttl: 10,
            min_persistent_entry_ttl: 10,
            max_entry_ttl: 3110400,
        });
    }
}

fn create_token<'a>(e: &Env, admin: &Address, decimals: u32, symbol: &str) -> MockTokenClient<'a> {
    let contract_id = Address::generate(e);
    e.register_contract_wasm(&contract_id, MockTokenWASM);
    let client = MockTokenClient::new(e, &contract_id);
    client.initialize(
        admin,
        &decimals,
        &"test token".into_val(e),
        &symbol.into_val(e),
    );
    client
}
