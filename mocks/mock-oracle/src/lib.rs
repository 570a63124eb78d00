#![no_std]

#[cfg(any(test, feature = "testutils"))]
extern crate std;

mod mock_oracle;

pub use crate::mock_oracle::{MockOracleError, MockPriceOracle, MockPriceOracleClient};
