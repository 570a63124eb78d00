pub mod assertions;
mod setup;
pub mod test_fixture;

pub use setup::{create_fixture_with_data, default_bank_config};
