pub mod account_asset;
pub mod holding;
pub mod integration;
pub mod liability;
pub mod transaction;
