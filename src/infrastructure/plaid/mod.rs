//! Plaid-shaped provider adapters.

pub mod client;
pub mod fetchers;
