pub mod directory;
pub mod plaid;
pub mod sqlite;
