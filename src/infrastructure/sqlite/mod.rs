pub mod integration_repo;
pub mod migrations;
