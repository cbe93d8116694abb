pub mod integration_directory;
pub mod integration_store;
pub mod source_fetcher;
