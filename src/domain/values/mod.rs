pub mod credential;
pub mod data_source;
pub mod ids;
pub mod product;
