pub mod entities;
pub mod error;
pub mod ports;
pub mod provider;
pub mod values;
