use crate::domain::values::data_source::DataSource;
use crate::domain::values::ids::{AssetId, TransactionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cash transaction on an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// Owning account.
    pub asset_id: AssetId,
    pub date: Option<NaiveDate>,
    pub amount: Decimal,
    pub currency: String,
    pub category: Option<String>,
    pub transaction_type: Option<String>,
    pub description: Option<String>,
    /// Sender or recipient, when the provider identifies one.
    pub counterparty: Option<String>,
    pub external_id: String,
    pub data_source: DataSource,
}
