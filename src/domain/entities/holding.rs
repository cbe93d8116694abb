use crate::domain::values::data_source::DataSource;
use crate::domain::values::ids::{AssetId, HoldingId, TransactionId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A position in one security held in one investment account.
///
/// Attached to its account through `account_id`; its `transactions` are
/// grouped by `security_id`, not by account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentHolding {
    pub id: HoldingId,
    pub account_id: AssetId,
    pub security_id: String,
    pub ticker: Option<String>,
    pub name: Option<String>,
    /// Security type as reported by the provider (equity, etf, mutual fund...).
    pub security_type: Option<String>,
    pub units: Option<f64>,
    pub unit_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub acquisition_value: Option<Decimal>,
    pub currency: Option<String>,
    pub valuation_date: Option<NaiveDate>,
    pub data_source: DataSource,
    pub transactions: Vec<InvestmentTransaction>,
}

/// A buy, sell, dividend, fee... on one security.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentTransaction {
    pub id: TransactionId,
    pub account_id: AssetId,
    pub security_id: String,
    pub date: Option<NaiveDate>,
    pub amount: Decimal,
    pub price: Option<Decimal>,
    pub fees: Decimal,
    pub units: Option<f64>,
    pub currency: String,
    pub description: Option<String>,
    pub transaction_type: Option<String>,
    pub subtype: Option<String>,
}
