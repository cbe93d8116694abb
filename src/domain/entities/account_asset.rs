use crate::domain::entities::holding::InvestmentHolding;
use crate::domain::entities::liability::Liability;
use crate::domain::entities::transaction::Transaction;
use crate::domain::values::data_source::DataSource;
use crate::domain::values::ids::AssetId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Unified view of one account across every linked source and product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountAsset {
    pub id: AssetId,
    pub name: Option<String>,
    /// Masked account number as shown by the institution.
    pub account_number: Option<String>,
    pub asset_class: Option<String>,
    pub asset_subclass: Option<String>,
    pub currency: Option<String>,
    pub balance: Option<Decimal>,
    pub financial_institution: Option<String>,
    pub data_source: DataSource,
    pub transactions: Vec<Transaction>,
    pub holdings: Vec<InvestmentHolding>,
    pub liabilities: Vec<Liability>,
}

/// One account as seen by a single product fetch from a single integration.
/// Only the collection matching the fetched product is populated.
pub type AccountFragment = AccountAsset;

impl AccountAsset {
    pub fn new(id: AssetId) -> Self {
        Self {
            id,
            name: None,
            account_number: None,
            asset_class: None,
            asset_subclass: None,
            currency: None,
            balance: None,
            financial_institution: None,
            data_source: DataSource::default(),
            transactions: Vec::new(),
            holdings: Vec::new(),
            liabilities: Vec::new(),
        }
    }

    pub fn investment_transaction_count(&self) -> usize {
        self.holdings.iter().map(|h| h.transactions.len()).sum()
    }
}
