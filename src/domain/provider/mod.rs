pub mod lenient;
pub mod plaid;

use crate::domain::values::product::Product;
use plaid::{
    InvestmentTransactionsResponse, InvestmentsHoldingsResponse, LiabilitiesResponse,
    TransactionsSyncResponse,
};

/// Provider-native payload of one successful product fetch.
#[derive(Debug, Clone)]
pub enum ProviderResponse {
    Transactions(TransactionsSyncResponse),
    Investments(InvestmentsResponse),
    Liabilities(LiabilitiesResponse),
}

/// Holdings plus, when that second call succeeded, the investment
/// transactions for the same credential.
#[derive(Debug, Clone, Default)]
pub struct InvestmentsResponse {
    pub holdings: InvestmentsHoldingsResponse,
    pub transactions: Option<InvestmentTransactionsResponse>,
}

impl ProviderResponse {
    pub fn product(&self) -> Product {
        match self {
            ProviderResponse::Transactions(_) => Product::Transactions,
            ProviderResponse::Investments(_) => Product::Investments,
            ProviderResponse::Liabilities(_) => Product::Liabilities,
        }
    }
}
