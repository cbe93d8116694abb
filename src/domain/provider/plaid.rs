//! Wire shapes of the Plaid-style aggregation API.
//!
//! Every field is optional and every list defaults to empty. Fields of the
//! wrong type, `null` objects and unreadable list entries decode as absent, so
//! one bad value costs that value and not the whole payload. Dates stay
//! strings and are parsed leniently during normalization.

use super::lenient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AccountBase {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub official_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub mask: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", rename = "type")]
    pub account_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub subtype: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub balances: Balances,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Balances {
    #[serde(default, deserialize_with = "lenient::number")]
    pub available: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub current: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub iso_currency_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub unofficial_currency_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Item {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub item_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub institution_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub institution_name: Option<String>,
}

// ── transactions/sync ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransactionsSyncResponse {
    #[serde(default, deserialize_with = "lenient::list")]
    pub accounts: Vec<AccountBase>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub added: Vec<PlaidTransaction>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub modified: Vec<PlaidTransaction>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub removed: Vec<RemovedTransaction>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub next_cursor: Option<String>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub has_more: bool,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub item: Option<Item>,
}

impl TransactionsSyncResponse {
    /// Folds a follow-up page into this one. Account balances come from the
    /// latest page.
    pub fn absorb_page(&mut self, page: TransactionsSyncResponse) {
        if !page.accounts.is_empty() {
            self.accounts = page.accounts;
        }
        self.added.extend(page.added);
        self.modified.extend(page.modified);
        self.removed.extend(page.removed);
        self.next_cursor = page.next_cursor;
        self.has_more = page.has_more;
        if page.item.is_some() {
            self.item = page.item;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaidTransaction {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub iso_currency_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub unofficial_currency_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub merchant_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub transaction_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub personal_finance_category: Option<PersonalFinanceCategory>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub counterparties: Vec<Counterparty>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PersonalFinanceCategory {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub primary: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub detailed: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Counterparty {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RemovedTransaction {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub transaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub account_id: Option<String>,
}

// ── investments/holdings/get + investments/transactions/get ────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvestmentsHoldingsResponse {
    #[serde(default, deserialize_with = "lenient::list")]
    pub accounts: Vec<AccountBase>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub holdings: Vec<Holding>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub securities: Vec<Security>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Holding {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub security_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub institution_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub institution_price_as_of: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub institution_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub cost_basis: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub iso_currency_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub unofficial_currency_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Security {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub security_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub ticker_symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", rename = "type")]
    pub security_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InvestmentTransactionsResponse {
    #[serde(default, deserialize_with = "lenient::list")]
    pub accounts: Vec<AccountBase>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub investment_transactions: Vec<PlaidInvestmentTransaction>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub securities: Vec<Security>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub total_investment_transactions: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlaidInvestmentTransaction {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub investment_transaction_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub security_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub fees: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub iso_currency_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt", rename = "type")]
    pub transaction_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub subtype: Option<String>,
}

// ── liabilities/get ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LiabilitiesResponse {
    #[serde(default, deserialize_with = "lenient::list")]
    pub accounts: Vec<AccountBase>,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub liabilities: LiabilitiesObject,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LiabilitiesObject {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub credit: Option<Vec<CreditCardLiability>>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub mortgage: Option<Vec<MortgageLiability>>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub student: Option<Vec<StudentLoan>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreditCardLiability {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub aprs: Vec<Apr>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub is_overdue: Option<bool>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub last_payment_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub last_payment_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub last_statement_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub last_statement_issue_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub minimum_payment_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub next_payment_due_date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Apr {
    #[serde(default, deserialize_with = "lenient::number")]
    pub apr_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub apr_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MortgageLiability {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub interest_rate: Option<InterestRate>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub last_payment_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub last_payment_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub next_payment_due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub maturity_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub origination_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub origination_principal_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ytd_interest_paid: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ytd_principal_paid: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub loan_term: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub property_address: Option<PropertyAddress>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InterestRate {
    #[serde(default, deserialize_with = "lenient::number")]
    pub percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt", rename = "type")]
    pub rate_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PropertyAddress {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub postal_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StudentLoan {
    #[serde(default, deserialize_with = "lenient::opt")]
    pub account_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub loan_name: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub interest_rate_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub last_payment_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub last_payment_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub next_payment_due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub origination_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub origination_principal_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub outstanding_interest_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ytd_interest_paid: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ytd_principal_paid: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub loan_status: Option<LoanStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoanStatus {
    #[serde(default, deserialize_with = "lenient::opt", rename = "type")]
    pub status_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt")]
    pub end_date: Option<String>,
}
