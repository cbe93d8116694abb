use crate::domain::values::data_source::DataSource;
use crate::domain::values::ids::{AssetId, LiabilityId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A debt owed on an account. Fields common to every kind live here; the
/// kind-specific ones live in [`LiabilityDetails`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liability {
    pub id: LiabilityId,
    pub account_id: AssetId,
    pub data_source: DataSource,
    pub last_payment_date: Option<NaiveDate>,
    pub last_payment_amount: Option<Decimal>,
    pub next_payment_date: Option<NaiveDate>,
    pub details: LiabilityDetails,
}

impl Liability {
    pub fn kind(&self) -> LiabilityKind {
        self.details.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LiabilityDetails {
    Credit(CreditDetails),
    Loan(LoanDetails),
    Mortgage(MortgageDetails),
}

impl LiabilityDetails {
    pub fn kind(&self) -> LiabilityKind {
        match self {
            LiabilityDetails::Credit(_) => LiabilityKind::Credit,
            LiabilityDetails::Loan(_) => LiabilityKind::Loan,
            LiabilityDetails::Mortgage(_) => LiabilityKind::Mortgage,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditDetails {
    pub interest_percentage: Option<f64>,
    pub minimum_payment_amount: Option<Decimal>,
    pub last_statement_balance: Option<Decimal>,
    pub last_statement_date: Option<NaiveDate>,
    pub is_overdue: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanDetails {
    pub loan_type: String,
    pub loan_name: Option<String>,
    pub interest_percentage: Option<f64>,
    pub origination_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub principal_amount: Option<Decimal>,
    pub outstanding_interest_amount: Option<Decimal>,
    pub paid_principal_amount: Option<Decimal>,
    pub paid_interest_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MortgageDetails {
    pub interest_type: Option<String>,
    pub interest_percentage: Option<f64>,
    pub origination_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub principal_amount: Option<Decimal>,
    pub paid_principal_amount: Option<Decimal>,
    pub paid_interest_amount: Option<Decimal>,
    pub loan_term: Option<String>,
    pub property_address: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiabilityKind {
    Credit,
    Loan,
    Mortgage,
}

impl fmt::Display for LiabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiabilityKind::Credit => write!(f, "credit"),
            LiabilityKind::Loan => write!(f, "loan"),
            LiabilityKind::Mortgage => write!(f, "mortgage"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_serialize_with_kind_tag() {
        let liability = Liability {
            id: LiabilityId::new("acc-2"),
            account_id: AssetId::new("acc-2"),
            data_source: DataSource::Plaid,
            last_payment_date: None,
            last_payment_amount: None,
            next_payment_date: None,
            details: LiabilityDetails::Credit(CreditDetails::default()),
        };
        let json = serde_json::to_value(&liability).unwrap();
        assert_eq!(json["details"]["kind"], "credit");
        assert_eq!(liability.kind(), LiabilityKind::Credit);
    }
}
