//! Pure mapping from provider-native payloads to account fragments.
//!
//! One normalizer per response shape. Each produces fragments that carry only
//! the sub-entities of the product that was fetched, keyed by an `AssetId`
//! taken verbatim from the provider's account id so that fragments from
//! different products for the same account collide in the merge index.

pub mod investments;
pub mod liabilities;
pub mod transactions;

use crate::domain::entities::account_asset::AccountFragment;
use crate::domain::error::NormalizationError;
use crate::domain::provider::plaid::{AccountBase, Item};
use crate::domain::provider::ProviderResponse;
use crate::domain::values::data_source::DataSource;
use crate::domain::values::ids::AssetId;
use chrono::{DateTime, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

/// Currency assumed for sub-entities whose payload carries none.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Facts about the integration a response came from.
#[derive(Debug, Clone, Default)]
pub struct NormalizeContext {
    /// Institution recorded when the integration was linked. Used when the
    /// response itself does not name one.
    pub institution_name: Option<String>,
}

impl NormalizeContext {
    pub fn new(institution_name: Option<String>) -> Self {
        Self { institution_name }
    }

    fn institution<'a>(&'a self, item: Option<&'a Item>) -> Option<&'a str> {
        item.and_then(|i| non_blank(&i.institution_name))
            .or_else(|| non_blank(&self.institution_name))
    }
}

/// Output of one normalizer run.
#[derive(Debug, Default)]
pub struct Normalized {
    pub fragments: Vec<AccountFragment>,
    /// Accounts that had to be abandoned.
    pub errors: Vec<NormalizationError>,
}

pub fn normalize(response: &ProviderResponse, ctx: &NormalizeContext) -> Normalized {
    match response {
        ProviderResponse::Transactions(r) => transactions::normalize_transactions(r, ctx),
        ProviderResponse::Investments(r) => investments::normalize_investments(r, ctx),
        ProviderResponse::Liabilities(r) => liabilities::normalize_liabilities(r, ctx),
    }
}

/// Builds the account part of a fragment, or `None` when the account has no
/// usable identifier.
fn account_fragment(account: &AccountBase, institution: Option<&str>) -> Option<AccountFragment> {
    let id = non_blank(&account.account_id)?;
    let mut fragment = AccountFragment::new(AssetId::new(id));
    fragment.name = account.name.clone().or_else(|| account.official_name.clone());
    fragment.account_number = account.mask.clone();
    fragment.asset_class = account.account_type.clone();
    fragment.asset_subclass = account.subtype.clone();
    fragment.currency = currency_of(
        &account.balances.iso_currency_code,
        &account.balances.unofficial_currency_code,
    );
    fragment.balance = money(account.balances.available.or(account.balances.current));
    fragment.financial_institution = institution.map(str::to_string);
    fragment.data_source = DataSource::Plaid;
    Some(fragment)
}

fn non_blank(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn money(v: Option<f64>) -> Option<Decimal> {
    v.and_then(Decimal::from_f64)
}

fn currency_of(iso: &Option<String>, unofficial: &Option<String>) -> Option<String> {
    non_blank(iso)
        .or_else(|| non_blank(unofficial))
        .map(str::to_string)
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp; anything else is `None`.
fn parse_date(s: &Option<String>) -> Option<NaiveDate> {
    let s = non_blank(s)?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}
