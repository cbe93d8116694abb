use crate::domain::entities::account_asset::{AccountAsset, AccountFragment};
use crate::domain::entities::holding::{InvestmentHolding, InvestmentTransaction};
use crate::domain::values::ids::{AssetId, HoldingId};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Per-call index of accounts keyed by `AssetId`.
///
/// Folding is single-threaded and happens after every fetch has completed.
/// Iteration order is by `AssetId`.
#[derive(Debug, Default)]
pub struct MergeIndex {
    accounts: BTreeMap<AssetId, AccountAsset>,
}

impl MergeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fragment: AccountFragment) {
        let existing = self.accounts.remove(&fragment.id);
        let merged = merge(existing, fragment);
        self.accounts.insert(merged.id.clone(), merged);
    }

    pub fn get(&self, id: &AssetId) -> Option<&AccountAsset> {
        self.accounts.get(id)
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn into_accounts(self) -> Vec<AccountAsset> {
        self.accounts.into_values().collect()
    }
}

impl Extend<AccountFragment> for MergeIndex {
    fn extend<I: IntoIterator<Item = AccountFragment>>(&mut self, iter: I) {
        for fragment in iter {
            self.insert(fragment);
        }
    }
}

impl FromIterator<AccountFragment> for MergeIndex {
    fn from_iter<I: IntoIterator<Item = AccountFragment>>(iter: I) -> Self {
        let mut index = MergeIndex::new();
        index.extend(iter);
        index
    }
}

/// Combines a stored account with a newly observed fragment of the same id.
///
/// Scalars are overwritten only by non-null incoming values. Collections are
/// concatenated and de-duplicated by identity; a later observation replaces
/// the earlier one in place. Sub-entities whose backref does not name this
/// account are dropped.
pub fn merge(existing: Option<AccountAsset>, incoming: AccountFragment) -> AccountAsset {
    let incoming = owned_only(incoming);
    let Some(mut account) = existing else {
        return dedup_collections(incoming);
    };
    tracing::trace!(account = %account.id, "merging fragment into existing account");

    overwrite(&mut account.name, incoming.name);
    overwrite(&mut account.account_number, incoming.account_number);
    overwrite(&mut account.asset_class, incoming.asset_class);
    overwrite(&mut account.asset_subclass, incoming.asset_subclass);
    overwrite(&mut account.currency, incoming.currency);
    overwrite(&mut account.balance, incoming.balance);
    overwrite(&mut account.financial_institution, incoming.financial_institution);
    account.data_source = incoming.data_source;

    account.transactions.extend(incoming.transactions);
    account.liabilities.extend(incoming.liabilities);
    account.holdings.extend(incoming.holdings);
    dedup_collections(account)
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn owned_only(mut fragment: AccountFragment) -> AccountFragment {
    let id = fragment.id.clone();
    let before = fragment.transactions.len() + fragment.holdings.len() + fragment.liabilities.len();
    fragment.transactions.retain(|t| t.asset_id == id);
    fragment.holdings.retain(|h| h.account_id == id);
    fragment.liabilities.retain(|l| l.account_id == id);
    for holding in &mut fragment.holdings {
        holding.transactions.retain(|t| t.account_id == id);
    }
    let after = fragment.transactions.len() + fragment.holdings.len() + fragment.liabilities.len();
    if after < before {
        tracing::debug!(account = %id, dropped = before - after, "dropped sub-entities owned by another account");
    }
    fragment
}

fn dedup_collections(mut account: AccountAsset) -> AccountAsset {
    account.transactions = dedup_by_identity(account.transactions, |t| t.id.clone());
    account.liabilities = dedup_by_identity(account.liabilities, |l| l.id.clone());
    account.holdings = merge_holdings(account.holdings);
    account
}

/// Keeps one element per key, at the position of the first observation, with
/// the value of the last one.
fn dedup_by_identity<T, K: Eq + Hash>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut positions: HashMap<K, usize> = HashMap::with_capacity(items.len());
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        match positions.get(&key(&item)) {
            Some(&pos) => out[pos] = item,
            None => {
                positions.insert(key(&item), out.len());
                out.push(item);
            }
        }
    }
    out
}

fn merge_holdings(holdings: Vec<InvestmentHolding>) -> Vec<InvestmentHolding> {
    let mut positions: HashMap<HoldingId, usize> = HashMap::with_capacity(holdings.len());
    let mut out: Vec<InvestmentHolding> = Vec::with_capacity(holdings.len());
    for holding in holdings {
        match positions.get(&holding.id) {
            Some(&pos) => merge_holding(&mut out[pos], holding),
            None => {
                positions.insert(holding.id.clone(), out.len());
                out.push(holding);
            }
        }
    }
    for holding in &mut out {
        let txns = std::mem::take(&mut holding.transactions);
        holding.transactions = dedup_investment_transactions(txns);
    }
    out
}

fn merge_holding(target: &mut InvestmentHolding, incoming: InvestmentHolding) {
    overwrite(&mut target.ticker, incoming.ticker);
    overwrite(&mut target.name, incoming.name);
    overwrite(&mut target.security_type, incoming.security_type);
    overwrite(&mut target.units, incoming.units);
    overwrite(&mut target.unit_price, incoming.unit_price);
    overwrite(&mut target.current_value, incoming.current_value);
    overwrite(&mut target.acquisition_value, incoming.acquisition_value);
    overwrite(&mut target.currency, incoming.currency);
    overwrite(&mut target.valuation_date, incoming.valuation_date);
    target.data_source = incoming.data_source;
    target.transactions.extend(incoming.transactions);
}

fn dedup_investment_transactions(txns: Vec<InvestmentTransaction>) -> Vec<InvestmentTransaction> {
    dedup_by_identity(txns, |t| t.id.clone())
}
