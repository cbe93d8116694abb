use super::{account_fragment, currency_of, money, non_blank, parse_date, NormalizeContext, Normalized, DEFAULT_CURRENCY};
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::NormalizationError;
use crate::domain::provider::plaid::{PlaidTransaction, TransactionsSyncResponse};
use crate::domain::values::data_source::DataSource;
use crate::domain::values::ids::{AssetId, TransactionId};
use std::collections::{HashMap, HashSet};

/// Every account in the response becomes a fragment, with the added and
/// modified transactions that belong to it. Ids listed as removed are left out.
pub fn normalize_transactions(resp: &TransactionsSyncResponse, ctx: &NormalizeContext) -> Normalized {
    let institution = ctx.institution(resp.item.as_ref());
    let removed: HashSet<&str> = resp
        .removed
        .iter()
        .filter_map(|r| non_blank(&r.transaction_id))
        .collect();

    let mut by_account: HashMap<AssetId, Vec<Transaction>> = HashMap::new();
    for raw in resp.added.iter().chain(resp.modified.iter()) {
        let Some(txn) = map_transaction(raw) else {
            continue;
        };
        if removed.contains(txn.id.as_str()) {
            continue;
        }
        by_account.entry(txn.asset_id.clone()).or_default().push(txn);
    }

    let mut out = Normalized::default();
    for account in &resp.accounts {
        match account_fragment(account, institution) {
            Some(mut fragment) => {
                fragment.transactions = by_account.remove(&fragment.id).unwrap_or_default();
                out.fragments.push(fragment);
            }
            None => out.errors.push(NormalizationError::MissingAccountId {
                context: "transactions",
            }),
        }
    }

    let orphaned: usize = by_account.values().map(Vec::len).sum();
    if orphaned > 0 {
        tracing::debug!(orphaned, "dropped transactions referencing accounts absent from the response");
    }
    out
}

fn map_transaction(raw: &PlaidTransaction) -> Option<Transaction> {
    let id = non_blank(&raw.transaction_id)?;
    let account_id = non_blank(&raw.account_id)?;

    let counterparty = raw
        .counterparties
        .iter()
        .find_map(|c| non_blank(&c.name))
        .map(str::to_string);

    Some(Transaction {
        id: TransactionId::new(id),
        asset_id: AssetId::new(account_id),
        date: parse_date(&raw.date),
        amount: money(raw.amount).unwrap_or_default(),
        currency: currency_of(&raw.iso_currency_code, &raw.unofficial_currency_code)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        category: raw
            .personal_finance_category
            .as_ref()
            .and_then(|c| c.primary.clone()),
        transaction_type: raw.transaction_type.clone(),
        description: raw.name.clone().or_else(|| raw.merchant_name.clone()),
        counterparty,
        external_id: id.to_string(),
        data_source: DataSource::Plaid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::plaid::{AccountBase, Counterparty, RemovedTransaction};
    use rust_decimal::Decimal;

    fn account(id: &str) -> AccountBase {
        AccountBase {
            account_id: Some(id.into()),
            name: Some(format!("Account {id}")),
            ..Default::default()
        }
    }

    fn txn(id: &str, account_id: &str, amount: f64) -> PlaidTransaction {
        PlaidTransaction {
            transaction_id: Some(id.into()),
            account_id: Some(account_id.into()),
            amount: Some(amount),
            date: Some("2024-05-02".into()),
            name: Some("Coffee".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_transactions_by_account() {
        let resp = TransactionsSyncResponse {
            accounts: vec![account("acc-1"), account("acc-2")],
            added: vec![txn("t1", "acc-1", 4.5), txn("t2", "acc-1", 3.0), txn("t3", "acc-2", 10.0)],
            ..Default::default()
        };
        let out = normalize_transactions(&resp, &NormalizeContext::default());
        assert_eq!(out.fragments.len(), 2);
        assert!(out.errors.is_empty());
        let acc1 = out.fragments.iter().find(|f| f.id.as_str() == "acc-1").unwrap();
        assert_eq!(acc1.transactions.len(), 2);
        assert!(acc1.holdings.is_empty());
        assert!(acc1.liabilities.is_empty());
        assert!(acc1.transactions.iter().all(|t| t.asset_id == acc1.id));
    }

    #[test]
    fn test_accounts_without_transactions_still_listed() {
        let resp = TransactionsSyncResponse {
            accounts: vec![account("acc-1")],
            ..Default::default()
        };
        let out = normalize_transactions(&resp, &NormalizeContext::default());
        assert_eq!(out.fragments.len(), 1);
        assert!(out.fragments[0].transactions.is_empty());
    }

    #[test]
    fn test_orphans_and_removed_are_dropped() {
        let resp = TransactionsSyncResponse {
            accounts: vec![account("acc-1")],
            added: vec![txn("t1", "acc-1", 1.0), txn("t2", "acc-9", 2.0), txn("t3", "acc-1", 3.0)],
            removed: vec![RemovedTransaction {
                transaction_id: Some("t3".into()),
                account_id: Some("acc-1".into()),
            }],
            ..Default::default()
        };
        let out = normalize_transactions(&resp, &NormalizeContext::default());
        let ids: Vec<&str> = out.fragments[0].transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1"]);
    }

    #[test]
    fn test_missing_account_id_abandons_only_that_fragment() {
        let resp = TransactionsSyncResponse {
            accounts: vec![AccountBase::default(), account("acc-1")],
            ..Default::default()
        };
        let out = normalize_transactions(&resp, &NormalizeContext::default());
        assert_eq!(out.fragments.len(), 1);
        assert_eq!(
            out.errors,
            vec![NormalizationError::MissingAccountId { context: "transactions" }]
        );
    }

    #[test]
    fn test_missing_optionals_default() {
        let raw = PlaidTransaction {
            transaction_id: Some("t1".into()),
            account_id: Some("acc-1".into()),
            date: Some("not-a-date".into()),
            counterparties: vec![Counterparty { name: None }, Counterparty { name: Some("ACME".into()) }],
            ..Default::default()
        };
        let t = map_transaction(&raw).unwrap();
        assert_eq!(t.amount, Decimal::ZERO);
        assert_eq!(t.currency, "USD");
        assert!(t.date.is_none());
        assert_eq!(t.counterparty.as_deref(), Some("ACME"));
    }

    #[test]
    fn test_badly_typed_fields_do_not_sink_sibling_accounts() {
        let json = r#"{
            "accounts": [
                {"account_id": "acc-1", "balances": null},
                {"account_id": "acc-2", "balances": {"available": "oops", "current": 80.0}}
            ],
            "added": [
                {"transaction_id": "t1", "account_id": "acc-1", "amount": 5.0},
                {"transaction_id": "t2", "account_id": "acc-2", "amount": "12.50"},
                {"transaction_id": "t3", "account_id": "acc-2", "amount": {"value": 1}}
            ],
            "has_more": null
        }"#;
        let resp: TransactionsSyncResponse = serde_json::from_str(json).unwrap();
        let out = normalize_transactions(&resp, &NormalizeContext::default());

        assert_eq!(out.fragments.len(), 2);
        assert!(out.errors.is_empty());
        let acc1 = out.fragments.iter().find(|f| f.id.as_str() == "acc-1").unwrap();
        assert!(acc1.balance.is_none());
        assert_eq!(acc1.transactions.len(), 1);

        let acc2 = out.fragments.iter().find(|f| f.id.as_str() == "acc-2").unwrap();
        let amount = |id: &str| acc2.transactions.iter().find(|t| t.id.as_str() == id).unwrap().amount;
        assert_eq!(amount("t2"), Decimal::new(1250, 2));
        assert_eq!(amount("t3"), Decimal::ZERO);
    }
}
