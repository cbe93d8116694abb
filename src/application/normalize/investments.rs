use super::{account_fragment, currency_of, money, non_blank, parse_date, NormalizeContext, Normalized, DEFAULT_CURRENCY};
use crate::domain::entities::holding::{InvestmentHolding, InvestmentTransaction};
use crate::domain::error::NormalizationError;
use crate::domain::provider::plaid::{Holding, PlaidInvestmentTransaction, Security};
use crate::domain::provider::InvestmentsResponse;
use crate::domain::values::data_source::DataSource;
use crate::domain::values::ids::{AssetId, HoldingId, TransactionId};
use std::collections::{HashMap, HashSet};

/// Two-level normalization: investment transactions are grouped by
/// security id first, then each group is attached to the holding of that
/// security. Only accounts with at least one holding become fragments.
pub fn normalize_investments(resp: &InvestmentsResponse, ctx: &NormalizeContext) -> Normalized {
    let holdings_resp = &resp.holdings;
    let institution = ctx.institution(holdings_resp.item.as_ref());

    let txn_securities = resp.transactions.iter().flat_map(|t| t.securities.iter());
    let securities: HashMap<&str, &Security> = holdings_resp
        .securities
        .iter()
        .chain(txn_securities)
        .filter_map(|s| non_blank(&s.security_id).map(|id| (id, s)))
        .collect();

    let mut by_security: HashMap<String, Vec<InvestmentTransaction>> = HashMap::new();
    if let Some(txns) = &resp.transactions {
        for raw in &txns.investment_transactions {
            if let Some(txn) = map_investment_transaction(raw) {
                by_security.entry(txn.security_id.clone()).or_default().push(txn);
            }
        }
    }

    let mut by_account: HashMap<AssetId, Vec<InvestmentHolding>> = HashMap::new();
    for raw in &holdings_resp.holdings {
        if let Some(holding) = map_holding(raw, &securities) {
            by_account.entry(holding.account_id.clone()).or_default().push(holding);
        }
    }

    let dropped = attach_transactions(&mut by_account, &by_security);
    if dropped > 0 {
        tracing::debug!(
            dropped,
            groups = by_security.len(),
            "investment transactions without a matching holding were dropped"
        );
    }

    let mut out = Normalized::default();
    for account in &holdings_resp.accounts {
        let Some(mut fragment) = account_fragment(account, institution) else {
            out.errors.push(NormalizationError::MissingAccountId {
                context: "investments",
            });
            continue;
        };
        if let Some(holdings) = by_account.remove(&fragment.id) {
            fragment.holdings = holdings;
            out.fragments.push(fragment);
        }
    }
    out
}

/// Gives every holding the transactions of its security booked in its own
/// account. Returns how many transactions found no holding.
fn attach_transactions(
    by_account: &mut HashMap<AssetId, Vec<InvestmentHolding>>,
    by_security: &HashMap<String, Vec<InvestmentTransaction>>,
) -> usize {
    let mut attached: HashSet<(AssetId, TransactionId)> = HashSet::new();
    for holding in by_account.values_mut().flatten() {
        let Some(group) = by_security.get(&holding.security_id) else {
            continue;
        };
        holding.transactions = group
            .iter()
            .filter(|t| t.account_id == holding.account_id)
            .cloned()
            .collect();
        attached.extend(holding.transactions.iter().map(|t| (t.account_id.clone(), t.id.clone())));
    }
    by_security
        .values()
        .flatten()
        .filter(|t| !attached.contains(&(t.account_id.clone(), t.id.clone())))
        .count()
}

fn map_holding(raw: &Holding, securities: &HashMap<&str, &Security>) -> Option<InvestmentHolding> {
    let account_id = AssetId::new(non_blank(&raw.account_id)?);
    let security_id = non_blank(&raw.security_id)?;
    let security = securities.get(security_id);

    Some(InvestmentHolding {
        id: HoldingId::new(account_id.clone(), security_id),
        account_id,
        security_id: security_id.to_string(),
        ticker: security.and_then(|s| s.ticker_symbol.clone()),
        name: security.and_then(|s| s.name.clone()),
        security_type: security.and_then(|s| s.security_type.clone()),
        units: raw.quantity,
        unit_price: money(raw.institution_price),
        current_value: money(raw.institution_value),
        acquisition_value: money(raw.cost_basis),
        currency: currency_of(&raw.iso_currency_code, &raw.unofficial_currency_code),
        valuation_date: parse_date(&raw.institution_price_as_of),
        data_source: DataSource::Plaid,
        transactions: Vec::new(),
    })
}

fn map_investment_transaction(raw: &PlaidInvestmentTransaction) -> Option<InvestmentTransaction> {
    let id = non_blank(&raw.investment_transaction_id)?;
    // Cash movements carry no security and have no holding to attach to.
    let security_id = non_blank(&raw.security_id)?;
    let account_id = non_blank(&raw.account_id)?;

    Some(InvestmentTransaction {
        id: TransactionId::new(id),
        account_id: AssetId::new(account_id),
        security_id: security_id.to_string(),
        date: parse_date(&raw.date),
        amount: money(raw.amount).unwrap_or_default(),
        price: money(raw.price),
        fees: money(raw.fees).unwrap_or_default(),
        units: raw.quantity,
        currency: currency_of(&raw.iso_currency_code, &None)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        description: raw.name.clone(),
        transaction_type: raw.transaction_type.clone(),
        subtype: raw.subtype.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::plaid::{
        AccountBase, InvestmentTransactionsResponse, InvestmentsHoldingsResponse, Item,
    };

    fn account(id: &str) -> AccountBase {
        AccountBase {
            account_id: Some(id.into()),
            account_type: Some("investment".into()),
            subtype: Some("brokerage".into()),
            ..Default::default()
        }
    }

    fn holding(account_id: &str, security_id: &str) -> Holding {
        Holding {
            account_id: Some(account_id.into()),
            security_id: Some(security_id.into()),
            quantity: Some(10.0),
            institution_price: Some(12.5),
            institution_value: Some(125.0),
            ..Default::default()
        }
    }

    fn inv_txn(id: &str, account_id: &str, security_id: Option<&str>) -> PlaidInvestmentTransaction {
        PlaidInvestmentTransaction {
            investment_transaction_id: Some(id.into()),
            account_id: Some(account_id.into()),
            security_id: security_id.map(str::to_string),
            amount: Some(100.0),
            transaction_type: Some("buy".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_transactions_attach_by_security() {
        let resp = InvestmentsResponse {
            holdings: InvestmentsHoldingsResponse {
                accounts: vec![account("acc-3")],
                holdings: vec![holding("acc-3", "sec-1"), holding("acc-3", "sec-2")],
                securities: vec![Security {
                    security_id: Some("sec-1".into()),
                    ticker_symbol: Some("VTI".into()),
                    ..Default::default()
                }],
                item: Some(Item {
                    institution_name: Some("Broker".into()),
                    ..Default::default()
                }),
            },
            transactions: Some(InvestmentTransactionsResponse {
                investment_transactions: vec![
                    inv_txn("it1", "acc-3", Some("sec-1")),
                    inv_txn("it2", "acc-3", Some("sec-1")),
                    inv_txn("it3", "acc-3", Some("sec-2")),
                    inv_txn("it4", "acc-3", None),
                ],
                ..Default::default()
            }),
        };
        let out = normalize_investments(&resp, &NormalizeContext::default());
        assert_eq!(out.fragments.len(), 1);
        let fragment = &out.fragments[0];
        assert_eq!(fragment.financial_institution.as_deref(), Some("Broker"));
        assert!(fragment.transactions.is_empty());

        let sec1 = fragment.holdings.iter().find(|h| h.security_id == "sec-1").unwrap();
        assert_eq!(sec1.ticker.as_deref(), Some("VTI"));
        assert_eq!(sec1.transactions.len(), 2);
        assert_eq!(sec1.id.to_string(), "acc-3-sec-1");

        let sec2 = fragment.holdings.iter().find(|h| h.security_id == "sec-2").unwrap();
        assert_eq!(sec2.transactions.len(), 1);
        assert!(sec2.ticker.is_none());
    }

    #[test]
    fn test_holding_without_transactions_gets_empty_list() {
        let resp = InvestmentsResponse {
            holdings: InvestmentsHoldingsResponse {
                accounts: vec![account("acc-3")],
                holdings: vec![holding("acc-3", "sec-9")],
                ..Default::default()
            },
            transactions: Some(InvestmentTransactionsResponse {
                investment_transactions: vec![inv_txn("it1", "acc-3", Some("sec-1"))],
                ..Default::default()
            }),
        };
        let out = normalize_investments(&resp, &NormalizeContext::default());
        let h = &out.fragments[0].holdings[0];
        assert_eq!(h.security_id, "sec-9");
        assert!(h.transactions.is_empty());
    }

    #[test]
    fn test_same_security_in_two_accounts_stays_separated() {
        let resp = InvestmentsResponse {
            holdings: InvestmentsHoldingsResponse {
                accounts: vec![account("acc-a"), account("acc-b")],
                holdings: vec![holding("acc-a", "sec-1"), holding("acc-b", "sec-1")],
                ..Default::default()
            },
            transactions: Some(InvestmentTransactionsResponse {
                investment_transactions: vec![
                    inv_txn("it-a", "acc-a", Some("sec-1")),
                    inv_txn("it-b", "acc-b", Some("sec-1")),
                ],
                ..Default::default()
            }),
        };
        let out = normalize_investments(&resp, &NormalizeContext::default());
        for fragment in &out.fragments {
            let h = &fragment.holdings[0];
            assert_eq!(h.transactions.len(), 1);
            assert_eq!(h.transactions[0].account_id, fragment.id);
        }
    }

    #[test]
    fn test_accounts_without_holdings_are_omitted() {
        let resp = InvestmentsResponse {
            holdings: InvestmentsHoldingsResponse {
                accounts: vec![account("acc-1"), account("acc-3")],
                holdings: vec![holding("acc-3", "sec-1"), holding("acc-404", "sec-1")],
                ..Default::default()
            },
            transactions: None,
        };
        let out = normalize_investments(&resp, &NormalizeContext::default());
        assert_eq!(out.fragments.len(), 1);
        assert_eq!(out.fragments[0].id.as_str(), "acc-3");
    }

    #[test]
    fn test_dropped_count_covers_transactions_of_other_accounts() {
        let securities = HashMap::new();
        let mut by_account: HashMap<AssetId, Vec<InvestmentHolding>> = HashMap::new();
        for (acc, sec) in [("acc-a", "sec-1"), ("acc-b", "sec-1")] {
            let h = map_holding(&holding(acc, sec), &securities).unwrap();
            by_account.entry(h.account_id.clone()).or_default().push(h);
        }
        let mut by_security: HashMap<String, Vec<InvestmentTransaction>> = HashMap::new();
        for raw in [
            inv_txn("it1", "acc-a", Some("sec-1")),
            inv_txn("it2", "acc-c", Some("sec-1")),
            inv_txn("it3", "acc-a", Some("sec-7")),
        ] {
            let t = map_investment_transaction(&raw).unwrap();
            by_security.entry(t.security_id.clone()).or_default().push(t);
        }

        let dropped = attach_transactions(&mut by_account, &by_security);
        assert_eq!(dropped, 2);
        assert_eq!(by_account[&AssetId::new("acc-a")][0].transactions.len(), 1);
        assert!(by_account[&AssetId::new("acc-b")][0].transactions.is_empty());
    }
}
