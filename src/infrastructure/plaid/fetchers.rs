use super::client::PlaidClient;
use crate::domain::error::FetchError;
use crate::domain::ports::source_fetcher::{FetchParams, SourceFetcher};
use crate::domain::provider::plaid::{
    InvestmentTransactionsResponse, InvestmentsHoldingsResponse, LiabilitiesResponse,
    TransactionsSyncResponse,
};
use crate::domain::provider::{InvestmentsResponse, ProviderResponse};
use crate::domain::values::credential::AccessCredential;
use crate::domain::values::product::Product;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Plaid caps `/transactions/sync` pages at 500 entries.
const MAX_SYNC_COUNT: u32 = 500;

#[derive(Debug, Serialize)]
struct SyncRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
    count: u32,
}

#[derive(Debug, Serialize)]
struct DateRangeRequest {
    start_date: NaiveDate,
    end_date: NaiveDate,
    options: DateRangeOptions,
}

#[derive(Debug, Serialize)]
struct DateRangeOptions {
    count: u32,
}

#[derive(Debug, Serialize)]
struct EmptyRequest {}

/// Follows the `/transactions/sync` cursor from the beginning of history.
pub struct TransactionsFetcher {
    client: Arc<PlaidClient>,
}

impl TransactionsFetcher {
    pub fn new(client: Arc<PlaidClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceFetcher for TransactionsFetcher {
    fn product(&self) -> Product {
        Product::Transactions
    }

    fn name(&self) -> &str {
        "plaid-transactions"
    }

    async fn fetch(
        &self,
        credential: &AccessCredential,
        params: &FetchParams,
    ) -> Result<ProviderResponse, FetchError> {
        let count = params.count.clamp(1, MAX_SYNC_COUNT);
        let first = SyncRequest { cursor: None, count };
        let mut acc: TransactionsSyncResponse = self
            .client
            .post("/transactions/sync", credential, &first)
            .await?;

        let mut pages = 1;
        while acc.has_more && pages < params.max_pages.max(1) {
            let Some(cursor) = acc.next_cursor.clone() else {
                break;
            };
            let req = SyncRequest {
                cursor: Some(&cursor),
                count,
            };
            let page: TransactionsSyncResponse =
                self.client.post("/transactions/sync", credential, &req).await?;
            acc.absorb_page(page);
            pages += 1;
        }
        if acc.has_more {
            tracing::info!(pages, "transaction sync stopped at the page limit with more data pending");
        }
        Ok(ProviderResponse::Transactions(acc))
    }
}

/// Holdings and investment transactions, fetched concurrently. A failed
/// transactions call degrades the result to holdings only.
pub struct InvestmentsFetcher {
    client: Arc<PlaidClient>,
}

impl InvestmentsFetcher {
    pub fn new(client: Arc<PlaidClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceFetcher for InvestmentsFetcher {
    fn product(&self) -> Product {
        Product::Investments
    }

    fn name(&self) -> &str {
        "plaid-investments"
    }

    async fn fetch(
        &self,
        credential: &AccessCredential,
        params: &FetchParams,
    ) -> Result<ProviderResponse, FetchError> {
        let end_date = Utc::now().date_naive();
        let range = DateRangeRequest {
            start_date: end_date - ChronoDuration::days(i64::from(params.lookback_days)),
            end_date,
            options: DateRangeOptions { count: params.count },
        };

        let empty = EmptyRequest {};

        let holdings_call = self.client.post::<_, InvestmentsHoldingsResponse>(
            "/investments/holdings/get",
            credential,
            &empty,
        );
        let transactions_call = self.client.post::<_, InvestmentTransactionsResponse>(
            "/investments/transactions/get",
            credential,
            &range,
        );
        let (holdings, transactions) = futures::join!(holdings_call, transactions_call);

        let holdings = holdings?;
        let transactions = match transactions {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(error = %e, "investment transactions unavailable, returning holdings only");
                None
            }
        };
        Ok(ProviderResponse::Investments(InvestmentsResponse {
            holdings,
            transactions,
        }))
    }
}

pub struct LiabilitiesFetcher {
    client: Arc<PlaidClient>,
}

impl LiabilitiesFetcher {
    pub fn new(client: Arc<PlaidClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceFetcher for LiabilitiesFetcher {
    fn product(&self) -> Product {
        Product::Liabilities
    }

    fn name(&self) -> &str {
        "plaid-liabilities"
    }

    async fn fetch(
        &self,
        credential: &AccessCredential,
        _params: &FetchParams,
    ) -> Result<ProviderResponse, FetchError> {
        let resp: LiabilitiesResponse = self
            .client
            .post("/liabilities/get", credential, &EmptyRequest {})
            .await?;
        Ok(ProviderResponse::Liabilities(resp))
    }
}

/// One fetcher per product, sharing a single client.
pub fn plaid_fetchers(client: Arc<PlaidClient>) -> Vec<Arc<dyn SourceFetcher>> {
    let transactions: Arc<dyn SourceFetcher> = Arc::new(TransactionsFetcher::new(client.clone()));
    let investments: Arc<dyn SourceFetcher> = Arc::new(InvestmentsFetcher::new(client.clone()));
    let liabilities: Arc<dyn SourceFetcher> = Arc::new(LiabilitiesFetcher::new(client));
    vec![transactions, investments, liabilities]
}
