//! Shared test helpers: in-memory directory, scripted fetchers and provider
//! payload builders.
#![allow(dead_code)]

pub mod http_stub;

use async_trait::async_trait;
use openfolio::domain::entities::integration::Integration;
use openfolio::domain::error::{FetchError, LookupError};
use openfolio::domain::ports::integration_directory::IntegrationDirectory;
use openfolio::domain::ports::integration_store::IntegrationStore;
use openfolio::domain::ports::source_fetcher::{FetchParams, SourceFetcher};
use openfolio::domain::provider::plaid::{
    AccountBase, Apr, Balances, CreditCardLiability, Holding, InvestmentTransactionsResponse,
    InvestmentsHoldingsResponse, LiabilitiesObject, LiabilitiesResponse, PlaidInvestmentTransaction,
    PlaidTransaction, TransactionsSyncResponse,
};
use openfolio::domain::provider::{InvestmentsResponse, ProviderResponse};
use openfolio::domain::values::credential::AccessCredential;
use openfolio::domain::values::ids::PrincipalId;
use openfolio::domain::values::product::Product;
use openfolio::infrastructure::sqlite::integration_repo::SqliteIntegrationRepo;
use openfolio::infrastructure::sqlite::migrations::run_migrations;
use openfolio::OpenFolio;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Directory answering from a fixed map. Unknown principals are `NotFound`.
#[derive(Default)]
pub struct StaticDirectory {
    entries: HashMap<PrincipalId, Vec<Integration>>,
}

impl StaticDirectory {
    pub fn with(mut self, integration: Integration) -> Self {
        self.entries
            .entry(integration.principal_id.clone())
            .or_default()
            .push(integration);
        self
    }

    pub fn with_principal(mut self, principal: &str) -> Self {
        self.entries.entry(PrincipalId::new(principal)).or_default();
        self
    }
}

#[async_trait]
impl IntegrationDirectory for StaticDirectory {
    async fn list(&self, principal: &PrincipalId) -> Result<Vec<Integration>, LookupError> {
        self.entries
            .get(principal)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(principal.clone()))
    }
}

pub struct DownDirectory;

#[async_trait]
impl IntegrationDirectory for DownDirectory {
    async fn list(&self, _principal: &PrincipalId) -> Result<Vec<Integration>, LookupError> {
        Err(LookupError::Unavailable("connection refused".into()))
    }
}

/// Fetcher answering per access token, optionally after a delay.
pub struct ScriptedFetcher {
    product: Product,
    responses: HashMap<String, Result<ProviderResponse, FetchError>>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(product: Product) -> Self {
        Self {
            product,
            responses: HashMap::new(),
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn respond(mut self, token: &str, response: ProviderResponse) -> Self {
        self.responses.insert(token.to_string(), Ok(response));
        self
    }

    pub fn fail(mut self, token: &str, error: FetchError) -> Self {
        self.responses.insert(token.to_string(), Err(error));
        self
    }

    pub fn delay(mut self, token: &str, delay: Duration) -> Self {
        self.delays.insert(token.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceFetcher for ScriptedFetcher {
    fn product(&self) -> Product {
        self.product
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(
        &self,
        credential: &AccessCredential,
        _params: &FetchParams,
    ) -> Result<ProviderResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(credential.expose()) {
            tokio::time::sleep(*delay).await;
        }
        self.responses
            .get(credential.expose())
            .cloned()
            .unwrap_or_else(|| Err(FetchError::invalid_credential("unknown token")))
    }
}

pub fn integration(principal: &str, token: &str, products: &[Product]) -> Integration {
    Integration::new(
        PrincipalId::new(principal),
        AccessCredential::new(token),
        products.iter().copied().collect(),
        None,
    )
}

pub fn memory_store() -> Arc<SqliteIntegrationRepo> {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    Arc::new(SqliteIntegrationRepo::new(conn))
}

pub fn engine(
    directory: impl IntegrationDirectory + 'static,
    fetchers: Vec<Arc<ScriptedFetcher>>,
    timeout: Duration,
) -> OpenFolio {
    let store: Arc<dyn IntegrationStore> = memory_store();
    let fetchers = fetchers
        .into_iter()
        .map(|f| f as Arc<dyn SourceFetcher>)
        .collect();
    OpenFolio::with_providers(
        Arc::new(directory),
        store,
        fetchers,
        timeout,
        FetchParams::default(),
    )
}

pub fn account(id: &str) -> AccountBase {
    AccountBase {
        account_id: Some(id.into()),
        name: Some(format!("Account {id}")),
        balances: Balances {
            available: Some(100.0),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn transaction(id: &str, account_id: &str, amount: f64) -> PlaidTransaction {
    PlaidTransaction {
        transaction_id: Some(id.into()),
        account_id: Some(account_id.into()),
        amount: Some(amount),
        date: Some("2024-05-01".into()),
        name: Some(format!("Purchase {id}")),
        ..Default::default()
    }
}

/// One account with the given transaction ids.
pub fn transactions_response(account_id: &str, txn_ids: &[&str]) -> ProviderResponse {
    ProviderResponse::Transactions(TransactionsSyncResponse {
        accounts: vec![account(account_id)],
        added: txn_ids
            .iter()
            .map(|id| transaction(id, account_id, 10.0))
            .collect(),
        ..Default::default()
    })
}

pub fn credit_response(account_id: &str) -> ProviderResponse {
    ProviderResponse::Liabilities(LiabilitiesResponse {
        accounts: vec![account(account_id)],
        liabilities: LiabilitiesObject {
            credit: Some(vec![CreditCardLiability {
                account_id: Some(account_id.into()),
                aprs: vec![Apr {
                    apr_percentage: Some(22.5),
                    apr_type: Some("purchase_apr".into()),
                }],
                last_statement_balance: Some(320.0),
                ..Default::default()
            }]),
            ..Default::default()
        },
        item: None,
    })
}

/// Holdings for `(security_id)` under one account plus investment
/// transactions given as `(id, security_id)` pairs.
pub fn investments_response(
    account_id: &str,
    securities: &[&str],
    txns: &[(&str, &str)],
) -> ProviderResponse {
    ProviderResponse::Investments(InvestmentsResponse {
        holdings: InvestmentsHoldingsResponse {
            accounts: vec![account(account_id)],
            holdings: securities
                .iter()
                .map(|s| Holding {
                    account_id: Some(account_id.into()),
                    security_id: Some((*s).into()),
                    quantity: Some(3.0),
                    institution_value: Some(300.0),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        },
        transactions: Some(InvestmentTransactionsResponse {
            investment_transactions: txns
                .iter()
                .map(|(id, s)| PlaidInvestmentTransaction {
                    investment_transaction_id: Some((*id).into()),
                    account_id: Some(account_id.into()),
                    security_id: Some((*s).into()),
                    amount: Some(50.0),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }),
    })
}
