pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::aggregate::{AggregateReport, AggregationEngine};
use crate::application::integrations::{IntegrationCommand, IntegrationOutcome, IntegrationsUseCase};
use crate::config::{AppConfig, DirectoryKind};
use crate::domain::entities::account_asset::AccountAsset;
use crate::domain::entities::integration::Integration;
use crate::domain::error::{AggregationError, DomainError};
use crate::domain::ports::integration_directory::IntegrationDirectory;
use crate::domain::ports::integration_store::IntegrationStore;
use crate::domain::ports::source_fetcher::{FetchParams, SourceFetcher};
use crate::domain::values::ids::PrincipalId;
use crate::domain::values::product::{Product, ProductSet};
use crate::infrastructure::directory::http::HttpIntegrationDirectory;
use crate::infrastructure::plaid::client::PlaidClient;
use crate::infrastructure::plaid::fetchers::plaid_fetchers;
use crate::infrastructure::sqlite::integration_repo::SqliteIntegrationRepo;
use crate::infrastructure::sqlite::migrations::run_migrations;
use rusqlite::Connection;
use std::sync::Arc;
use std::time::Duration;

pub struct OpenFolio {
    aggregate_uc: AggregationEngine,
    integrations_uc: IntegrationsUseCase,
}

impl OpenFolio {
    pub fn new(config: &AppConfig) -> Result<Self, DomainError> {
        let conn = Connection::open(&config.db_path).map_err(|e| DomainError::Database(format!("DB error: {e}")))?;
        conn.pragma_update(None, "journal_mode", "WAL").map_err(|e| DomainError::Database(format!("WAL error: {e}")))?;
        run_migrations(&conn)?;

        let repo = Arc::new(SqliteIntegrationRepo::new(conn));
        let store: Arc<dyn IntegrationStore> = repo.clone();
        let directory: Arc<dyn IntegrationDirectory> = match &config.directory {
            DirectoryKind::Sqlite => repo,
            DirectoryKind::Http { base_url } => {
                Arc::new(HttpIntegrationDirectory::new(base_url.clone(), config.fetch_timeout))
            }
        };

        if config.plaid.client_id.is_empty() || config.plaid.secret.is_empty() {
            tracing::warn!("PLAID_CLIENT_ID or PLAID_SECRET not set, provider calls will be rejected");
        }
        let client = Arc::new(PlaidClient::new(config.plaid.clone(), config.fetch_timeout));

        Ok(Self::with_providers(
            directory,
            store,
            plaid_fetchers(client),
            config.fetch_timeout,
            config.fetch,
        ))
    }

    pub fn with_providers(
        directory: Arc<dyn IntegrationDirectory>,
        store: Arc<dyn IntegrationStore>,
        fetchers: Vec<Arc<dyn SourceFetcher>>,
        fetch_timeout: Duration,
        params: FetchParams,
    ) -> Self {
        Self {
            aggregate_uc: AggregationEngine::new(directory, fetchers, fetch_timeout, params),
            integrations_uc: IntegrationsUseCase::new(store),
        }
    }

    /// Accounts with their cash transactions.
    pub async fn accounts(&self, principal: &PrincipalId) -> Result<Vec<AccountAsset>, AggregationError> {
        self.aggregate_uc.aggregate(principal, &single(Product::Transactions)).await
    }

    /// Investment accounts with holdings and their investment transactions.
    pub async fn investment_accounts(&self, principal: &PrincipalId) -> Result<Vec<AccountAsset>, AggregationError> {
        self.aggregate_uc.aggregate(principal, &single(Product::Investments)).await
    }

    /// Accounts carrying credit, loan or mortgage liabilities.
    pub async fn liabilities(&self, principal: &PrincipalId) -> Result<Vec<AccountAsset>, AggregationError> {
        self.aggregate_uc.aggregate(principal, &single(Product::Liabilities)).await
    }

    /// Every product merged into one view per account.
    pub async fn portfolio(&self, principal: &PrincipalId) -> Result<Vec<AccountAsset>, AggregationError> {
        self.aggregate_uc.aggregate(principal, &Product::all()).await
    }

    pub async fn report(&self, principal: &PrincipalId, products: &ProductSet) -> Result<AggregateReport, AggregationError> {
        self.aggregate_uc.aggregate_report(principal, products).await
    }

    /// Like [`OpenFolio::report`] but gives up after `deadline`. In-flight
    /// fetches are dropped and nothing partial is returned.
    pub async fn aggregate_within(
        &self,
        principal: &PrincipalId,
        products: &ProductSet,
        deadline: Duration,
    ) -> Result<AggregateReport, AggregationError> {
        tokio::time::timeout(deadline, self.report(principal, products))
            .await
            .map_err(|_| AggregationError::DeadlineExceeded(deadline))?
    }

    pub fn execute(&self, command: IntegrationCommand) -> Result<IntegrationOutcome, DomainError> {
        self.integrations_uc.execute(command)
    }

    pub fn integrations(&self, principal: &PrincipalId) -> Result<Vec<Integration>, DomainError> {
        self.integrations_uc.list(principal)
    }
}

fn single(product: Product) -> ProductSet {
    [product].into_iter().collect()
}
