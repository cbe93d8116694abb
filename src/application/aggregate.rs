use crate::application::merge_index::MergeIndex;
use crate::application::normalize::{normalize, NormalizeContext};
use crate::domain::entities::account_asset::AccountAsset;
use crate::domain::entities::integration::Integration;
use crate::domain::error::{AggregationError, FetchError, FetchErrorKind};
use crate::domain::ports::integration_directory::IntegrationDirectory;
use crate::domain::ports::source_fetcher::{FetchParams, SourceFetcher};
use crate::domain::provider::ProviderResponse;
use crate::domain::values::ids::{IntegrationId, PrincipalId};
use crate::domain::values::product::{Product, ProductSet};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A fetch that did not contribute to the result.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub integration: IntegrationId,
    pub product: Product,
    pub kind: FetchErrorKind,
    pub reason: String,
    pub retryable: bool,
}

impl SourceFailure {
    fn new(integration: &Integration, product: Product, err: FetchError) -> Self {
        Self {
            integration: integration.id.clone(),
            product,
            kind: err.kind,
            reason: err.reason,
            retryable: err.retryable,
        }
    }
}

/// Merged accounts plus what went wrong on the way.
#[derive(Debug, Default, Serialize)]
pub struct AggregateReport {
    pub accounts: Vec<AccountAsset>,
    pub sources_attempted: usize,
    pub source_failures: Vec<SourceFailure>,
    pub normalization_errors: Vec<String>,
}

impl AggregateReport {
    /// True when at least one source or account could not be included.
    pub fn is_partial(&self) -> bool {
        !self.source_failures.is_empty() || !self.normalization_errors.is_empty()
    }
}

pub struct AggregationEngine {
    directory: Arc<dyn IntegrationDirectory>,
    fetchers: HashMap<Product, Arc<dyn SourceFetcher>>,
    fetch_timeout: Duration,
    params: FetchParams,
}

impl AggregationEngine {
    /// Fetchers are keyed by the product they report; a later fetcher for
    /// the same product replaces an earlier one.
    pub fn new(
        directory: Arc<dyn IntegrationDirectory>,
        fetchers: Vec<Arc<dyn SourceFetcher>>,
        fetch_timeout: Duration,
        params: FetchParams,
    ) -> Self {
        let fetchers = fetchers.into_iter().map(|f| (f.product(), f)).collect();
        Self {
            directory,
            fetchers,
            fetch_timeout,
            params,
        }
    }

    pub async fn aggregate(
        &self,
        principal: &PrincipalId,
        requested: &ProductSet,
    ) -> Result<Vec<AccountAsset>, AggregationError> {
        Ok(self.aggregate_report(principal, requested).await?.accounts)
    }

    /// Lists the principal's integrations, fetches every enabled and
    /// requested product concurrently, then folds the normalized fragments
    /// into one account list ordered by `AssetId`.
    ///
    /// Only a directory failure is returned as an error. Failed fetches and
    /// abandoned accounts are recorded in the report.
    pub async fn aggregate_report(
        &self,
        principal: &PrincipalId,
        requested: &ProductSet,
    ) -> Result<AggregateReport, AggregationError> {
        let integrations = self.directory.list(principal).await.map_err(|e| {
            tracing::warn!(principal = %principal, error = %e, "integration lookup failed");
            e
        })?;
        if integrations.is_empty() {
            tracing::debug!(principal = %principal, "no integrations linked");
            return Ok(AggregateReport::default());
        }

        let tasks: Vec<_> = integrations
            .iter()
            .flat_map(|integration| {
                integration
                    .products_to_fetch(requested)
                    .into_iter()
                    .map(move |product| self.fetch_one(integration, product))
            })
            .collect();
        tracing::info!(
            principal = %principal,
            integrations = integrations.len(),
            fetches = tasks.len(),
            "fanning out provider fetches"
        );

        let outcomes = join_all(tasks).await;

        let mut report = AggregateReport {
            sources_attempted: outcomes.len(),
            ..Default::default()
        };
        let mut index = MergeIndex::new();
        for (integration, product, outcome) in outcomes {
            match outcome {
                Ok(response) => {
                    let ctx = NormalizeContext::new(integration.institution_name.clone());
                    let normalized = normalize(&response, &ctx);
                    for err in normalized.errors {
                        tracing::warn!(
                            integration = %integration.id,
                            product = %product,
                            error = %err,
                            "account abandoned during normalization"
                        );
                        report.normalization_errors.push(err.to_string());
                    }
                    tracing::debug!(
                        integration = %integration.id,
                        product = %product,
                        fragments = normalized.fragments.len(),
                        "merging fragments"
                    );
                    index.extend(normalized.fragments);
                }
                Err(err) => {
                    tracing::warn!(
                        integration = %integration.id,
                        product = %product,
                        error = %err,
                        retryable = err.retryable,
                        "source fetch failed"
                    );
                    report.source_failures.push(SourceFailure::new(integration, product, err));
                }
            }
        }

        report.accounts = index.into_accounts();
        tracing::info!(
            principal = %principal,
            accounts = report.accounts.len(),
            failures = report.source_failures.len(),
            "aggregation complete"
        );
        Ok(report)
    }

    async fn fetch_one<'a>(
        &self,
        integration: &'a Integration,
        product: Product,
    ) -> (&'a Integration, Product, Result<ProviderResponse, FetchError>) {
        let Some(fetcher) = self.fetchers.get(&product) else {
            let err = FetchError::provider(format!("no fetcher registered for {product}"), false);
            return (integration, product, Err(err));
        };
        tracing::debug!(
            integration = %integration.id,
            product = %product,
            fetcher = fetcher.name(),
            credential = %integration.access_credential,
            "fetching"
        );
        let fetch = fetcher.fetch(&integration.access_credential, &self.params);
        let outcome = match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::timeout(self.fetch_timeout)),
        };
        let outcome = outcome.and_then(|response| {
            if response.product() == product {
                Ok(response)
            } else {
                Err(FetchError::malformed(format!(
                    "{} returned {} data for {product}",
                    fetcher.name(),
                    response.product()
                )))
            }
        });
        (integration, product, outcome)
    }
}
