use crate::domain::error::FetchError;
use crate::domain::provider::ProviderResponse;
use crate::domain::values::credential::AccessCredential;
use crate::domain::values::product::Product;
use async_trait::async_trait;

/// Request shaping shared by every fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchParams {
    /// Page size requested from the provider.
    pub count: u32,
    /// Upper bound on follow-up pages for cursor-paginated products.
    pub max_pages: u32,
    /// History window for date-ranged products.
    pub lookback_days: u32,
}

impl Default for FetchParams {
    fn default() -> Self {
        Self {
            count: 100,
            max_pages: 5,
            lookback_days: 90,
        }
    }
}

/// One read-only call for one product against one provider credential.
///
/// Implementations report every provider-side failure (revoked credential,
/// rate limiting, outage) as a `FetchError` and never retry on their own
/// unless documented.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Product this fetcher serves.
    fn product(&self) -> Product;

    /// Fetcher name for logging.
    fn name(&self) -> &str;

    async fn fetch(
        &self,
        credential: &AccessCredential,
        params: &FetchParams,
    ) -> Result<ProviderResponse, FetchError>;
}
