use crate::domain::entities::integration::Integration;
use crate::domain::error::LookupError;
use crate::domain::values::ids::PrincipalId;
use async_trait::async_trait;

/// Source of the integrations linked to a principal.
///
/// An empty list is a valid answer. `LookupError::NotFound` means the
/// principal is unknown; `LookupError::Unavailable` means the backing
/// store or service could not be reached.
#[async_trait]
pub trait IntegrationDirectory: Send + Sync {
    async fn list(&self, principal: &PrincipalId) -> Result<Vec<Integration>, LookupError>;
}
