use crate::domain::entities::integration::Integration;
use crate::domain::error::DomainError;
use crate::domain::values::ids::{IntegrationId, PrincipalId};

/// Minimal load/store contract for the write side of integrations.
pub trait IntegrationStore: Send + Sync {
    fn load(&self, id: &IntegrationId) -> Result<Option<Integration>, DomainError>;
    fn save(&self, integration: &Integration) -> Result<(), DomainError>;
    fn delete(&self, id: &IntegrationId) -> Result<(), DomainError>;
    fn list_for_principal(&self, principal: &PrincipalId) -> Result<Vec<Integration>, DomainError>;
}
