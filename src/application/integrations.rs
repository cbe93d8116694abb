use crate::domain::entities::integration::Integration;
use crate::domain::error::DomainError;
use crate::domain::ports::integration_store::IntegrationStore;
use crate::domain::values::credential::AccessCredential;
use crate::domain::values::ids::{IntegrationId, PrincipalId};
use crate::domain::values::product::ProductSet;
use std::sync::Arc;

/// Write-side operations on linked integrations.
#[derive(Debug, Clone)]
pub enum IntegrationCommand {
    Link {
        principal: PrincipalId,
        credential: AccessCredential,
        products: ProductSet,
        institution_name: Option<String>,
    },
    UpdateProducts {
        id: IntegrationId,
        products: ProductSet,
    },
    Unlink {
        id: IntegrationId,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationOutcome {
    Linked(Integration),
    Updated(Integration),
    Unlinked(IntegrationId),
}

pub struct IntegrationsUseCase {
    store: Arc<dyn IntegrationStore>,
}

impl IntegrationsUseCase {
    pub fn new(store: Arc<dyn IntegrationStore>) -> Self {
        Self { store }
    }

    pub fn execute(&self, command: IntegrationCommand) -> Result<IntegrationOutcome, DomainError> {
        match command {
            IntegrationCommand::Link {
                principal,
                credential,
                products,
                institution_name,
            } => {
                if credential.is_blank() {
                    return Err("access credential must not be empty".into());
                }
                require_products(&products)?;
                let integration = Integration::new(principal, credential, products, institution_name);
                self.store.save(&integration)?;
                tracing::info!(
                    principal = %integration.principal_id,
                    integration = %integration.id,
                    credential = %integration.access_credential,
                    "integration linked"
                );
                Ok(IntegrationOutcome::Linked(integration))
            }
            IntegrationCommand::UpdateProducts { id, products } => {
                require_products(&products)?;
                let mut integration = self.require(&id)?;
                integration.set_products(products);
                self.store.save(&integration)?;
                tracing::info!(integration = %id, "integration products updated");
                Ok(IntegrationOutcome::Updated(integration))
            }
            IntegrationCommand::Unlink { id } => {
                self.require(&id)?;
                self.store.delete(&id)?;
                tracing::info!(integration = %id, "integration unlinked");
                Ok(IntegrationOutcome::Unlinked(id))
            }
        }
    }

    pub fn list(&self, principal: &PrincipalId) -> Result<Vec<Integration>, DomainError> {
        self.store.list_for_principal(principal)
    }

    fn require(&self, id: &IntegrationId) -> Result<Integration, DomainError> {
        self.store
            .load(id)?
            .ok_or_else(|| DomainError::NotFound(format!("integration {id}")))
    }
}

fn require_products(products: &ProductSet) -> Result<(), DomainError> {
    if products.is_empty() {
        return Err(DomainError::InvalidInput(
            "at least one product must be enabled".into(),
        ));
    }
    Ok(())
}
