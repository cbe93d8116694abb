use crate::domain::values::credential::AccessCredential;
use crate::domain::values::ids::{IntegrationId, PrincipalId};
use crate::domain::values::product::{Product, ProductSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A linked external financial-data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub id: IntegrationId,
    pub principal_id: PrincipalId,
    pub access_credential: AccessCredential,
    pub enabled_products: ProductSet,
    pub institution_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Integration {
    pub fn new(
        principal_id: PrincipalId,
        access_credential: AccessCredential,
        enabled_products: ProductSet,
        institution_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: IntegrationId::generate(),
            principal_id,
            access_credential,
            enabled_products,
            institution_name,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_enabled(&self, product: Product) -> bool {
        self.enabled_products.contains(&product)
    }

    /// Products both enabled on this integration and requested by the caller.
    pub fn products_to_fetch(&self, requested: &ProductSet) -> Vec<Product> {
        self.enabled_products
            .intersection(requested)
            .copied()
            .collect()
    }

    pub fn set_products(&mut self, products: ProductSet) {
        self.enabled_products = products;
        self.updated_at = Utc::now();
    }
}
