use crate::domain::entities::integration::Integration;
use crate::domain::error::LookupError;
use crate::domain::ports::integration_directory::IntegrationDirectory;
use crate::domain::values::credential::AccessCredential;
use crate::domain::values::ids::{IntegrationId, PrincipalId};
use crate::domain::values::product::Product;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const PRINCIPAL_HEADER: &str = "X-User-Id";
const PLAID_INTEGRATIONS_PATH: &str = "/api/v1/integrations/plaid";

/// Reads a principal's integrations from a remote integration service.
pub struct HttpIntegrationDirectory {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntegrationDto {
    id: serde_json::Value,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    products: Vec<String>,
    #[serde(default)]
    institution_name: Option<String>,
}

impl HttpIntegrationDirectory {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent("OpenFolio/0.1")
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Entries without a usable access token cannot be fetched and are skipped.
fn into_integration(principal: &PrincipalId, dto: IntegrationDto) -> Option<Integration> {
    let token = dto.access_token.filter(|t| !t.trim().is_empty())?;
    let id = match dto.id {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => return None,
        other => other.to_string(),
    };
    let now = Utc::now();
    Some(Integration {
        id: IntegrationId::new(id),
        principal_id: principal.clone(),
        access_credential: AccessCredential::new(token),
        enabled_products: Product::parse_known(&dto.products),
        institution_name: dto.institution_name,
        created_at: now,
        updated_at: now,
    })
}

#[async_trait]
impl IntegrationDirectory for HttpIntegrationDirectory {
    async fn list(&self, principal: &PrincipalId) -> Result<Vec<Integration>, LookupError> {
        let url = format!("{}{PLAID_INTEGRATIONS_PATH}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header(PRINCIPAL_HEADER, principal.as_str())
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(format!("integration service: {e}")))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(principal.clone()));
        }
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!(
                "integration service returned {status}"
            )));
        }

        let dtos: Vec<IntegrationDto> = resp
            .json()
            .await
            .map_err(|e| LookupError::Unavailable(format!("integration service body: {e}")))?;
        let total = dtos.len();
        let integrations: Vec<Integration> = dtos
            .into_iter()
            .filter_map(|dto| into_integration(principal, dto))
            .collect();
        if integrations.len() < total {
            tracing::debug!(
                principal = %principal,
                skipped = total - integrations.len(),
                "integrations without access token skipped"
            );
        }
        Ok(integrations)
    }
}
