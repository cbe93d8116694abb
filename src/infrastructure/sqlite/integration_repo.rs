use crate::domain::entities::integration::Integration;
use crate::domain::error::{DomainError, LookupError};
use crate::domain::ports::integration_directory::IntegrationDirectory;
use crate::domain::ports::integration_store::IntegrationStore;
use crate::domain::values::credential::AccessCredential;
use crate::domain::values::ids::{IntegrationId, PrincipalId};
use crate::domain::values::product::{Product, ProductSet};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Mutex, MutexGuard};

const SELECT_COLUMNS: &str =
    "SELECT id, principal_id, access_token, products, institution_name, created_at, updated_at FROM integrations";

/// SQLite-backed integration registry. Serves both the write side and the
/// directory lookups made during aggregation.
pub struct SqliteIntegrationRepo {
    conn: Mutex<Connection>,
}

impl SqliteIntegrationRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DomainError> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }

    /// Records a principal. Registering an existing principal is a no-op.
    pub fn register_principal(&self, principal: &PrincipalId) -> Result<(), DomainError> {
        let conn = self.lock()?;
        insert_principal(&conn, principal)
    }

    pub fn principal_exists(&self, principal: &PrincipalId) -> Result<bool, DomainError> {
        let conn = self.lock()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM principals WHERE id = ?1",
                params![principal.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn row_to_integration(row: &rusqlite::Row) -> Result<Integration, rusqlite::Error> {
        let id: String = row.get(0)?;
        let principal_id: String = row.get(1)?;
        let token: String = row.get(2)?;
        let products_json: String = row.get(3)?;
        let created_str: String = row.get(5)?;
        let updated_str: String = row.get(6)?;

        Ok(Integration {
            id: IntegrationId::new(id),
            principal_id: PrincipalId::new(principal_id),
            access_credential: AccessCredential::new(token),
            enabled_products: decode_products(&products_json),
            institution_name: row.get(4)?,
            created_at: parse_timestamp(&created_str),
            updated_at: parse_timestamp(&updated_str),
        })
    }
}

fn insert_principal(conn: &Connection, principal: &PrincipalId) -> Result<(), DomainError> {
    conn.execute(
        "INSERT OR IGNORE INTO principals (id, created_at) VALUES (?1, ?2)",
        params![principal.as_str(), Utc::now().to_rfc3339()],
    )
    .map_err(|e| DomainError::Database(format!("Failed to register principal: {e}")))?;
    Ok(())
}

fn encode_products(products: &ProductSet) -> Result<String, DomainError> {
    let names: Vec<String> = products.iter().map(Product::to_string).collect();
    serde_json::to_string(&names).map_err(|e| DomainError::Parse(e.to_string()))
}

fn decode_products(json: &str) -> ProductSet {
    let names: Vec<String> = serde_json::from_str(json).unwrap_or_default();
    Product::parse_known(names)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl IntegrationStore for SqliteIntegrationRepo {
    fn load(&self, id: &IntegrationId) -> Result<Option<Integration>, DomainError> {
        let conn = self.lock()?;
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let integration = conn
            .query_row(&sql, params![id.as_str()], Self::row_to_integration)
            .optional()?;
        Ok(integration)
    }

    fn save(&self, integration: &Integration) -> Result<(), DomainError> {
        let conn = self.lock()?;
        insert_principal(&conn, &integration.principal_id)?;
        conn.execute(
            "INSERT INTO integrations (id, principal_id, access_token, products, institution_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                access_token = excluded.access_token,
                products = excluded.products,
                institution_name = excluded.institution_name,
                updated_at = excluded.updated_at",
            params![
                integration.id.as_str(),
                integration.principal_id.as_str(),
                integration.access_credential.expose(),
                encode_products(&integration.enabled_products)?,
                integration.institution_name,
                integration.created_at.to_rfc3339(),
                integration.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save integration: {e}")))?;
        Ok(())
    }

    fn delete(&self, id: &IntegrationId) -> Result<(), DomainError> {
        let conn = self.lock()?;
        let rows = conn
            .execute("DELETE FROM integrations WHERE id = ?1", params![id.as_str()])
            .map_err(|e| DomainError::Database(format!("Failed to delete integration: {e}")))?;
        if rows == 0 {
            return Err(DomainError::NotFound(format!("Integration not found: {id}")));
        }
        Ok(())
    }

    fn list_for_principal(&self, principal: &PrincipalId) -> Result<Vec<Integration>, DomainError> {
        let conn = self.lock()?;
        let sql = format!("{SELECT_COLUMNS} WHERE principal_id = ?1 ORDER BY created_at ASC, id ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![principal.as_str()], Self::row_to_integration)?;
        let mut integrations = Vec::new();
        for row in rows {
            integrations.push(row?);
        }
        Ok(integrations)
    }
}

#[async_trait]
impl IntegrationDirectory for SqliteIntegrationRepo {
    async fn list(&self, principal: &PrincipalId) -> Result<Vec<Integration>, LookupError> {
        let unavailable = |e: DomainError| LookupError::Unavailable(e.to_string());
        if !self.principal_exists(principal).map_err(unavailable)? {
            return Err(LookupError::NotFound(principal.clone()));
        }
        self.list_for_principal(principal).map_err(unavailable)
    }
}
