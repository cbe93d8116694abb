use crate::application::aggregate::DEFAULT_FETCH_TIMEOUT;
use crate::domain::error::DomainError;
use crate::domain::ports::source_fetcher::FetchParams;
use crate::infrastructure::plaid::client::{PlaidConfig, PlaidEnvironment};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "./openfolio.db";
pub const DEFAULT_DIRECTORY_URL: &str = "http://localhost:8083";

/// Where integrations are looked up during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryKind {
    /// The local SQLite registry also used by `link`/`unlink`.
    Sqlite,
    /// A remote integration service.
    Http { base_url: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub directory: DirectoryKind,
    pub plaid: PlaidConfig,
    pub fetch_timeout: Duration,
    pub fetch: FetchParams,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Unset and empty values
    /// fall back to defaults; values that do not parse are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let directory = match get("OPENFOLIO_DIRECTORY").as_deref().map(str::trim) {
            None | Some("sqlite") => DirectoryKind::Sqlite,
            Some("http") => DirectoryKind::Http {
                base_url: get("OPENFOLIO_DIRECTORY_URL")
                    .unwrap_or_else(|| DEFAULT_DIRECTORY_URL.to_string()),
            },
            Some(other) => {
                return Err(DomainError::Config(format!(
                    "OPENFOLIO_DIRECTORY must be 'sqlite' or 'http', got '{other}'"
                )))
            }
        };

        let environment: PlaidEnvironment = match get("PLAID_ENV") {
            Some(env) => env.parse()?,
            None => PlaidEnvironment::default(),
        };

        let defaults = FetchParams::default();
        let timeout_secs = parse_or(&get, "OPENFOLIO_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT.as_secs())?;
        if timeout_secs == 0 {
            return Err(DomainError::Config(
                "OPENFOLIO_FETCH_TIMEOUT_SECS must be greater than zero".into(),
            ));
        }

        Ok(Self {
            db_path: get("OPENFOLIO_DB").unwrap_or_else(|| DEFAULT_DB_PATH.to_string()),
            directory,
            plaid: PlaidConfig {
                client_id: get("PLAID_CLIENT_ID").unwrap_or_default(),
                secret: get("PLAID_SECRET").unwrap_or_default(),
                environment,
            },
            fetch_timeout: Duration::from_secs(timeout_secs),
            fetch: FetchParams {
                count: parse_or(&get, "OPENFOLIO_FETCH_COUNT", defaults.count)?,
                max_pages: parse_or(&get, "OPENFOLIO_MAX_PAGES", defaults.max_pages)?,
                lookback_days: parse_or(&get, "OPENFOLIO_LOOKBACK_DAYS", defaults.lookback_days)?,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, DomainError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DomainError::Config(format!("{key} is not a valid number: '{raw}'"))),
        None => Ok(default),
    }
}
