use crate::domain::values::ids::PrincipalId;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Database(e.to_string())
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}

/// Integration directory lookup failure. The only request-fatal error class.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    #[error("Principal not found: {0}")]
    NotFound(PrincipalId),

    #[error("Integration directory unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    /// Revoked, expired or otherwise unusable access credential
    InvalidCredential,
    RateLimited,
    Timeout,
    /// Provider-side error response
    Provider,
    /// Transport failure before a response arrived
    Network,
    /// Response arrived but could not be decoded
    Malformed,
}

/// Failure of one fetch against one source. Recovered locally by the engine.
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {reason}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub reason: String,
    pub retryable: bool,
}

impl FetchError {
    pub fn new(kind: FetchErrorKind, reason: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind,
            reason: reason.into(),
            retryable,
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::new(
            FetchErrorKind::Timeout,
            format!("no response within {}ms", after.as_millis()),
            true,
        )
    }

    pub fn invalid_credential(reason: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::InvalidCredential, reason, false)
    }

    pub fn rate_limited(reason: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::RateLimited, reason, true)
    }

    pub fn network(reason: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Network, reason, true)
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Malformed, reason, false)
    }

    pub fn provider(reason: impl Into<String>, retryable: bool) -> Self {
        Self::new(FetchErrorKind::Provider, reason, retryable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    /// The fragment's primary account identifier could not be determined.
    #[error("{context}: account without an account_id was skipped")]
    MissingAccountId { context: &'static str },
}

/// Request-level aggregation failure.
#[derive(Debug, Error)]
pub enum AggregationError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("Aggregation did not complete within {0:?}")]
    DeadlineExceeded(Duration),
}

impl AggregationError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, AggregationError::Lookup(LookupError::NotFound(_)))
    }
}
