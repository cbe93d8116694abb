use crate::domain::error::{DomainError, FetchError};
use crate::domain::values::credential::AccessCredential;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Error codes that mean the stored access token can no longer be used
/// until the user re-links the institution.
const CREDENTIAL_ERROR_CODES: [&str; 4] = [
    "ITEM_LOGIN_REQUIRED",
    "INVALID_ACCESS_TOKEN",
    "ACCESS_NOT_GRANTED",
    "ITEM_NOT_FOUND",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaidEnvironment {
    #[default]
    Sandbox,
    Development,
    Production,
}

impl PlaidEnvironment {
    pub fn base_url(&self) -> String {
        format!("https://{self}.plaid.com")
    }
}

impl fmt::Display for PlaidEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaidEnvironment::Sandbox => write!(f, "sandbox"),
            PlaidEnvironment::Development => write!(f, "development"),
            PlaidEnvironment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for PlaidEnvironment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sandbox" => Ok(PlaidEnvironment::Sandbox),
            "development" => Ok(PlaidEnvironment::Development),
            "production" => Ok(PlaidEnvironment::Production),
            other => Err(DomainError::Config(format!("Unknown Plaid environment: {other}"))),
        }
    }
}

#[derive(Clone)]
pub struct PlaidConfig {
    pub client_id: String,
    pub secret: String,
    pub environment: PlaidEnvironment,
}

impl fmt::Debug for PlaidConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaidConfig")
            .field("client_id", &self.client_id)
            .field("secret", &"****")
            .field("environment", &self.environment)
            .finish()
    }
}

/// Error object Plaid returns in the body of every non-2xx response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaidErrorBody {
    #[serde(default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    client_id: &'a str,
    secret: &'a str,
    access_token: &'a str,
    #[serde(flatten)]
    body: &'a T,
}

/// Thin JSON-over-HTTPS client shared by the product fetchers.
pub struct PlaidClient {
    client: Client,
    base_url: String,
    client_id: String,
    secret: String,
    timeout: Duration,
}

impl PlaidClient {
    pub fn new(config: PlaidConfig, timeout: Duration) -> Self {
        Self::with_base_url(config.environment.base_url(), config, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, config: PlaidConfig, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .user_agent("OpenFolio/0.1")
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_id: config.client_id,
            secret: config.secret,
            timeout,
        }
    }

    pub async fn post<Req, Resp>(
        &self,
        path: &str,
        credential: &AccessCredential,
        body: &Req,
    ) -> Result<Resp, FetchError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        if credential.is_blank() {
            return Err(FetchError::invalid_credential("access token is empty"));
        }
        let url = format!("{}{path}", self.base_url);
        let envelope = Envelope {
            client_id: &self.client_id,
            secret: &self.secret,
            access_token: credential.expose(),
            body,
        };

        let resp = self
            .client
            .post(&url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| self.transport_error(path, e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let body: Option<PlaidErrorBody> = serde_json::from_str(&text).ok();
            return Err(classify_error(status, body.as_ref()));
        }

        resp.json::<Resp>()
            .await
            .map_err(|e| FetchError::malformed(format!("{path}: {e}")))
    }

    fn transport_error(&self, path: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::timeout(self.timeout)
        } else {
            FetchError::network(format!("{path}: {e}"))
        }
    }
}

/// Maps a non-2xx Plaid response to a typed fetch error.
pub fn classify_error(status: StatusCode, body: Option<&PlaidErrorBody>) -> FetchError {
    let code = body.and_then(|b| b.error_code.as_deref()).unwrap_or("");
    let message = body
        .and_then(|b| b.error_message.as_deref())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error"));
    let reason = if code.is_empty() {
        format!("HTTP {}: {message}", status.as_u16())
    } else {
        format!("{code}: {message}")
    };

    if status == StatusCode::TOO_MANY_REQUESTS || code == "RATE_LIMIT_EXCEEDED" {
        return FetchError::rate_limited(reason);
    }
    if CREDENTIAL_ERROR_CODES.contains(&code) {
        return FetchError::invalid_credential(reason);
    }
    if code == "PRODUCT_NOT_READY" {
        return FetchError::provider(reason, true);
    }
    FetchError::provider(reason, status.is_server_error())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::FetchErrorKind;

    fn body(code: &str) -> PlaidErrorBody {
        PlaidErrorBody {
            error_type: Some("ITEM_ERROR".into()),
            error_code: Some(code.into()),
            error_message: Some("something happened".into()),
        }
    }

    #[test]
    fn test_rate_limit_by_status_or_code() {
        let e = classify_error(StatusCode::TOO_MANY_REQUESTS, None);
        assert_eq!(e.kind, FetchErrorKind::RateLimited);
        assert!(e.retryable);
        let e = classify_error(StatusCode::BAD_REQUEST, Some(&body("RATE_LIMIT_EXCEEDED")));
        assert_eq!(e.kind, FetchErrorKind::RateLimited);
    }

    #[test]
    fn test_login_required_is_invalid_credential() {
        let e = classify_error(StatusCode::BAD_REQUEST, Some(&body("ITEM_LOGIN_REQUIRED")));
        assert_eq!(e.kind, FetchErrorKind::InvalidCredential);
        assert!(!e.retryable);
        assert!(e.reason.starts_with("ITEM_LOGIN_REQUIRED"));
    }

    #[test]
    fn test_product_not_ready_is_retryable() {
        let e = classify_error(StatusCode::BAD_REQUEST, Some(&body("PRODUCT_NOT_READY")));
        assert_eq!(e.kind, FetchErrorKind::Provider);
        assert!(e.retryable);
    }

    #[test]
    fn test_server_errors_retryable_client_errors_not() {
        let e = classify_error(StatusCode::BAD_GATEWAY, None);
        assert_eq!(e.kind, FetchErrorKind::Provider);
        assert!(e.retryable);
        assert!(e.reason.contains("502"));
        let e = classify_error(StatusCode::BAD_REQUEST, Some(&body("INVALID_FIELD")));
        assert!(!e.retryable);
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(PlaidEnvironment::Sandbox.base_url(), "https://sandbox.plaid.com");
        let env: PlaidEnvironment = "Production".parse().unwrap();
        assert_eq!(env.base_url(), "https://production.plaid.com");
        assert!("staging".parse::<PlaidEnvironment>().is_err());
    }

    #[test]
    fn test_config_debug_hides_secret() {
        let config = PlaidConfig {
            client_id: "cid".into(),
            secret: "super-secret".into(),
            environment: PlaidEnvironment::Sandbox,
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[tokio::test]
    async fn test_blank_credential_short_circuits() {
        let client = PlaidClient::with_base_url(
            "http://127.0.0.1:9",
            PlaidConfig {
                client_id: "cid".into(),
                secret: "s".into(),
                environment: PlaidEnvironment::Sandbox,
            },
            Duration::from_secs(1),
        );
        let result: Result<serde_json::Value, _> = client
            .post("/liabilities/get", &AccessCredential::new("  "), &serde_json::json!({}))
            .await;
        assert_eq!(result.unwrap_err().kind, FetchErrorKind::InvalidCredential);
    }
}
