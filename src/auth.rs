use crate::error::{ClientError, ClientResult};
use crate::models::TokenResponse;
use base64::{engine::general_purpose, Engine};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::fmt;
use tokio::sync::Mutex;
use url::Url;

/// Refresh cached tokens this long before they expire
const REFRESH_LEEWAY_SECS: i64 = 60;

/// Bearer credentials for one or more requests
#[derive(Clone, PartialEq)]
pub struct AuthToken {
    access_token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl AuthToken {
    pub fn new(access_token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether the token expires within `leeway` from now.
    /// Tokens without expiry never expire.
    pub fn is_expired(&self, leeway: Duration) -> bool {
        match self.expires_at {
            Some(at) => match at.checked_sub_signed(leeway) {
                Some(refresh_at) => refresh_at <= Utc::now(),
                None => true,
            },
            None => false,
        }
    }

    /// Value for the `Authorization` header
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Supplies bearer credentials to the client
///
/// Implementations may cache or refresh tokens; the client calls
/// `resolve_token` once per request and never mutates the result.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn resolve_token(&self) -> ClientResult<AuthToken>;
}

/// Fixed bearer token
#[derive(Debug, Clone)]
pub struct StaticToken {
    token: AuthToken,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AuthToken::new(token, None),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn resolve_token(&self) -> ClientResult<AuthToken> {
        if self.token.access_token.is_empty() {
            return Err(ClientError::auth_error("empty bearer token"));
        }
        Ok(self.token.clone())
    }
}

/// OAuth2 client-credentials grant with an in-memory token cache
pub struct ClientCredentials {
    http: reqwest::Client,
    token_url: Url,
    client_id: String,
    client_secret: String,
    cached: Mutex<Option<AuthToken>>,
}

impl ClientCredentials {
    pub fn new(
        token_url: impl AsRef<str>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Self::with_client(http, token_url, client_id, client_secret)
    }

    /// Use a custom reqwest client for token requests
    pub fn with_client(
        http: reqwest::Client,
        token_url: impl AsRef<str>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ClientResult<Self> {
        Ok(Self {
            http,
            token_url: Url::parse(token_url.as_ref())?,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cached: Mutex::new(None),
        })
    }

    async fn fetch_token(&self) -> ClientResult<AuthToken> {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());

        debug!("HTTP POST {} (client_credentials)", self.token_url);
        let response = self
            .http
            .post(self.token_url.clone())
            .query(&[("grant_type", "client_credentials")])
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", encoded))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ClientError::auth_error(format!("token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::auth_error(format!(
                "token endpoint returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ClientError::auth_error(format!("invalid token response: {}", e)))?;

        let expires_at = token.expires_in.and_then(expiry_from_now);
        info!("Acquired access token for client {}", self.client_id);
        Ok(AuthToken::new(token.access_token, expires_at))
    }
}

/// Absolute expiry for `expires_in` seconds from now.
/// Lifetimes beyond the representable date range are treated as non-expiring.
fn expiry_from_now(expires_in: u64) -> Option<DateTime<Utc>> {
    let expiry = i64::try_from(expires_in)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
    if expiry.is_none() {
        debug!("Token lifetime of {}s is out of range, treating as non-expiring", expires_in);
    }
    expiry
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[async_trait::async_trait]
impl TokenProvider for ClientCredentials {
    async fn resolve_token(&self) -> ClientResult<AuthToken> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if !token.is_expired(Duration::seconds(REFRESH_LEEWAY_SECS)) {
                return Ok(token.clone());
            }
            debug!("Cached token for client {} is about to expire", self.client_id);
        }

        let token = self.fetch_token().await?;
        *cached = Some(token.clone());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_without_expiry_never_expires() {
        let token = AuthToken::new("abc", None);
        assert!(!token.is_expired(Duration::seconds(REFRESH_LEEWAY_SECS)));
        assert_eq!(token.bearer(), "Bearer abc");
    }

    #[test]
    fn test_token_expiry_honours_leeway() {
        let token = AuthToken::new("abc", Some(Utc::now() + Duration::seconds(30)));
        assert!(!token.is_expired(Duration::zero()));
        assert!(token.is_expired(Duration::seconds(REFRESH_LEEWAY_SECS)));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = AuthToken::new("super-secret", None);
        assert!(!format!("{:?}", token).contains("super-secret"));

        let creds = ClientCredentials::new("https://auth.example.com/oauth/token", "id", "hunter2")
            .unwrap();
        assert!(!format!("{:?}", creds).contains("hunter2"));
    }

    #[test]
    fn test_expiry_from_now_handles_huge_lifetimes() {
        assert!(expiry_from_now(3600).is_some());
        assert_eq!(expiry_from_now(10_000_000_000_000), None);
        assert_eq!(expiry_from_now(u64::MAX), None);
    }

    #[tokio::test]
    async fn test_static_token_rejects_empty() {
        let err = StaticToken::new("").resolve_token().await.unwrap_err();
        assert!(matches!(err, ClientError::Authentication(_)));
    }
}
