//! Resource-Owner Password Grant
//!
//! Exchanges a service account's username and password for a Microsoft Graph
//! access token at `{authority}/{tenant}/oauth2/v2.0/token`.
//!
//! # Security
//!
//! - Passwords and tokens are never logged
//! - Error bodies from the identity endpoint are reduced to their
//!   `error_description`, which never echoes credentials
//!
//! # Example
//!
//! ```no_run
//! use core_auth::{Authenticator, Credentials, PasswordGrantAuthenticator, PasswordGrantConfig};
//! use std::sync::Arc;
//!
//! # async fn example() -> core_auth::Result<()> {
//! # use bridge_traits::http::HttpClient;
//! # let http_client: Arc<dyn HttpClient> = todo!();
//! let config = PasswordGrantConfig::new("tenant-guid", "client-guid");
//! let credentials = Credentials::new("svc-sync@contoso.org", "...");
//!
//! let authenticator = PasswordGrantAuthenticator::new(config, credentials, http_client);
//! let token = authenticator.acquire_token().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AuthError, Result};
use crate::types::{AccessToken, Credentials};
use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default Microsoft identity platform host.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Scope granting the app's configured Graph permissions.
pub const GRAPH_DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Source of bearer tokens for remote API calls.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Obtain a fresh access token.
    ///
    /// # Errors
    ///
    /// - `AuthenticationFailed` when the identity endpoint rejects the
    ///   credentials or the app registration
    /// - `NetworkError` when the endpoint cannot be reached
    async fn acquire_token(&self) -> Result<AccessToken>;
}

/// App registration details for the password grant.
#[derive(Clone)]
pub struct PasswordGrantConfig {
    /// Directory (tenant) ID or verified domain
    pub tenant_id: String,
    /// Application (client) ID
    pub client_id: String,
    /// Only confidential client registrations need this
    pub client_secret: Option<String>,
    /// Requested scope; defaults to [`GRAPH_DEFAULT_SCOPE`]
    pub scope: String,
    /// Identity platform host; defaults to [`DEFAULT_AUTHORITY`]
    pub authority: String,
}

impl std::fmt::Debug for PasswordGrantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordGrantConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("scope", &self.scope)
            .field("authority", &self.authority)
            .finish()
    }
}

impl PasswordGrantConfig {
    pub fn new(tenant_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: None,
            scope: GRAPH_DEFAULT_SCOPE.to_string(),
            authority: DEFAULT_AUTHORITY.to_string(),
        }
    }

    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Token endpoint for this tenant.
    pub fn token_url(&self) -> Result<String> {
        if self.tenant_id.trim().is_empty() {
            return Err(AuthError::InvalidConfiguration(
                "tenant id cannot be empty".to_string(),
            ));
        }

        let base = Url::parse(&self.authority).map_err(|e| {
            AuthError::InvalidConfiguration(format!("Invalid authority URL: {}", e))
        })?;
        let url = base
            .join(&format!("{}/oauth2/v2.0/token", self.tenant_id.trim()))
            .map_err(|e| AuthError::InvalidConfiguration(format!("Invalid tenant id: {}", e)))?;

        Ok(url.to_string())
    }
}

/// Password-grant token client over the shared [`HttpClient`].
pub struct PasswordGrantAuthenticator {
    config: PasswordGrantConfig,
    credentials: Credentials,
    http_client: Arc<dyn HttpClient>,
}

impl PasswordGrantAuthenticator {
    pub fn new(
        config: PasswordGrantConfig,
        credentials: Credentials,
        http_client: Arc<dyn HttpClient>,
    ) -> Self {
        Self {
            config,
            credentials,
            http_client,
        }
    }

    fn encode_body(&self) -> Result<String> {
        let mut params = vec![
            ("grant_type", "password"),
            ("client_id", self.config.client_id.as_str()),
            ("username", self.credentials.username.as_str()),
            ("password", self.credentials.password.as_str()),
            ("scope", self.config.scope.as_str()),
        ];

        if let Some(ref client_secret) = self.config.client_secret {
            params.push(("client_secret", client_secret.as_str()));
        }

        serde_urlencoded::to_string(&params)
            .map_err(|e| AuthError::Other(format!("Failed to encode token request: {}", e)))
    }
}

#[async_trait]
impl Authenticator for PasswordGrantAuthenticator {
    #[instrument(skip(self), fields(tenant = %self.config.tenant_id))]
    async fn acquire_token(&self) -> Result<AccessToken> {
        let token_url = self.config.token_url()?;
        let request = HttpRequest::new(HttpMethod::Post, token_url).form(self.encode_body()?);

        debug!("Requesting access token");

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        if !response.is_success() {
            let status = response.status;
            let reason = match response.json::<TokenErrorResponse>() {
                Ok(body) => body.describe(),
                Err(_) => format!("identity endpoint returned {}", status),
            };

            warn!(status = status, reason = %reason, "Token request rejected");

            return Err(AuthError::AuthenticationFailed {
                authority: self.config.authority.clone(),
                reason,
            });
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::Other(format!("Failed to parse token response: {}", e)))?;

        debug!(expires_in = token_response.expires_in, "Access token issued");

        Ok(AccessToken::new(
            token_response.access_token,
            token_response.expires_in,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

/// Error body returned by the identity endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenErrorResponse {
    fn describe(&self) -> String {
        match &self.error_description {
            // Descriptions carry a trace/correlation suffix after the first line.
            Some(description) => format!(
                "{}: {}",
                self.error,
                description.lines().next().unwrap_or_default()
            ),
            None => self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn authenticator(http: MockHttpClient) -> PasswordGrantAuthenticator {
        PasswordGrantAuthenticator::new(
            PasswordGrantConfig::new("contoso.onmicrosoft.com", "client-123"),
            Credentials::new("svc-sync@contoso.org", "p@ss word"),
            Arc::new(http),
        )
    }

    #[test]
    fn test_token_url() {
        let config = PasswordGrantConfig::new("tenant-guid", "client");
        assert_eq!(
            config.token_url().unwrap(),
            "https://login.microsoftonline.com/tenant-guid/oauth2/v2.0/token"
        );

        let empty = PasswordGrantConfig::new("  ", "client");
        assert!(matches!(
            empty.token_url(),
            Err(AuthError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_acquire_token_sends_password_grant() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                let body = String::from_utf8(request.body.clone().unwrap().to_vec()).unwrap();
                request.method == HttpMethod::Post
                    && request.url.ends_with("/contoso.onmicrosoft.com/oauth2/v2.0/token")
                    && body.contains("grant_type=password")
                    && body.contains("username=svc-sync%40contoso.org")
                    && body.contains("password=p%40ss+word")
                    && body.contains("scope=https%3A%2F%2Fgraph.microsoft.com%2F.default")
                    && !body.contains("client_secret")
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"token_type":"Bearer","access_token":"tok-1","expires_in":3599}"#,
                ))
            });

        let token = authenticator(http).acquire_token().await.unwrap();
        assert_eq!(token.as_str(), "tok-1");
        assert!(!token.is_expired());
    }

    #[tokio::test]
    async fn test_client_secret_included_when_configured() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .withf(|request| {
                let body = String::from_utf8(request.body.clone().unwrap().to_vec()).unwrap();
                body.contains("client_secret=shh")
            })
            .returning(|_| Ok(response(200, r#"{"access_token":"t"}"#)));

        let authenticator = PasswordGrantAuthenticator::new(
            PasswordGrantConfig::new("t", "c").with_client_secret("shh"),
            Credentials::new("u", "p"),
            Arc::new(http),
        );

        let token = authenticator.acquire_token().await.unwrap();
        assert_eq!(token.as_str(), "t");
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let mut http = MockHttpClient::new();
        http.expect_execute().returning(|_| {
            Ok(response(
                400,
                r#"{"error":"invalid_grant","error_description":"AADSTS50126: Invalid username or password.\r\nTrace ID: abc"}"#,
            ))
        });

        match authenticator(http).acquire_token().await {
            Err(AuthError::AuthenticationFailed { reason, .. }) => {
                assert!(reason.starts_with("invalid_grant: AADSTS50126"));
                assert!(!reason.contains("Trace ID"));
            }
            other => panic!("expected AuthenticationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let mut http = MockHttpClient::new();
        http.expect_execute().returning(|_| {
            Err(BridgeError::OperationFailed(
                "Connection failed: dns error".to_string(),
            ))
        });

        assert!(matches!(
            authenticator(http).acquire_token().await,
            Err(AuthError::NetworkError(_))
        ));
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .returning(|_| Ok(response(503, "<html>busy</html>")));

        match authenticator(http).acquire_token().await {
            Err(AuthError::AuthenticationFailed { reason, .. }) => {
                assert!(reason.contains("503"));
            }
            other => panic!("expected AuthenticationFailed, got {:?}", other),
        }
    }
}
