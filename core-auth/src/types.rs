use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Account credentials for the password grant.
///
/// # Security
///
/// The `Debug` implementation redacts the password.
///
/// # Examples
///
/// ```
/// use core_auth::Credentials;
///
/// let credentials = Credentials::new("svc-sync@contoso.org", "hunter2");
/// assert!(!format!("{:?}", credentials).contains("hunter2"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A bearer token issued by the identity endpoint.
///
/// Tokens live for one connector operation and are never persisted.
///
/// # Examples
///
/// ```
/// use core_auth::AccessToken;
///
/// let token = AccessToken::new("eyJ0eXAi...".to_string(), 3599);
/// assert!(!token.is_expired());
/// ```
#[derive(Clone)]
pub struct AccessToken {
    /// Value for the `Authorization: Bearer` header
    pub token: String,
    /// When the token expires (UTC)
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Create a token expiring `expires_in` seconds from now
    pub fn new(token: String, expires_in: i64) -> Self {
        Self {
            token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    /// Check if the token is expired or will expire within a minute
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_buffer(60)
    }

    /// Check if the token is expired with a custom buffer
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(buffer_seconds)
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry() {
        let fresh = AccessToken::new("a".to_string(), 3600);
        assert!(!fresh.is_expired());

        let stale = AccessToken {
            token: "b".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(stale.is_expired());

        let nearly = AccessToken::new("c".to_string(), 30);
        assert!(nearly.is_expired());
        assert!(!nearly.is_expired_with_buffer(0));
    }

    #[test]
    fn test_debug_redacts() {
        let token = AccessToken::new("secret-token".to_string(), 60);
        assert!(!format!("{:?}", token).contains("secret-token"));

        let credentials = Credentials::new("a@b.org", "pw");
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("a@b.org"));
        assert!(!printed.contains("\"pw\""));
    }
}
