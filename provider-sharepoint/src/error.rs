//! Error types for SharePoint provider

use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

/// SharePoint provider errors
#[derive(Error, Debug)]
pub enum SharePointError {
    /// Token acquisition failed or Graph rejected the token
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Site, library, folder or file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Graph refused the operation for this account
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Graph returned an unexpected status
    #[error("Graph API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Graph throttled the request
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Folder or file name that cannot be addressed
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Bridge error
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Result type for SharePoint operations
pub type Result<T> = std::result::Result<T, SharePointError>;

impl From<AuthError> for SharePointError {
    fn from(error: AuthError) -> Self {
        SharePointError::Authentication(error.to_string())
    }
}

impl From<SharePointError> for BridgeError {
    fn from(error: SharePointError) -> Self {
        match error {
            SharePointError::Authentication(msg) => BridgeError::AuthenticationFailed(msg),
            SharePointError::NotFound(what) => BridgeError::NotFound(what),
            SharePointError::PermissionDenied(msg) => BridgeError::PermissionDenied(msg),
            SharePointError::Bridge(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
