use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("IO failure: {0}")]
    Io(String),

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    #[error("Transfer of {name} failed: {source}")]
    TransferFailed {
        name: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("Provider error: {0}")]
    Provider(String),
}

impl SyncError {
    /// The error behind any `TransferFailed` wrapping.
    pub fn root(&self) -> &SyncError {
        match self {
            SyncError::TransferFailed { source, .. } => source.root(),
            other => other,
        }
    }

    /// True when the remote store could not be reached or refused the account.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            SyncError::Authentication(_) | SyncError::Provider(_) | SyncError::ConfigurationMissing(_)
        )
    }
}

impl From<BridgeError> for SyncError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::AuthenticationFailed(msg) => SyncError::Authentication(msg),
            BridgeError::NotFound(what) => SyncError::NotFound(what),
            BridgeError::PermissionDenied(msg) => SyncError::PermissionDenied(msg),
            BridgeError::Io(e) => SyncError::Io(e.to_string()),
            BridgeError::NotAvailable(msg) | BridgeError::OperationFailed(msg) => {
                SyncError::Provider(msg)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
