use thiserror::Error;

/// Process exit status for a run that finished cleanly.
pub const EXIT_SUCCESS: i32 = 0;
/// Configuration could not be loaded, or the remote store could not be
/// reached or refused the account.
pub const EXIT_CONNECTION_FAILURE: i32 = 1;
/// A transfer failed.
pub const EXIT_TRANSFER_FAILURE: i32 = 2;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Authentication error: {0}")]
    Auth(#[from] core_auth::AuthError),

    #[error("SharePoint error: {0}")]
    SharePoint(#[from] provider_sharepoint::SharePointError),

    #[error("Sync error: {0}")]
    Sync(#[from] core_sync::SyncError),

    #[error("Notification failed: {0}")]
    Notification(String),
}

impl CoreError {
    /// Exit status the CLI reports for this error.
    pub fn exit_code(&self) -> i32 {
        use provider_sharepoint::SharePointError;

        match self {
            CoreError::InitializationFailed(_) | CoreError::Config(_) | CoreError::Auth(_) => {
                EXIT_CONNECTION_FAILURE
            }
            CoreError::SharePoint(SharePointError::Authentication(_))
            | CoreError::SharePoint(SharePointError::Bridge(_)) => EXIT_CONNECTION_FAILURE,
            CoreError::Sync(e) if e.is_connection_failure() => EXIT_CONNECTION_FAILURE,
            CoreError::SharePoint(_) | CoreError::Sync(_) | CoreError::Notification(_) => {
                EXIT_TRANSFER_FAILURE
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use core_sync::SyncError;

    #[test]
    fn test_exit_codes() {
        let missing = CoreError::from(core_runtime::Error::ConfigurationMissing {
            path: "config/config.json".into(),
        });
        assert_eq!(missing.exit_code(), EXIT_CONNECTION_FAILURE);

        let auth = CoreError::from(SyncError::Authentication("invalid_grant".into()));
        assert_eq!(auth.exit_code(), EXIT_CONNECTION_FAILURE);

        let not_found = CoreError::from(SyncError::NotFound("Tableau".into()));
        assert_eq!(not_found.exit_code(), EXIT_TRANSFER_FAILURE);

        // A network failure on one file of a batch is a transfer failure.
        let wrapped = CoreError::from(SyncError::TransferFailed {
            name: "a.csv".into(),
            source: Box::new(SyncError::Provider("timeout".into())),
        });
        assert_eq!(wrapped.exit_code(), EXIT_TRANSFER_FAILURE);
    }
}
