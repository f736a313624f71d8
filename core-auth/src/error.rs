use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication against {authority} failed: {reason}")]
    AuthenticationFailed { authority: String, reason: String },

    #[error("Identity endpoint unreachable: {0}")]
    NetworkError(String),

    #[error("Invalid authentication configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Authentication error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
