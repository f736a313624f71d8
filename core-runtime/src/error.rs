use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file not found: {}", path.display())]
    ConfigurationMissing { path: PathBuf },

    #[error("Configuration section missing: [{0}]")]
    MissingSection(String),

    #[error("Configuration key missing: [{section}] {key}")]
    MissingKey { section: String, key: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
