//! # Authentication Module
//!
//! Acquires Microsoft Graph access tokens for the SharePoint connector.
//!
//! ## Overview
//!
//! Sync jobs run unattended under a service account, so tokens are obtained
//! with the OAuth 2.0 resource-owner password grant against the tenant's
//! identity endpoint. Tokens are never cached: the connector asks for a fresh
//! one at the start of every operation.
//!
//! ## Features
//!
//! - [`Authenticator`] trait so connectors can be tested without a tenant
//! - [`PasswordGrantAuthenticator`] built on the shared `HttpClient` bridge
//! - Credential and token types whose `Debug` output never leaks secrets

pub mod error;
pub mod password;
pub mod types;

pub use error::{AuthError, Result};
pub use password::{Authenticator, PasswordGrantAuthenticator, PasswordGrantConfig};
pub use types::{AccessToken, Credentials};
