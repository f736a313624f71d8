//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for hosts with a real file
//! system and direct network access (workstations, scheduled-task servers).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest` (rustls, connection pooling, optional retry)
//! - `FileSystemAccess` using `tokio::fs`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
//! use bridge_traits::http::RetryPolicy;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?.with_default_policy(RetryPolicy::none());
//!     let fs = TokioFileSystem::new();
//!     Ok(())
//! }
//! ```

mod filesystem;
mod http;

pub use filesystem::TokioFileSystem;
pub use http::ReqwestHttpClient;
