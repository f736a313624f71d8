//! # Host Bridge Traits
//!
//! Capability traits the sync core depends on, implemented per host.
//!
//! ## Overview
//!
//! This crate defines the contract between the synchronization core and the
//! concrete adapters that talk to the outside world. The core never touches
//! `reqwest`, `tokio::fs` or the Microsoft Graph API directly; it only sees
//! these traits, which keeps the selection and transfer logic testable with
//! in-memory fakes.
//!
//! ## Traits
//!
//! ### Networking & I/O
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with optional retry
//! - [`FileSystemAccess`](storage::FileSystemAccess) - Local directory listing and whole-file I/O
//!
//! ### Remote Storage
//! - [`DocumentStore`](storage::DocumentStore) - Folder-scoped list/download/upload against a
//!   remote document library
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Adapters
//! must map their native failures onto its taxonomy so callers can tell an
//! authentication failure from a missing folder or a rejected upload:
//!
//! - `AuthenticationFailed` - credentials rejected or identity endpoint unreachable
//! - `NotFound` - remote folder/file or local directory absent
//! - `PermissionDenied` - the remote refused a write
//! - `Io` - local read/write failure
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so handles can be shared behind `Arc`.
//!
//! ## Examples
//!
//! ### Implementing HttpClient
//!
//! ```ignore
//! use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
//! use bridge_traits::error::Result;
//! use async_trait::async_trait;
//!
//! pub struct MyHttpClient {
//!     client: reqwest::Client,
//! }
//!
//! #[async_trait]
//! impl HttpClient for MyHttpClient {
//!     async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
//!         // Implementation
//!         todo!()
//!     }
//! }
//! ```

pub mod error;
pub mod http;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use storage::{DocumentStore, FileKind, FileMetadata, FileSystemAccess, RemoteFile};
