//! # Document Sync
//!
//! Transfers files between a local directory and a remote document store.
//!
//! ## Components
//!
//! - **Selection** (`selection`): download selectors and upload filters
//! - **Local enumeration** (`local`): regular files of one directory level
//! - **Sync engine** (`engine`): sequential download/upload batches with a
//!   configurable failure policy
//! - **Reports** (`report`): per-batch outcome

pub mod engine;
pub mod error;
pub mod local;
pub mod report;
pub mod selection;

pub use engine::{FailurePolicy, SyncEngine};
pub use error::{Result, SyncError};
pub use local::{LocalFileEntry, LocalFileEnumerator};
pub use report::{FailedFile, TransferReport, TransferredFile};
pub use selection::{DownloadSelector, UploadFilter, NO_FILTER_LITERAL};
