//! # SharePoint Provider
//!
//! Implements the `DocumentStore` trait for a SharePoint document library
//! through Microsoft Graph v1.0.
//!
//! ## Overview
//!
//! This module provides:
//! - Site and document library resolution from the configured site URL
//! - Folder listing with paging, files only
//! - Whole-file downloads and simple (single request) uploads
//! - Mapping of Graph status codes onto the bridge error taxonomy
//!
//! Every operation authenticates afresh; no session outlives a call.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{GraphSession, SharePointConnector, SharePointLocation};
pub use error::{Result, SharePointError};
