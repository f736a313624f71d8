//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the sync crates:
//! - Logging and tracing infrastructure
//! - Configuration file loading and typed sections
//! - Event bus for transfer progress
//!
//! ## Overview
//!
//! Every other crate in the workspace depends on this one for its logging
//! conventions and configuration types. Nothing here performs network or
//! file transfers itself.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
