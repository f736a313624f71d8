//! # Sync Engine
//!
//! Moves files between a local directory and a remote document store folder.
//!
//! ## Workflow
//!
//! ### Download
//! 1. Check the local destination directory exists (no remote call otherwise)
//! 2. `ExactName`: fetch that one file without listing the folder
//! 3. `Pattern` / `All`: list the folder, skip names the selector rejects
//! 4. Write each fetched file to `destination/<name>` in a single write,
//!    overwriting any existing file
//!
//! ### Upload
//! 1. Enumerate regular files directly inside the local directory
//! 2. Skip names the filter rejects
//! 3. Read each remaining file whole and upload it under the same name
//!
//! Transfers run one after another; each is awaited before the next starts.
//! Nothing is retried here. Retries, when enabled, live in the HTTP client.
//!
//! ## Failures
//!
//! With [`FailurePolicy::AbortOnFirstFailure`] (the default) the first failed
//! file stops the batch and is returned as [`SyncError::TransferFailed`].
//! Files already written stay written. With
//! [`FailurePolicy::ContinueOnFailure`] every file is attempted and failures
//! are collected in the [`TransferReport`].
//!
//! An `ExactName` download is a single transfer: its error is returned as is.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_sync::{DownloadSelector, SyncEngine};
//!
//! let engine = SyncEngine::new(store, fs).with_events(event_bus);
//! let selector = DownloadSelector::from_parts(None, Some("PrEP"))?;
//! let report = engine
//!     .download("Tableau/Workbooks", Path::new("/data/workbooks"), &selector)
//!     .await?;
//! println!("{}", report.summary());
//! ```

use crate::error::{Result, SyncError};
use crate::local::{LocalFileEntry, LocalFileEnumerator};
use crate::report::{FailedFile, TransferReport, TransferredFile};
use crate::selection::{DownloadSelector, UploadFilter};
use bridge_traits::storage::{DocumentStore, FileSystemAccess};
use core_runtime::events::{CoreEvent, EventBus, TransferDirection, TransferEvent};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// What a multi-file batch does when one file fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failed file and return its error
    #[default]
    AbortOnFirstFailure,
    /// Attempt every file and record failures in the report
    ContinueOnFailure,
}

/// Sequential download/upload orchestrator.
///
/// Holds no state between calls: every call re-enumerates, and the store
/// re-authenticates for each of its operations.
pub struct SyncEngine {
    store: Arc<dyn DocumentStore>,
    fs: Arc<dyn FileSystemAccess>,
    local: LocalFileEnumerator,
    events: Option<EventBus>,
    failure_policy: FailurePolicy,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn DocumentStore>, fs: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            store,
            local: LocalFileEnumerator::new(fs.clone()),
            fs,
            events: None,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Publish [`TransferEvent`]s on `events` during each batch.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Download files from `remote_folder` into the existing directory
    /// `local_dest`.
    ///
    /// # Errors
    ///
    /// - `NotFound` when `local_dest` is missing, or for an `ExactName` that
    ///   does not exist remotely, or when the remote folder is absent
    /// - `Authentication` / `Provider` when the store cannot be reached
    /// - `TransferFailed` when a file of a multi-file batch fails under
    ///   [`FailurePolicy::AbortOnFirstFailure`]
    #[instrument(
        skip(self, selector),
        fields(folder = %remote_folder, dest = %local_dest.display(), selector = %selector.describe())
    )]
    pub async fn download(
        &self,
        remote_folder: &str,
        local_dest: &Path,
        selector: &DownloadSelector,
    ) -> Result<TransferReport> {
        let started = Instant::now();
        self.emit(TransferEvent::Started {
            direction: TransferDirection::Download,
            source: remote_folder.to_string(),
            destination: local_dest.display().to_string(),
        });

        let result = self
            .run_download(remote_folder, local_dest, selector)
            .await;
        self.finish(TransferDirection::Download, started, result)
    }

    /// Upload regular files from `local_dir` into the existing remote folder
    /// `remote_folder`.
    ///
    /// # Errors
    ///
    /// - `NotFound` when `local_dir` is missing, or when the remote folder
    ///   is absent
    /// - `Authentication` / `Provider` when the store cannot be reached
    /// - `TransferFailed` when a file fails under
    ///   [`FailurePolicy::AbortOnFirstFailure`]
    #[instrument(
        skip(self, filter),
        fields(dir = %local_dir.display(), folder = %remote_folder, filter = %filter.describe())
    )]
    pub async fn upload(
        &self,
        local_dir: &Path,
        remote_folder: &str,
        filter: &UploadFilter,
    ) -> Result<TransferReport> {
        let started = Instant::now();
        self.emit(TransferEvent::Started {
            direction: TransferDirection::Upload,
            source: local_dir.display().to_string(),
            destination: remote_folder.to_string(),
        });

        let result = self.run_upload(local_dir, remote_folder, filter).await;
        self.finish(TransferDirection::Upload, started, result)
    }

    async fn run_download(
        &self,
        remote_folder: &str,
        local_dest: &Path,
        selector: &DownloadSelector,
    ) -> Result<TransferReport> {
        self.ensure_local_dir(local_dest).await?;

        let mut report = TransferReport::new(TransferDirection::Download);

        if let DownloadSelector::ExactName(name) = selector {
            match self.download_one(remote_folder, local_dest, name).await {
                Ok(file) => self.record_success(&mut report, file),
                Err(e) => {
                    self.emit_file_failed(TransferDirection::Download, name, &e);
                    return Err(e);
                }
            }
            return Ok(report);
        }

        let files = self.store.list_files(remote_folder).await?;
        debug!(count = files.len(), "Listed remote folder");

        for file in files {
            if !selector.matches(&file.name) {
                debug!(name = %file.name, "Not selected");
                report.skipped.push(file.name);
                continue;
            }

            let outcome = self
                .download_one(remote_folder, local_dest, &file.name)
                .await;
            self.record_outcome(&mut report, file.name, outcome)?;
        }

        Ok(report)
    }

    async fn run_upload(
        &self,
        local_dir: &Path,
        remote_folder: &str,
        filter: &UploadFilter,
    ) -> Result<TransferReport> {
        let entries = match self.local.list_regular_files(local_dir).await {
            Err(SyncError::NotFound(_)) => {
                return Err(SyncError::NotFound(format!(
                    "local directory {}",
                    local_dir.display()
                )))
            }
            other => other?,
        };

        let mut report = TransferReport::new(TransferDirection::Upload);

        for entry in entries {
            if !filter.matches(&entry.name) {
                debug!(name = %entry.name, "Filtered out");
                report.skipped.push(entry.name);
                continue;
            }

            let outcome = self.upload_one(&entry, remote_folder).await;
            self.record_outcome(&mut report, entry.name, outcome)?;
        }

        Ok(report)
    }

    async fn download_one(
        &self,
        remote_folder: &str,
        local_dest: &Path,
        name: &str,
    ) -> Result<TransferredFile> {
        validate_file_name(name)?;

        let content = self.store.download_file(remote_folder, name).await?;
        let bytes = content.len() as u64;
        let target = local_dest.join(name);

        self.fs.write_file(&target, content).await?;
        debug!(name = %name, bytes, path = %target.display(), "Downloaded");

        Ok(TransferredFile {
            name: name.to_string(),
            bytes,
            destination: target.display().to_string(),
        })
    }

    async fn upload_one(&self, entry: &LocalFileEntry, remote_folder: &str) -> Result<TransferredFile> {
        let content = self.fs.read_file(&entry.path).await?;
        let bytes = content.len() as u64;

        let destination = self
            .store
            .upload_file(remote_folder, &entry.name, content)
            .await?;
        debug!(name = %entry.name, bytes, remote = %destination, "Uploaded");

        Ok(TransferredFile {
            name: entry.name.clone(),
            bytes,
            destination,
        })
    }

    async fn ensure_local_dir(&self, dir: &Path) -> Result<()> {
        if self.fs.is_dir(dir).await? {
            Ok(())
        } else {
            Err(SyncError::NotFound(format!(
                "local directory {}",
                dir.display()
            )))
        }
    }

    /// Apply the failure policy to one file of a multi-file batch.
    fn record_outcome(
        &self,
        report: &mut TransferReport,
        name: String,
        outcome: Result<TransferredFile>,
    ) -> Result<()> {
        match outcome {
            Ok(file) => {
                self.record_success(report, file);
                Ok(())
            }
            Err(error) => {
                self.emit_file_failed(report.direction, &name, &error);
                match self.failure_policy {
                    FailurePolicy::AbortOnFirstFailure => Err(SyncError::TransferFailed {
                        name,
                        source: Box::new(error),
                    }),
                    FailurePolicy::ContinueOnFailure => {
                        warn!(name = %name, error = %error, "Transfer failed, continuing");
                        report.failed.push(FailedFile { name, error });
                        Ok(())
                    }
                }
            }
        }
    }

    fn record_success(&self, report: &mut TransferReport, file: TransferredFile) {
        self.emit(TransferEvent::FileTransferred {
            direction: report.direction,
            name: file.name.clone(),
            bytes: file.bytes,
        });
        report.transferred.push(file);
    }

    fn finish(
        &self,
        direction: TransferDirection,
        started: Instant,
        result: Result<TransferReport>,
    ) -> Result<TransferReport> {
        match result {
            Ok(mut report) => {
                report.duration = started.elapsed();
                info!(
                    transferred = report.transferred.len(),
                    skipped = report.skipped.len(),
                    failed = report.failed.len(),
                    bytes = report.total_bytes(),
                    "{}",
                    report.summary()
                );
                self.emit(TransferEvent::Completed {
                    direction,
                    transferred: report.transferred.len(),
                    skipped: report.skipped.len(),
                    failed: report.failed.len(),
                    duration_ms: report.duration.as_millis() as u64,
                });
                Ok(report)
            }
            Err(error) => {
                warn!(error = %error, "{} failed", direction);
                self.emit(TransferEvent::Failed {
                    direction,
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    fn emit_file_failed(&self, direction: TransferDirection, name: &str, error: &SyncError) {
        self.emit(TransferEvent::FileFailed {
            direction,
            name: name.to_string(),
            message: error.to_string(),
        });
    }

    fn emit(&self, event: TransferEvent) {
        if let Some(events) = &self.events {
            // No subscribers is fine.
            events.emit(CoreEvent::Transfer(event)).ok();
        }
    }
}

/// Remote names become local path components; reject anything that would
/// escape the destination directory.
fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(SyncError::InvalidFileName(name.to_string()));
    }
    Ok(())
}
