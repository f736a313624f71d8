//! Local directory enumeration for uploads.

use crate::error::{Result, SyncError};
use bridge_traits::error::BridgeError;
use bridge_traits::storage::FileSystemAccess;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// A regular file found directly inside an upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFileEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Lists the regular files of a single directory level.
///
/// Sub-directories, symlinks and special files are never returned, and
/// nothing below the top level is visited. Results are sorted by name so
/// repeated runs process files in the same order.
#[derive(Clone)]
pub struct LocalFileEnumerator {
    fs: Arc<dyn FileSystemAccess>,
}

impl LocalFileEnumerator {
    pub fn new(fs: Arc<dyn FileSystemAccess>) -> Self {
        Self { fs }
    }

    /// # Errors
    ///
    /// `NotFound` when `dir` does not exist or is not a directory.
    pub async fn list_regular_files(&self, dir: &Path) -> Result<Vec<LocalFileEntry>> {
        if !self.fs.is_dir(dir).await? {
            return Err(SyncError::NotFound(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut entries = Vec::new();

        for path in self.fs.list_directory(dir).await? {
            let metadata = match self.fs.metadata(&path).await {
                Ok(metadata) => metadata,
                // Removed between listing and inspection.
                Err(BridgeError::NotFound(_)) => {
                    trace!(path = %path.display(), "Entry vanished during enumeration");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if !metadata.is_regular_file() {
                trace!(path = %path.display(), kind = ?metadata.kind, "Skipping non-regular entry");
                continue;
            }

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                debug!(path = %path.display(), "Skipping entry with non UTF-8 name");
                continue;
            };

            entries.push(LocalFileEntry {
                name: name.to_string(),
                path: path.clone(),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(dir = %dir.display(), count = entries.len(), "Enumerated local files");
        Ok(entries)
    }
}
