//! Storage and File System Abstractions
//!
//! Provides the local file system trait used for staging transfers and the
//! remote document store trait implemented by cloud providers.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Kind of a directory entry, as seen without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Symlink,
    Other,
}

/// File metadata information
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub size: u64,
    pub modified_at: Option<i64>,
    pub kind: FileKind,
}

impl FileMetadata {
    /// True only for regular files; symlinks report `false` even when they
    /// point at a file.
    pub fn is_regular_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

/// File system access trait
///
/// Abstracts the handful of local file operations a sync run needs. Writes
/// are whole-buffer and never create missing parent directories: a missing
/// destination directory is reported as an error instead.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::FileSystemAccess;
///
/// async fn stage(fs: &dyn FileSystemAccess, dir: &Path, data: Bytes) -> Result<()> {
///     fs.write_file(&dir.join("extract.csv"), data).await
/// }
/// ```
#[async_trait]
pub trait FileSystemAccess: Send + Sync {
    /// Check if a file or directory exists
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Get metadata for a path without following symlinks
    async fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    /// Whether `path` resolves to a directory, following symlinks
    ///
    /// A missing path is `Ok(false)`, not an error.
    async fn is_dir(&self, path: &Path) -> Result<bool>;

    /// Read entire file contents into memory
    async fn read_file(&self, path: &Path) -> Result<Bytes>;

    /// Write data to a file in a single call, replacing any existing content
    ///
    /// The parent directory must already exist.
    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()>;

    /// List the immediate entries of a directory
    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>>;
}

/// A file enumerated from a remote document store folder.
///
/// Produced by [`DocumentStore::list_files`] and consumed within the same
/// sync call; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Provider-specific opaque handle
    pub id: String,
    /// File name, unique within its parent folder
    pub name: String,
    /// Size in bytes, when reported
    pub size: Option<u64>,
    /// Last modification time as a Unix timestamp, when reported
    pub modified_at: Option<i64>,
}

impl RemoteFile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: None,
            modified_at: None,
        }
    }
}

/// Remote document store trait
///
/// Folder-scoped primitives over a cloud document library. Folder paths are
/// slash-separated and relative to the library root, e.g.
/// `"Tableau/Workbooks"`.
///
/// Implementations authenticate at the start of every call; no session is
/// shared between calls.
///
/// # Errors
///
/// - `AuthenticationFailed` when credentials are rejected or the identity
///   endpoint cannot be reached
/// - `NotFound` when the folder or file does not exist
/// - `PermissionDenied` when the remote refuses a write
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List the files (not sub-folders) directly inside `folder`.
    async fn list_files(&self, folder: &str) -> Result<Vec<RemoteFile>>;

    /// Fetch the full content of `folder/name`.
    async fn download_file(&self, folder: &str, name: &str) -> Result<Bytes>;

    /// Create or overwrite `folder/name`, returning the remote path written.
    ///
    /// The folder must already exist; implementations never create it.
    async fn upload_file(&self, folder: &str, name: &str, content: Bytes) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_metadata_kinds() {
        let file = FileMetadata {
            size: 1024,
            modified_at: Some(1234567900),
            kind: FileKind::File,
        };
        let link = FileMetadata {
            size: 12,
            modified_at: None,
            kind: FileKind::Symlink,
        };

        assert!(file.is_regular_file());
        assert!(!file.is_directory());
        assert!(!link.is_regular_file());
    }

    #[test]
    fn test_remote_file_new() {
        let file = RemoteFile::new("01ABC", "PrEP_Q1.twbx");
        assert_eq!(file.id, "01ABC");
        assert_eq!(file.name, "PrEP_Q1.twbx");
        assert_eq!(file.size, None);
    }
}
