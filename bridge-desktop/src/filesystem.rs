//! File System Access Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::{FileKind, FileMetadata, FileSystemAccess},
};
use bytes::Bytes;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tokio-based file system implementation
///
/// Thin wrapper over `tokio::fs`. Missing paths are reported as
/// `BridgeError::NotFound` carrying the offending path; every other failure
/// is passed through as `BridgeError::Io`.
#[derive(Debug, Clone, Default)]
pub struct TokioFileSystem;

impl TokioFileSystem {
    pub fn new() -> Self {
        Self
    }

    fn map_io_error(path: &Path, e: std::io::Error) -> BridgeError {
        match e.kind() {
            ErrorKind::NotFound => BridgeError::NotFound(path.display().to_string()),
            _ => BridgeError::Io(e),
        }
    }
}

#[async_trait]
impl FileSystemAccess for TokioFileSystem {
    async fn exists(&self, path: &Path) -> Result<bool> {
        fs::try_exists(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let metadata = fs::symlink_metadata(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;

        let file_type = metadata.file_type();
        let kind = if file_type.is_symlink() {
            FileKind::Symlink
        } else if file_type.is_dir() {
            FileKind::Directory
        } else if file_type.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        };

        Ok(FileMetadata {
            size: metadata.len(),
            modified_at: metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64),
            kind,
        })
    }

    async fn is_dir(&self, path: &Path) -> Result<bool> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Self::map_io_error(path, e)),
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        let data = fs::read(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?path, size = data.len(), "Read file");
        Ok(Bytes::from(data))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        fs::write(path, data.as_ref())
            .await
            .map_err(|e| Self::map_io_error(path, e))?;
        debug!(path = ?path, size = data.len(), "Wrote file");
        Ok(())
    }

    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(path)
            .await
            .map_err(|e| Self::map_io_error(path, e))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Self::map_io_error(path, e))?
        {
            entries.push(entry.path());
        }

        debug!(path = ?path, count = entries.len(), "Listed directory");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let test_file = dir.path().join("test-file.txt");

        let data = Bytes::from("Hello, World!");
        fs.write_file(&test_file, data.clone()).await.unwrap();

        let read_data = fs.read_file(&test_file).await.unwrap();
        assert_eq!(data, read_data);
        assert!(fs.exists(&test_file).await.unwrap());
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let path = dir.path().join("report.csv");

        fs.write_file(&path, Bytes::from("old contents that are longer"))
            .await
            .unwrap();
        fs.write_file(&path, Bytes::from("new")).await.unwrap();

        assert_eq!(fs.read_file(&path).await.unwrap(), Bytes::from("new"));
    }

    #[tokio::test]
    async fn test_write_does_not_create_parent() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let path = dir.path().join("missing").join("file.txt");

        let result = fs.write_file(&path, Bytes::from("x")).await;

        assert!(matches!(result, Err(BridgeError::NotFound(_))));
        assert!(!dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn test_metadata_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"abc").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let file_meta = fs.metadata(&file).await.unwrap();
        assert!(file_meta.is_regular_file());
        assert_eq!(file_meta.size, 3);

        let dir_meta = fs.metadata(&dir.path().join("sub")).await.unwrap();
        assert!(dir_meta.is_directory());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_metadata_does_not_follow_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let target = dir.path().join("target.txt");
        let link = dir.path().join("link.txt");
        std::fs::write(&target, b"abc").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let meta = fs.metadata(&link).await.unwrap();
        assert_eq!(meta.kind, FileKind::Symlink);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_is_dir_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();
        let real = dir.path().join("real");
        let link = dir.path().join("data");
        std::fs::create_dir(&real).unwrap();
        std::fs::write(real.join("main.log"), b"log").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        assert!(fs.is_dir(&link).await.unwrap());
        assert!(fs.is_dir(&real).await.unwrap());
        assert!(!fs.is_dir(&real.join("main.log")).await.unwrap());
        assert!(!fs.is_dir(&dir.path().join("nope")).await.unwrap());
        assert_eq!(fs.metadata(&link).await.unwrap().kind, FileKind::Symlink);
    }

    #[tokio::test]
    async fn test_list_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let fs = TokioFileSystem::new();

        let result = fs.list_directory(&dir.path().join("nope")).await;
        assert!(matches!(result, Err(BridgeError::NotFound(_))));
    }
}
