use crate::error::SyncError;
use core_runtime::events::TransferDirection;
use std::time::Duration;

/// A file moved successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferredFile {
    pub name: String,
    pub bytes: u64,
    /// Local path for downloads, remote path for uploads
    pub destination: String,
}

/// A file that could not be moved.
#[derive(Debug)]
pub struct FailedFile {
    pub name: String,
    pub error: SyncError,
}

/// Outcome of one download or upload batch.
///
/// Files appear in the order they were processed. `skipped` lists the names
/// the selector or filter excluded; those files were never read or fetched.
#[derive(Debug)]
pub struct TransferReport {
    pub direction: TransferDirection,
    pub transferred: Vec<TransferredFile>,
    pub skipped: Vec<String>,
    pub failed: Vec<FailedFile>,
    pub duration: Duration,
}

impl TransferReport {
    pub fn new(direction: TransferDirection) -> Self {
        Self {
            direction,
            transferred: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn transferred_names(&self) -> Vec<&str> {
        self.transferred.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn total_bytes(&self) -> u64 {
        self.transferred.iter().map(|f| f.bytes).sum()
    }

    /// One-line human summary, e.g. `download: 2 transferred, 1 skipped, 0 failed`.
    pub fn summary(&self) -> String {
        format!(
            "{}: {} transferred, {} skipped, {} failed",
            self.direction,
            self.transferred.len(),
            self.skipped.len(),
            self.failed.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_and_totals() {
        let mut report = TransferReport::new(TransferDirection::Upload);
        report.transferred.push(TransferredFile {
            name: "main.log".to_string(),
            bytes: 10,
            destination: "/sites/HIT/Documents/logs/main.log".to_string(),
        });
        report.skipped.push("debug.log".to_string());

        assert!(report.is_success());
        assert_eq!(report.total_bytes(), 10);
        assert_eq!(report.transferred_names(), vec!["main.log"]);
        assert_eq!(report.summary(), "upload: 1 transferred, 1 skipped, 0 failed");

        report.failed.push(FailedFile {
            name: "x".to_string(),
            error: SyncError::Io("boom".to_string()),
        });
        assert!(!report.is_success());
    }
}
