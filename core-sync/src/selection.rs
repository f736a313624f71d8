//! # File Selection
//!
//! Decides which files a batch moves.
//!
//! Downloads accept an exact name, a pattern or everything, resolved with a
//! fixed precedence: exact name, then pattern, then all. Uploads accept only a
//! pattern or everything.
//!
//! Patterns are regular expressions matched anywhere in the file name
//! (search, not full match): `PrEP` selects `PrEP_Q1.twbx` and `Old_PrEP.csv`.

use crate::error::{Result, SyncError};
use regex::Regex;

/// Literal some callers pass to mean "no filter".
pub const NO_FILTER_LITERAL: &str = "None";

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| SyncError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Which remote files a download fetches.
#[derive(Debug, Clone)]
pub enum DownloadSelector {
    /// One file, fetched by name without listing the folder
    ExactName(String),
    /// Every file whose name contains a match
    Pattern(Regex),
    /// Every file in the folder
    All,
}

impl DownloadSelector {
    /// Build a selector from optional name and pattern arguments.
    ///
    /// Empty strings count as absent. When both are given the name wins.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` when the pattern is used and does not compile.
    pub fn from_parts(file_name: Option<&str>, pattern: Option<&str>) -> Result<Self> {
        if let Some(name) = non_empty(file_name) {
            return Ok(DownloadSelector::ExactName(name.to_string()));
        }

        match non_empty(pattern) {
            Some(pattern) => Ok(DownloadSelector::Pattern(compile(pattern)?)),
            None => Ok(DownloadSelector::All),
        }
    }

    /// Whether a listed file named `name` is selected.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            DownloadSelector::ExactName(expected) => expected == name,
            DownloadSelector::Pattern(regex) => regex.is_match(name),
            DownloadSelector::All => true,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DownloadSelector::ExactName(name) => format!("name={}", name),
            DownloadSelector::Pattern(regex) => format!("pattern={}", regex.as_str()),
            DownloadSelector::All => "all".to_string(),
        }
    }
}

/// Which local files an upload sends.
#[derive(Debug, Clone, Default)]
pub enum UploadFilter {
    /// Every regular file in the directory
    #[default]
    All,
    /// Every regular file whose name contains a match
    Pattern(Regex),
}

impl UploadFilter {
    /// Parse an optional filter argument.
    ///
    /// An absent value, an empty string and the literal `"None"` all mean
    /// [`UploadFilter::All`]; anything else is compiled as a pattern.
    pub fn parse(pattern: Option<&str>) -> Result<Self> {
        match non_empty(pattern) {
            None => Ok(UploadFilter::All),
            Some(NO_FILTER_LITERAL) => Ok(UploadFilter::All),
            Some(pattern) => Ok(UploadFilter::Pattern(compile(pattern)?)),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            UploadFilter::All => true,
            UploadFilter::Pattern(regex) => regex.is_match(name),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            UploadFilter::All => "all".to_string(),
            UploadFilter::Pattern(regex) => format!("pattern={}", regex.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_precedence() {
        assert!(matches!(
            DownloadSelector::from_parts(Some("a.csv"), Some("PrEP")).unwrap(),
            DownloadSelector::ExactName(ref n) if n == "a.csv"
        ));
        assert!(matches!(
            DownloadSelector::from_parts(None, Some("PrEP")).unwrap(),
            DownloadSelector::Pattern(_)
        ));
        assert!(matches!(
            DownloadSelector::from_parts(None, None).unwrap(),
            DownloadSelector::All
        ));
        assert!(matches!(
            DownloadSelector::from_parts(Some(""), Some("")).unwrap(),
            DownloadSelector::All
        ));
    }

    #[test]
    fn test_pattern_is_search_not_full_match() {
        let selector = DownloadSelector::from_parts(None, Some("PrEP")).unwrap();

        assert!(selector.matches("PrEP_Q1.twbx"));
        assert!(selector.matches("Old_PrEP.csv"));
        assert!(!selector.matches("Other.twbx"));
    }

    #[test]
    fn test_anchored_pattern() {
        let selector = DownloadSelector::from_parts(None, Some(r"^PrEP_Q\d\.twbx$")).unwrap();

        assert!(selector.matches("PrEP_Q2.twbx"));
        assert!(!selector.matches("Old_PrEP_Q2.twbx"));
    }

    #[test]
    fn test_invalid_pattern() {
        let error = DownloadSelector::from_parts(None, Some("PrEP(")).unwrap_err();
        assert!(matches!(error, SyncError::InvalidPattern { ref pattern, .. } if pattern == "PrEP("));

        // An exact name shadows a broken pattern.
        assert!(DownloadSelector::from_parts(Some("a.csv"), Some("PrEP(")).is_ok());
    }

    #[test]
    fn test_upload_none_literal_means_all() {
        assert!(matches!(UploadFilter::parse(None).unwrap(), UploadFilter::All));
        assert!(matches!(UploadFilter::parse(Some("None")).unwrap(), UploadFilter::All));
        assert!(matches!(UploadFilter::parse(Some("")).unwrap(), UploadFilter::All));
        assert!(matches!(UploadFilter::default(), UploadFilter::All));

        // Only the exact literal is special.
        assert!(matches!(
            UploadFilter::parse(Some("none")).unwrap(),
            UploadFilter::Pattern(_)
        ));
    }

    #[test]
    fn test_upload_pattern_matches() {
        let filter = UploadFilter::parse(Some("main.log")).unwrap();

        assert!(filter.matches("main.log"));
        assert!(!filter.matches("debug.log"));
        assert_eq!(filter.describe(), "pattern=main.log");
    }
}
