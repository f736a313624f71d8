//! # Configuration
//!
//! Loads the JSON configuration file shared by the sync jobs and exposes
//! typed views over its sections.
//!
//! ## Overview
//!
//! The file is a JSON object of named sections, each a flat object of
//! settings. Keys keep the hyphenated names used by the existing deployment
//! files:
//!
//! ```json
//! {
//!   "Office365": {
//!     "sharepoint-email": "svc-sync@contoso.org",
//!     "sharepoint-pwd": "...",
//!     "sharepoint-documents-site": "https://contoso.sharepoint.com/sites/Health",
//!     "sharepoint-documents-site-name": "Health",
//!     "sharepoint-health-doc-library": "Shared Documents",
//!     "sharepoint-hit-site-name": "HIT",
//!     "tenant-id": "...",
//!     "client-id": "..."
//!   },
//!   "MSTeams": { "url": "https://contoso.webhook.office.com/..." }
//! }
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{ConfigFile, SharePointConfig};
//!
//! let file = ConfigFile::load("config/config.json")?;
//! let sharepoint = SharePointConfig::from_config(&file)?;
//! sharepoint.validate()?;
//! ```
//!
//! ## Error Handling
//!
//! - A missing file is reported as [`Error::ConfigurationMissing`] so callers
//!   can tell "not deployed" apart from "broken".
//! - Unparseable JSON is [`Error::Config`].
//! - Absent sections and keys are [`Error::MissingSection`] and
//!   [`Error::MissingKey`], naming exactly what to add.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use url::Url;

/// Configuration path used when neither a flag nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Environment variable consulted for the configuration path.
pub const CONFIG_PATH_ENV: &str = "DOCSYNC_CONFIG";

/// A parsed configuration file.
#[derive(Clone)]
pub struct ConfigFile {
    path: PathBuf,
    sections: Map<String, Value>,
}

impl fmt::Debug for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Section bodies hold credentials; only their names are printed.
        f.debug_struct("ConfigFile")
            .field("path", &self.path)
            .field("sections", &self.sections.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ConfigFile {
    /// Read and parse the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ConfigurationMissing {
                path: path.to_path_buf(),
            },
            _ => Error::Config(format!("Failed to read {}: {}", path.display(), e)),
        })?;

        let mut config = Self::from_json_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.path = path.to_path_buf();
        Ok(config)
    }

    /// Parse configuration from an in-memory JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("Invalid JSON: {}", e)))?;

        match value {
            Value::Object(sections) => Ok(Self {
                path: PathBuf::new(),
                sections,
            }),
            _ => Err(Error::Config(
                "Top level of the configuration must be an object of sections".to_string(),
            )),
        }
    }

    /// Path the configuration was loaded from; empty for in-memory configs.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn has_section(&self, section: &str) -> bool {
        matches!(self.sections.get(section), Some(Value::Object(_)))
    }

    fn section_map(&self, section: &str) -> Result<&Map<String, Value>> {
        match self.sections.get(section) {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(Error::Config(format!(
                "Section [{}] must be an object",
                section
            ))),
            None => Err(Error::MissingSection(section.to_string())),
        }
    }

    /// Look up a required string setting.
    pub fn get_str(&self, section: &str, key: &str) -> Result<&str> {
        match self.section_map(section)?.get(key) {
            Some(Value::String(value)) => Ok(value.as_str()),
            Some(Value::Null) | None => Err(Error::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            }),
            Some(_) => Err(Error::Config(format!(
                "[{}] {} must be a string",
                section, key
            ))),
        }
    }

    /// Look up an optional string setting. Missing sections, missing keys,
    /// nulls and non-string values all read as `None`.
    pub fn get_optional_str(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(Value::as_str)
    }

    /// Look up an optional unsigned setting, accepting a JSON number or a
    /// numeric string.
    pub fn get_optional_u32(&self, section: &str, key: &str) -> Result<Option<u32>> {
        let value = match self.sections.get(section).and_then(|s| s.get(key)) {
            None | Some(Value::Null) => return Ok(None),
            Some(value) => value,
        };

        let parsed = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };

        parsed.map(Some).ok_or_else(|| {
            Error::Config(format!(
                "[{}] {} must be a non-negative integer",
                section, key
            ))
        })
    }

    /// Deserialize a whole section into `T`.
    pub fn section<T: DeserializeOwned>(&self, section: &str) -> Result<T> {
        let map = self.section_map(section)?;
        serde_json::from_value(Value::Object(map.clone()))
            .map_err(|e| Error::Config(format!("Invalid [{}] section: {}", section, e)))
    }
}

/// Resolve the configuration path: an explicit path wins, then
/// [`CONFIG_PATH_ENV`], then [`DEFAULT_CONFIG_PATH`].
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// SharePoint connection settings, read from the `Office365` section.
#[derive(Clone, PartialEq, Eq)]
pub struct SharePointConfig {
    /// Account used for the password grant
    pub username: String,
    pub password: String,
    /// Absolute site URL, e.g. `https://contoso.sharepoint.com/sites/Health`
    pub site_url: String,
    /// Site name as it appears in server-relative paths (`/sites/{name}`)
    pub site_name: String,
    /// Document library holding the synced folders
    pub library: String,
    /// Folder prefix applied to upload destinations
    pub upload_root: Option<String>,
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    /// HTTP attempts per request; 1 disables retries
    pub retry_attempts: u32,
}

impl fmt::Debug for SharePointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharePointConfig")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("site_url", &self.site_url)
            .field("site_name", &self.site_name)
            .field("library", &self.library)
            .field("upload_root", &self.upload_root)
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field(
                "client_secret",
                &self.client_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("retry_attempts", &self.retry_attempts)
            .finish()
    }
}

impl SharePointConfig {
    pub const SECTION: &'static str = "Office365";

    pub const DEFAULT_RETRY_ATTEMPTS: u32 = 1;

    /// Read the `Office365` section.
    ///
    /// Only presence is checked here; call [`validate`](Self::validate)
    /// before connecting.
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let section = Self::SECTION;
        let required = |key: &str| config.get_str(section, key).map(str::to_string);
        let optional = |key: &str| {
            config
                .get_optional_str(section, key)
                .filter(|v| !v.trim().is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            username: required("sharepoint-email")?,
            password: required("sharepoint-pwd")?,
            site_url: required("sharepoint-documents-site")?,
            site_name: required("sharepoint-documents-site-name")?,
            library: required("sharepoint-health-doc-library")?,
            upload_root: optional("sharepoint-hit-site-name"),
            tenant_id: required("tenant-id")?,
            client_id: required("client-id")?,
            client_secret: optional("client-secret"),
            retry_attempts: config
                .get_optional_u32(section, "retry-attempts")?
                .unwrap_or(Self::DEFAULT_RETRY_ATTEMPTS),
        })
    }

    /// Reject settings that can never produce a working connection.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("sharepoint-email", &self.username),
            ("sharepoint-pwd", &self.password),
            ("sharepoint-documents-site", &self.site_url),
            ("sharepoint-documents-site-name", &self.site_name),
            ("sharepoint-health-doc-library", &self.library),
            ("tenant-id", &self.tenant_id),
            ("client-id", &self.client_id),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::Config(format!(
                    "[{}] {} cannot be empty",
                    Self::SECTION,
                    key
                )));
            }
        }

        let url = self.parsed_site_url()?;
        if url.scheme() != "https" {
            return Err(Error::Config(format!(
                "[{}] sharepoint-documents-site must be an https URL, got {}",
                Self::SECTION,
                url.scheme()
            )));
        }

        if self.retry_attempts == 0 {
            return Err(Error::Config(format!(
                "[{}] retry-attempts must be at least 1",
                Self::SECTION
            )));
        }

        Ok(())
    }

    fn parsed_site_url(&self) -> Result<Url> {
        let url = Url::parse(self.site_url.trim()).map_err(|e| {
            Error::Config(format!(
                "[{}] sharepoint-documents-site is not a valid URL: {}",
                Self::SECTION,
                e
            ))
        })?;

        if url.host_str().is_none() {
            return Err(Error::Config(format!(
                "[{}] sharepoint-documents-site has no host",
                Self::SECTION
            )));
        }

        Ok(url)
    }

    /// Host name of the site, e.g. `contoso.sharepoint.com`.
    pub fn site_host(&self) -> Result<String> {
        let url = self.parsed_site_url()?;
        url.host_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Config("Site URL has no host".to_string()))
    }

    /// Server-relative site path, e.g. `/sites/Health`.
    ///
    /// Falls back to `/sites/{site_name}` when the URL carries no path.
    pub fn site_path(&self) -> Result<String> {
        let url = self.parsed_site_url()?;
        let path = url.path().trim_end_matches('/');
        if path.is_empty() {
            Ok(format!("/sites/{}", self.site_name.trim_matches('/')))
        } else {
            Ok(path.to_string())
        }
    }
}

/// Teams incoming-webhook settings, read from the `MSTeams` section.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TeamsConfig {
    /// Incoming webhook URL
    pub url: String,
}

impl fmt::Debug for TeamsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Webhook URLs embed their own credential.
        f.debug_struct("TeamsConfig")
            .field("url", &"[REDACTED]")
            .finish()
    }
}

impl TeamsConfig {
    pub const SECTION: &'static str = "MSTeams";

    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let teams: Self = config.section(Self::SECTION)?;
        teams.validate()?;
        Ok(teams)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.url.trim()).map_err(|e| {
            Error::Config(format!(
                "[{}] url is not a valid URL: {}",
                Self::SECTION,
                e
            ))
        })?;

        if url.scheme() != "https" {
            return Err(Error::Config(format!(
                "[{}] url must use https",
                Self::SECTION
            )));
        }

        Ok(())
    }
}
