//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, filesystem)
//! and the loaded configuration into a SharePoint-backed sync engine. Hosts
//! with a real file system and network enable the `desktop-shims` feature
//! (on by default), which depends on `bridge-desktop`.
//!
//! ```ignore
//! use core_runtime::config::ConfigFile;
//! use core_service::CoreService;
//! use core_sync::{DownloadSelector, FailurePolicy};
//!
//! let config = ConfigFile::load("config/config.json")?;
//! let core = CoreService::from_config(&config)?;
//! let engine = core.sync_engine(FailurePolicy::default());
//! let report = engine
//!     .download("Tableau/Workbooks", Path::new("./workbooks"), &DownloadSelector::All)
//!     .await?;
//! ```

pub mod error;
pub mod notify;

pub use error::{
    CoreError, Result, EXIT_CONNECTION_FAILURE, EXIT_SUCCESS, EXIT_TRANSFER_FAILURE,
};
pub use notify::TeamsNotifier;

use std::sync::Arc;

use bridge_traits::{
    http::HttpClient,
    storage::{DocumentStore, FileSystemAccess, RemoteFile},
};
use core_auth::{Authenticator, Credentials, PasswordGrantAuthenticator, PasswordGrantConfig};
use core_runtime::config::{ConfigFile, SharePointConfig, TeamsConfig};
use core_runtime::events::EventBus;
use core_sync::{FailurePolicy, SyncEngine};
use provider_sharepoint::{SharePointConnector, SharePointLocation};
use tracing::{debug, info};

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub filesystem: Arc<dyn FileSystemAccess>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(http_client: Arc<dyn HttpClient>, filesystem: Arc<dyn FileSystemAccess>) -> Self {
        Self {
            http_client,
            filesystem,
        }
    }

    /// `reqwest` + `tokio::fs` bridges.
    ///
    /// `retry_attempts` is the total attempt budget per HTTP request; `1`
    /// disables retries.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop(retry_attempts: u32) -> Result<Self> {
        use bridge_desktop::{ReqwestHttpClient, TokioFileSystem};
        use bridge_traits::http::RetryPolicy;

        let policy = if retry_attempts <= 1 {
            RetryPolicy::none()
        } else {
            RetryPolicy::with_max_attempts(retry_attempts)
        };

        let http_client = ReqwestHttpClient::new()
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?
            .with_default_policy(policy);

        Ok(Self::new(
            Arc::new(http_client),
            Arc::new(TokioFileSystem::new()),
        ))
    }
}

/// Primary façade exposed to the CLI.
#[derive(Clone)]
pub struct CoreService {
    deps: Arc<CoreDependencies>,
    connector: Arc<SharePointConnector>,
    teams: Option<TeamsConfig>,
    events: EventBus,
}

impl CoreService {
    /// Build the service with desktop bridges.
    ///
    /// # Errors
    ///
    /// `Config` when the `Office365` section is missing or invalid, or when
    /// an `MSTeams` section is present but invalid.
    #[cfg(feature = "desktop-shims")]
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let sharepoint = SharePointConfig::from_config(config)?;
        let deps = CoreDependencies::desktop(sharepoint.retry_attempts)?;
        Self::build(config, sharepoint, deps)
    }

    /// Build the service over explicit bridges.
    pub fn with_dependencies(config: &ConfigFile, deps: CoreDependencies) -> Result<Self> {
        let sharepoint = SharePointConfig::from_config(config)?;
        Self::build(config, sharepoint, deps)
    }

    fn build(
        config: &ConfigFile,
        sharepoint: SharePointConfig,
        deps: CoreDependencies,
    ) -> Result<Self> {
        let location = SharePointLocation::from_config(&sharepoint)?;
        let authenticator = Self::authenticator(&sharepoint, deps.http_client.clone());
        let connector = SharePointConnector::new(deps.http_client.clone(), authenticator, location);

        let teams = if config.has_section(TeamsConfig::SECTION) {
            Some(TeamsConfig::from_config(config)?)
        } else {
            None
        };

        info!(
            site = %sharepoint.site_url,
            library = %sharepoint.library,
            notifications = teams.is_some(),
            "Core service initialized"
        );

        Ok(Self {
            deps: Arc::new(deps),
            connector: Arc::new(connector),
            teams,
            events: EventBus::default(),
        })
    }

    fn authenticator(
        config: &SharePointConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Arc<dyn Authenticator> {
        let mut grant = PasswordGrantConfig::new(&config.tenant_id, &config.client_id);
        if let Some(secret) = &config.client_secret {
            grant = grant.with_client_secret(secret);
        }
        let credentials = Credentials::new(&config.username, &config.password);

        Arc::new(PasswordGrantAuthenticator::new(
            grant,
            credentials,
            http_client,
        ))
    }

    /// Access the bridge dependencies being used by the service.
    pub fn dependencies(&self) -> Arc<CoreDependencies> {
        Arc::clone(&self.deps)
    }

    /// Bus every engine built by this service publishes on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn document_store(&self) -> Arc<dyn DocumentStore> {
        self.connector.clone()
    }

    /// A sync engine over the SharePoint library and the local file system.
    pub fn sync_engine(&self, policy: FailurePolicy) -> SyncEngine {
        SyncEngine::new(self.document_store(), self.deps.filesystem.clone())
            .with_events(self.events.clone())
            .with_failure_policy(policy)
    }

    /// Teams notifier, when an `MSTeams` section is configured.
    pub fn notifier(&self) -> Option<TeamsNotifier> {
        self.teams
            .as_ref()
            .map(|teams| TeamsNotifier::new(self.deps.http_client.clone(), teams))
    }

    /// Names of the files directly inside `folder`.
    pub async fn list_remote(&self, folder: &str) -> Result<Vec<RemoteFile>> {
        let files = self
            .connector
            .list_files(folder)
            .await
            .map_err(core_sync::SyncError::from)?;
        debug!(folder = %folder, count = files.len(), "Listed remote folder");
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bridge_traits::storage::FileMetadata;
    use bytes::Bytes;
    use mockall::mock;
    use std::path::{Path, PathBuf};

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
        }
    }

    mock! {
        FileSystem {}

        #[async_trait]
        impl FileSystemAccess for FileSystem {
            async fn exists(&self, path: &Path) -> BridgeResult<bool>;
            async fn metadata(&self, path: &Path) -> BridgeResult<FileMetadata>;
            async fn is_dir(&self, path: &Path) -> BridgeResult<bool>;
            async fn read_file(&self, path: &Path) -> BridgeResult<Bytes>;
            async fn write_file(&self, path: &Path, data: Bytes) -> BridgeResult<()>;
            async fn list_directory(&self, path: &Path) -> BridgeResult<Vec<PathBuf>>;
        }
    }

    const CONFIG: &str = r#"{
        "Office365": {
            "sharepoint-email": "svc-sync@contoso.org",
            "sharepoint-pwd": "hunter2",
            "sharepoint-documents-site": "https://contoso.sharepoint.com/sites/Health",
            "sharepoint-documents-site-name": "Health",
            "sharepoint-health-doc-library": "Documents",
            "tenant-id": "contoso.onmicrosoft.com",
            "client-id": "client-123"
        },
        "MSTeams": { "url": "https://contoso.webhook.office.com/webhookb2/abc" }
    }"#;

    fn deps() -> CoreDependencies {
        CoreDependencies::new(Arc::new(MockHttpClient::new()), Arc::new(MockFileSystem::new()))
    }

    #[test]
    fn test_with_dependencies() {
        let config = ConfigFile::from_json_str(CONFIG).unwrap();
        let core = CoreService::with_dependencies(&config, deps()).unwrap();

        assert!(core.notifier().is_some());
        assert_eq!(core.connector.location().host, "contoso.sharepoint.com");
        assert_eq!(core.connector.location().site_path, "/sites/Health");
        assert_eq!(
            core.sync_engine(FailurePolicy::ContinueOnFailure).failure_policy(),
            FailurePolicy::ContinueOnFailure
        );
    }

    #[test]
    fn test_teams_section_is_optional() {
        let mut value: serde_json::Value = serde_json::from_str(CONFIG).unwrap();
        value.as_object_mut().unwrap().remove("MSTeams");
        let config = ConfigFile::from_json_str(&value.to_string()).unwrap();

        let core = CoreService::with_dependencies(&config, deps()).unwrap();
        assert!(core.notifier().is_none());
    }

    #[test]
    fn test_missing_office365_section() {
        let config = ConfigFile::from_json_str(r#"{"MSTeams": {"url": "https://x.org"}}"#).unwrap();

        let error = CoreService::with_dependencies(&config, deps()).err().unwrap();
        assert!(matches!(error, CoreError::Config(_)));
        assert_eq!(error.exit_code(), EXIT_CONNECTION_FAILURE);
    }
}
