//! SharePoint document library connector
//!
//! Implements the `DocumentStore` trait over Microsoft Graph v1.0. Folders are
//! addressed by path relative to the library root, e.g. `Tableau/Extracts`.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::storage::{DocumentStore, RemoteFile};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use core_auth::{AccessToken, Authenticator};
use core_runtime::config::SharePointConfig;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::SharePointError;
use crate::types::{ChildrenResponse, DriveItem, DrivesResponse, GraphErrorResponse, Site};

/// Microsoft Graph API base URL
pub const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";

const METADATA_TIMEOUT: Duration = Duration::from_secs(30);
const CONTENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Where the document library lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePointLocation {
    /// Tenant host, e.g. `contoso.sharepoint.com`
    pub host: String,
    /// Server-relative site path, e.g. `/sites/Health`
    pub site_path: String,
    /// Site name used in reported server-relative paths
    pub site_name: String,
    /// Document library name or URL name
    pub library: String,
    /// Folder prefix prepended to every upload destination
    pub upload_root: Option<String>,
}

impl SharePointLocation {
    pub fn from_config(config: &SharePointConfig) -> crate::error::Result<Self> {
        let invalid = |e: core_runtime::Error| SharePointError::InvalidPath(e.to_string());

        Ok(Self {
            host: config.site_host().map_err(invalid)?,
            site_path: config.site_path().map_err(invalid)?,
            site_name: config.site_name.trim_matches('/').to_string(),
            library: config.library.clone(),
            upload_root: config.upload_root.clone(),
        })
    }

    /// Remote folder an upload into `folder` lands in.
    fn upload_folder(&self, folder: &str) -> String {
        match &self.upload_root {
            Some(root) => join_path(&[root, folder]),
            None => join_path(&[folder]),
        }
    }
}

/// An authenticated view of the library, valid for one operation.
#[derive(Debug, Clone)]
pub struct GraphSession {
    pub access_token: AccessToken,
    /// Graph drive backing the document library
    pub drive_id: String,
}

/// SharePoint document library connector
///
/// # Features
///
/// - Resolves site and library on every call, after a fresh token
/// - Paged folder listing that skips sub-folders
/// - Whole-file download and simple upload, overwriting existing files
/// - Refuses to upload into folders that do not exist
///
/// # Example
///
/// ```ignore
/// use provider_sharepoint::{SharePointConnector, SharePointLocation};
/// use bridge_traits::storage::DocumentStore;
///
/// let connector = SharePointConnector::new(http_client, authenticator, location);
/// let files = connector.list_files("Tableau").await?;
/// ```
pub struct SharePointConnector {
    http_client: Arc<dyn HttpClient>,
    authenticator: Arc<dyn Authenticator>,
    location: SharePointLocation,
    api_base: String,
}

impl SharePointConnector {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        authenticator: Arc<dyn Authenticator>,
        location: SharePointLocation,
    ) -> Self {
        Self {
            http_client,
            authenticator,
            location,
            api_base: GRAPH_API_BASE.to_string(),
        }
    }

    /// Point the connector at a different Graph endpoint (national clouds).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn location(&self) -> &SharePointLocation {
        &self.location
    }

    /// Acquire a token and resolve the document library's drive.
    ///
    /// # Errors
    ///
    /// - `Authentication` when no token can be obtained or Graph rejects it
    /// - `NotFound` when the site or library does not exist
    #[instrument(skip(self), fields(host = %self.location.host, library = %self.location.library))]
    pub async fn authenticate(&self) -> crate::error::Result<GraphSession> {
        let access_token = self.authenticator.acquire_token().await?;

        let site_url = format!(
            "{}/sites/{}:/{}",
            self.api_base,
            self.location.host,
            encode_path(&self.location.site_path)?
        );
        let site: Site = self
            .get_json(&access_token, &site_url, &self.location.site_path)
            .await?;

        let drives_url = format!("{}/sites/{}/drives", self.api_base, site.id);
        let drives: DrivesResponse = self
            .get_json(&access_token, &drives_url, &self.location.site_path)
            .await?;

        let drive = drives
            .value
            .into_iter()
            .find(|drive| {
                drive.name.eq_ignore_ascii_case(&self.location.library)
                    || drive
                        .web_url
                        .as_deref()
                        .map(|url| library_url_name(url).eq_ignore_ascii_case(&self.location.library))
                        .unwrap_or(false)
            })
            .ok_or_else(|| {
                SharePointError::NotFound(format!(
                    "document library '{}' on {}",
                    self.location.library, self.location.site_path
                ))
            })?;

        debug!(drive_id = %drive.id, "Resolved document library");

        Ok(GraphSession {
            access_token,
            drive_id: drive.id,
        })
    }

    fn drive_url(&self, session: &GraphSession) -> String {
        format!("{}/drives/{}", self.api_base, session.drive_id)
    }

    /// URL of the item at `path`, or the library root when `path` is empty.
    fn item_url(&self, session: &GraphSession, path: &str) -> crate::error::Result<String> {
        let encoded = encode_path(path)?;
        if encoded.is_empty() {
            Ok(format!("{}/root", self.drive_url(session)))
        } else {
            Ok(format!("{}/root:/{}:", self.drive_url(session), encoded))
        }
    }

    fn content_url(&self, session: &GraphSession, path: &str) -> crate::error::Result<String> {
        Ok(format!(
            "{}/root:/{}:/content",
            self.drive_url(session),
            encode_path(path)?
        ))
    }

    async fn send(
        &self,
        request: HttpRequest,
        context: &str,
    ) -> crate::error::Result<HttpResponse> {
        let response = self.http_client.execute(request).await?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(map_error_response(&response, context))
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &AccessToken,
        url: &str,
        context: &str,
    ) -> crate::error::Result<T> {
        let request = HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(token.as_str())
            .header("Accept", "application/json")
            .timeout(METADATA_TIMEOUT);

        let response = self.send(request, context).await?;

        serde_json::from_slice(&response.body)
            .map_err(|e| SharePointError::ParseError(format!("{}: {}", context, e)))
    }

    async fn list_items(&self, folder: &str) -> crate::error::Result<Vec<DriveItem>> {
        let session = self.authenticate().await?;

        let folder_url = self.item_url(&session, folder)?;
        let mut next_url = Some(format!("{}/children", folder_url));
        let mut items = Vec::new();

        while let Some(url) = next_url.take() {
            let page: ChildrenResponse = self
                .get_json(&session.access_token, &url, folder)
                .await?;
            items.extend(page.value);
            next_url = page.next_link;
        }

        Ok(items)
    }

    async fn fetch_content(&self, folder: &str, name: &str) -> crate::error::Result<Bytes> {
        validate_file_name(name)?;
        let session = self.authenticate().await?;
        let path = join_path(&[folder, name]);

        let request = HttpRequest::new(HttpMethod::Get, self.content_url(&session, &path)?)
            .bearer_token(session.access_token.as_str())
            .timeout(CONTENT_TIMEOUT);

        let response = self.send(request, &path).await?;
        Ok(response.body)
    }

    async fn put_content(
        &self,
        folder: &str,
        name: &str,
        content: Bytes,
    ) -> crate::error::Result<String> {
        validate_file_name(name)?;
        let session = self.authenticate().await?;
        let target_folder = self.location.upload_folder(folder);

        // Graph creates missing parents on upload; check first so a typo in
        // the destination fails instead of growing a new folder tree.
        let parent: DriveItem = self
            .get_json(
                &session.access_token,
                &self.item_url(&session, &target_folder)?,
                &target_folder,
            )
            .await?;
        if !parent.is_folder() {
            return Err(SharePointError::InvalidPath(format!(
                "{} is not a folder",
                target_folder
            )));
        }

        let path = join_path(&[&target_folder, name]);
        let size = content.len();
        let request = HttpRequest::new(HttpMethod::Put, self.content_url(&session, &path)?)
            .bearer_token(session.access_token.as_str())
            .header("Content-Type", "application/octet-stream")
            .body(content)
            .timeout(CONTENT_TIMEOUT);

        let response = self.send(request, &path).await?;
        let item: DriveItem = serde_json::from_slice(&response.body)
            .map_err(|e| SharePointError::ParseError(format!("{}: {}", path, e)))?;

        debug!(item_id = %item.id, size = size, "Upload accepted");

        Ok(format!(
            "/{}",
            join_path(&[
                "sites",
                &self.location.site_name,
                &self.location.library,
                &target_folder,
                name,
            ])
        ))
    }
}

#[async_trait]
impl DocumentStore for SharePointConnector {
    #[instrument(skip(self))]
    async fn list_files(&self, folder: &str) -> Result<Vec<RemoteFile>> {
        let items = self.list_items(folder).await?;
        let total = items.len();

        let files: Vec<RemoteFile> = items
            .into_iter()
            .filter(DriveItem::is_file)
            .map(convert_item)
            .collect();

        info!(
            files = files.len(),
            skipped_folders = total - files.len(),
            "Listed remote folder"
        );

        Ok(files)
    }

    #[instrument(skip(self))]
    async fn download_file(&self, folder: &str, name: &str) -> Result<Bytes> {
        let data = self.fetch_content(folder, name).await?;
        info!(bytes = data.len(), "Downloaded file");
        Ok(data)
    }

    #[instrument(skip(self, content), fields(bytes = content.len()))]
    async fn upload_file(&self, folder: &str, name: &str, content: Bytes) -> Result<String> {
        let remote_path = self.put_content(folder, name, content).await?;
        info!(remote_path = %remote_path, "Uploaded file");
        Ok(remote_path)
    }
}

/// Convert a Graph driveItem to a RemoteFile
fn convert_item(item: DriveItem) -> RemoteFile {
    RemoteFile {
        id: item.id,
        name: item.name,
        size: item.size,
        modified_at: item
            .last_modified_date_time
            .as_deref()
            .and_then(parse_timestamp),
    }
}

/// Parse RFC 3339 timestamp to Unix timestamp
fn parse_timestamp(rfc3339: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(rfc3339)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp())
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// SharePoint strips edge whitespace from item names, so such a name would
/// address a different item.
fn has_edge_whitespace(segment: &str) -> bool {
    segment.trim() != segment
}

/// Join path fragments with single slashes, dropping empty segments.
fn join_path(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| segments(part))
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encode each segment of a library-relative path.
fn encode_path(path: &str) -> crate::error::Result<String> {
    let mut encoded = Vec::new();
    for segment in segments(path) {
        if segment == "." || segment == ".." {
            return Err(SharePointError::InvalidPath(format!(
                "relative segment in '{}'",
                path
            )));
        }
        if has_edge_whitespace(segment) {
            return Err(SharePointError::InvalidPath(format!(
                "segment '{}' in '{}' has leading or trailing whitespace",
                segment, path
            )));
        }
        encoded.push(urlencoding::encode(segment).into_owned());
    }
    Ok(encoded.join("/"))
}

fn validate_file_name(name: &str) -> crate::error::Result<()> {
    if name.is_empty()
        || name.contains('/')
        || name == "."
        || name == ".."
        || has_edge_whitespace(name)
    {
        return Err(SharePointError::InvalidPath(format!(
            "invalid file name '{}'",
            name
        )));
    }
    Ok(())
}

/// Decoded last path segment of a library URL.
fn library_url_name(web_url: &str) -> String {
    let last = web_url.trim_end_matches('/').rsplit('/').next().unwrap_or("");
    urlencoding::decode(last)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last.to_string())
}

fn header<'a>(response: &'a HttpResponse, name: &str) -> Option<&'a str> {
    response
        .headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Map a non-2xx Graph response onto the provider error taxonomy.
fn map_error_response(response: &HttpResponse, context: &str) -> SharePointError {
    let status = response.status;
    let message = response
        .json::<GraphErrorResponse>()
        .map(|body| format!("{}: {}", body.error.code, body.error.message))
        .unwrap_or_else(|_| String::from_utf8_lossy(&response.body).into_owned());

    warn!(status = status, context = %context, message = %message, "Graph request failed");

    match status {
        401 => SharePointError::Authentication(message),
        403 => SharePointError::PermissionDenied(format!("{}: {}", context, message)),
        404 => SharePointError::NotFound(context.to_string()),
        429 => SharePointError::RateLimitExceeded {
            retry_after_seconds: header(response, "Retry-After")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        },
        _ => SharePointError::ApiError {
            status_code: status,
            message,
        },
    }
}
