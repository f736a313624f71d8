//! Microsoft Graph response types
//!
//! Data structures for deserializing the subset of Graph v1.0 responses the
//! connector reads.

use serde::Deserialize;

/// Graph site resource
///
/// See: https://learn.microsoft.com/graph/api/resources/site
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Composite site ID (`host,site-guid,web-guid`)
    pub id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub web_url: Option<String>,
}

/// Graph drive resource; a SharePoint document library
///
/// See: https://learn.microsoft.com/graph/api/resources/drive
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drive {
    pub id: String,

    /// Display name, e.g. `Documents` for the `Shared Documents` library
    pub name: String,

    /// Library URL; its last segment is the library's URL name
    #[serde(default)]
    pub web_url: Option<String>,
}

/// `GET /sites/{id}/drives` response
#[derive(Debug, Deserialize)]
pub struct DrivesResponse {
    pub value: Vec<Drive>,
}

/// Graph driveItem resource
///
/// See: https://learn.microsoft.com/graph/api/resources/driveitem
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveItem {
    pub id: String,

    pub name: String,

    /// Size in bytes
    #[serde(default)]
    pub size: Option<u64>,

    /// Last modification time (RFC 3339)
    #[serde(default)]
    pub last_modified_date_time: Option<String>,

    /// Present only on files
    #[serde(default)]
    pub file: Option<FileFacet>,

    /// Present only on folders
    #[serde(default)]
    pub folder: Option<FolderFacet>,
}

impl DriveItem {
    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFacet {
    #[serde(default)]
    pub child_count: Option<u64>,
}

/// `GET .../children` response page
#[derive(Debug, Deserialize)]
pub struct ChildrenResponse {
    pub value: Vec<DriveItem>,

    /// Absolute URL of the next page
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// Graph error envelope: `{"error": {"code": ..., "message": ...}}`
#[derive(Debug, Deserialize)]
pub struct GraphErrorResponse {
    pub error: GraphError,
}

#[derive(Debug, Deserialize)]
pub struct GraphError {
    pub code: String,

    #[serde(default)]
    pub message: String,
}
