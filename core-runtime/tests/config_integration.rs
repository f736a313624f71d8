//! Integration tests for configuration loading from disk

use core_runtime::config::{ConfigFile, SharePointConfig, TeamsConfig};
use core_runtime::Error;
use std::io::Write;

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_full_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "Office365": {
                "sharepoint-email": "svc@contoso.org",
                "sharepoint-pwd": "pw",
                "sharepoint-documents-site": "https://contoso.sharepoint.com/sites/Health",
                "sharepoint-documents-site-name": "Health",
                "sharepoint-health-doc-library": "Documents",
                "tenant-id": "t",
                "client-id": "c",
                "client-secret": "s",
                "retry-attempts": 3
            },
            "MSTeams": { "url": "https://contoso.webhook.office.com/x" }
        }"#,
    );

    let file = ConfigFile::load(&path).unwrap();
    assert_eq!(file.path(), path.as_path());
    assert!(file.has_section("Office365"));

    let sharepoint = SharePointConfig::from_config(&file).unwrap();
    sharepoint.validate().unwrap();
    assert_eq!(sharepoint.retry_attempts, 3);
    assert_eq!(sharepoint.client_secret.as_deref(), Some("s"));
    assert_eq!(sharepoint.upload_root, None);

    let teams = TeamsConfig::from_config(&file).unwrap();
    assert_eq!(teams.url, "https://contoso.webhook.office.com/x");
}

#[test]
fn test_missing_file_is_configuration_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    match ConfigFile::load(&path) {
        Err(Error::ConfigurationMissing { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected ConfigurationMissing, got {:?}", other),
    }
}

#[test]
fn test_invalid_json_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "{ \"Office365\": ");

    assert!(matches!(ConfigFile::load(&path), Err(Error::Config(_))));
}
