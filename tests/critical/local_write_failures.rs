//! Destinations that cannot be written: missing parents, directories,
//! read-only locations. The remote side is healthy in every case.

use fetchfile_core::{ClientConfig, DownloadError, DownloadRequest, Downloader, ErrorKind};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::support::socket_guard::{socket_skip_return, start_mock_server_or_skip};

async fn healthy_server() -> Option<MockServer> {
    let mock_server = start_mock_server_or_skip().await?;
    Mock::given(method("GET"))
        .and(path("/file.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7_u8; 2048]))
        .mount(&mock_server)
        .await;
    Some(mock_server)
}

async fn fetch(url: String, save_path: &std::path::Path) -> fetchfile_core::DownloadOutcome {
    Downloader::new(&ClientConfig::default())
        .expect("downloader")
        .start(DownloadRequest::new(url, save_path))
        .wait()
        .await
}

#[tokio::test]
async fn p0_missing_parent_directory_is_local_write_failure() {
    let Some(mock_server) = healthy_server().await else {
        return socket_skip_return();
    };
    let temp_dir = TempDir::new().expect("temp dir");
    let save_path = temp_dir.path().join("missing").join("nested").join("file.bin");

    let outcome = fetch(format!("{}/file.bin", mock_server.uri()), &save_path).await;

    let error = outcome.error().expect("should fail");
    assert!(matches!(error, DownloadError::Io { .. }), "got {error:?}");
    assert_eq!(error.kind(), ErrorKind::LocalWrite);
    assert!(!temp_dir.path().join("missing").exists(), "parents are never created");
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "no request is sent when the file cannot be opened");
}

#[tokio::test]
async fn p0_directory_destination_is_local_write_failure() {
    let Some(mock_server) = healthy_server().await else {
        return socket_skip_return();
    };
    let temp_dir = TempDir::new().expect("temp dir");
    let save_path = temp_dir.path().join("occupied");
    std::fs::create_dir(&save_path).expect("create dir");
    std::fs::write(save_path.join("inside.txt"), b"keep").expect("seed");

    let outcome = fetch(format!("{}/file.bin", mock_server.uri()), &save_path).await;

    let error = outcome.error().expect("should fail");
    assert!(
        matches!(error, DownloadError::InvalidSavePath { .. }),
        "got {error:?}"
    );
    assert_eq!(error.kind(), ErrorKind::LocalWrite);
    assert!(save_path.is_dir());
    assert_eq!(std::fs::read(save_path.join("inside.txt")).expect("read"), b"keep");
    let names: Vec<_> = std::fs::read_dir(temp_dir.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .map(|e| e.file_name())
        .collect();
    assert_eq!(names.len(), 1, "partial file must be removed: {names:?}");
}

#[tokio::test]
async fn p0_directory_destination_wins_over_remote_failure() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return socket_skip_return();
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    let temp_dir = TempDir::new().expect("temp dir");
    let save_path = temp_dir.path().join("occupied");
    std::fs::create_dir(&save_path).expect("create dir");

    let outcome = fetch(format!("{}/file.bin", mock_server.uri()), &save_path).await;

    let error = outcome.error().expect("should fail");
    assert_eq!(error.kind(), ErrorKind::LocalWrite, "got {error:?}");
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty(), "no request is sent to a directory destination");
    assert_eq!(std::fs::read_dir(temp_dir.path()).expect("read dir").count(), 1);
}

#[tokio::test]
async fn p0_trailing_separator_is_rejected_before_any_io() {
    let temp_dir = TempDir::new().expect("temp dir");
    let save_path = format!("{}/", temp_dir.path().join("dir-like").display());

    let outcome = fetch(
        "http://127.0.0.1:9/file.bin".to_string(),
        std::path::Path::new(&save_path),
    )
    .await;

    let error = outcome.error().expect("should fail");
    assert!(
        matches!(error, DownloadError::InvalidSavePath { .. }),
        "got {error:?}"
    );
    assert_eq!(error.kind(), ErrorKind::LocalWrite);
    assert_eq!(std::fs::read_dir(temp_dir.path()).expect("read dir").count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn p0_read_only_directory_is_local_write_failure() {
    use std::os::unix::fs::PermissionsExt;

    let Some(mock_server) = healthy_server().await else {
        return socket_skip_return();
    };
    let temp_dir = TempDir::new().expect("temp dir");
    let locked = temp_dir.path().join("locked");
    std::fs::create_dir(&locked).expect("create dir");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).expect("chmod");

    // Root ignores directory permissions.
    let probe = locked.join(".probe");
    if std::fs::write(&probe, b"").is_ok() {
        let _ = std::fs::remove_file(&probe);
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755))
            .expect("restore");
        eprintln!("[local-write] directory permissions not enforced; skipping");
        return;
    }

    let save_path = locked.join("file.bin");
    let outcome = fetch(format!("{}/file.bin", mock_server.uri()), &save_path).await;

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).expect("restore");

    let error = outcome.error().expect("should fail");
    assert_eq!(error.kind(), ErrorKind::LocalWrite, "got {error:?}");
    assert!(!save_path.exists());
}
