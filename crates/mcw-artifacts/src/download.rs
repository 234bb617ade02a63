//! PackageDownloader - streams a resolved artifact to disk.
//!
//! The body is written to `<name>.part` next to the destination and renamed
//! into place only after it is complete and synced, so a failed download
//! never leaves a truncated jar under the final name.

use crate::api::{http_client, PaperApi};
use crate::resolver::VersionResolver;
use mcw_common::{BuildNumber, LaunchError, LaunchResult, RemoteEndpoint, ServerVersion};
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// A resolved download: where it comes from and where it lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub version: ServerVersion,
    pub build: BuildNumber,
    pub url: String,
    pub destination: PathBuf,
}

impl DownloadTarget {
    pub fn new(api: &PaperApi, version: &ServerVersion, build: BuildNumber, destination: &Path) -> Self {
        Self {
            version: version.clone(),
            build,
            url: api.download_url(version, build),
            destination: destination.to_path_buf(),
        }
    }

    /// Sibling file the body is streamed into before the rename.
    pub fn partial_path(&self) -> PathBuf {
        let mut name = self
            .destination
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        self.destination.with_file_name(name)
    }
}

#[derive(Debug, Clone)]
pub struct PackageDownloader {
    client: Client,
    api: PaperApi,
}

impl PackageDownloader {
    pub fn new(api: PaperApi) -> Self {
        Self::with_client(http_client(), api)
    }

    pub fn with_client(client: Client, api: PaperApi) -> Self {
        Self { client, api }
    }

    /// Download `version`/`build` to `destination`.
    pub async fn download(
        &self,
        version: &ServerVersion,
        build: BuildNumber,
        destination: &Path,
    ) -> LaunchResult<DownloadTarget> {
        let target = DownloadTarget::new(&self.api, version, build, destination);
        let partial = target.partial_path();

        info!(%version, %build, "Downloading {}", target.url);
        let bytes = match self.stream_to(&target, &partial).await {
            Ok(bytes) => bytes,
            Err(e) => {
                remove_partial(&partial);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial, &target.destination).await {
            remove_partial(&partial);
            return Err(LaunchError::io(&target.destination, e));
        }

        info!(%version, %build, bytes, "Saved {}", target.destination.display());
        Ok(target)
    }

    /// Stream the response body into `partial`, returning the byte count.
    async fn stream_to(&self, target: &DownloadTarget, partial: &Path) -> LaunchResult<u64> {
        let network = |e: reqwest::Error| LaunchError::network(RemoteEndpoint::Artifact, &target.url, e);

        let mut response = self.client.get(&target.url).send().await.map_err(network)?;
        // Anything but a full 200 body is refused, including 204/206.
        let status = response.status();
        if status != StatusCode::OK {
            return Err(LaunchError::remote_rejected(
                RemoteEndpoint::Artifact,
                &target.url,
                status.as_u16(),
            ));
        }

        let mut file = File::create(partial)
            .await
            .map_err(|e| LaunchError::io(partial, e))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(network)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| LaunchError::io(partial, e))?;
            written += chunk.len() as u64;
        }

        file.flush().await.map_err(|e| LaunchError::io(partial, e))?;
        file.sync_all().await.map_err(|e| LaunchError::io(partial, e))?;
        debug!("Wrote {} bytes to {}", written, partial.display());
        Ok(written)
    }
}

fn remove_partial(partial: &Path) {
    match std::fs::remove_file(partial) {
        Ok(()) => debug!("Removed {}", partial.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Failed to remove {}: {}", partial.display(), e),
    }
}

/// Validate, resolve the latest build, download.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    resolver: VersionResolver,
    downloader: PackageDownloader,
}

impl ArtifactFetcher {
    pub fn new(api: PaperApi) -> Self {
        let client = http_client();
        Self {
            resolver: VersionResolver::with_client(client.clone(), api.clone()),
            downloader: PackageDownloader::with_client(client, api),
        }
    }

    /// Fetch the newest build of `version` into `destination`.
    ///
    /// An invalid version string fails before any request is made.
    pub async fn fetch_artifact(&self, version: &str, destination: &Path) -> LaunchResult<DownloadTarget> {
        let version = ServerVersion::parse(version)?;
        let build = self.resolver.resolve_latest_build(&version).await?;
        self.downloader.download(&version, build, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::Router;
    use tempfile::TempDir;

    const JAR_BODY: &[u8] = b"PK\x03\x04 not really a jar";

    fn version(s: &str) -> ServerVersion {
        ServerVersion::parse(s).unwrap()
    }

    fn paper_router() -> Router {
        Router::new()
            .route(
                "/versions/1.21.4/builds",
                get(|| async { r#"{"builds":[{"build":123},{"build":125}]}"# }),
            )
            .route(
                "/versions/1.21.4/builds/125/downloads/paper-1.21.4-125.jar",
                get(|| async { JAR_BODY }),
            )
            .route(
                "/versions/1.20.6/builds",
                get(|| async { r#"{"builds":[{"build":40}]}"# }),
            )
            .route(
                "/versions/1.20.6/builds/40/downloads/paper-1.20.6-40.jar",
                get(|| async { (AxumStatus::FORBIDDEN, "no") }),
            )
    }

    #[test]
    fn test_partial_path() {
        let target = DownloadTarget::new(
            &PaperApi::default(),
            &version("1.21.4"),
            BuildNumber::new(1),
            Path::new("/srv/paper-1.21.4.jar"),
        );
        assert_eq!(target.partial_path(), PathBuf::from("/srv/paper-1.21.4.jar.part"));
    }

    #[tokio::test]
    async fn test_fetch_artifact_writes_final_file() {
        let base = test_server::serve(paper_router()).await;
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("paper-1.21.4.jar");

        let fetcher = ArtifactFetcher::new(PaperApi::new(base));
        let target = fetcher.fetch_artifact("1.21.4", &destination).await.unwrap();

        assert_eq!(target.build.get(), 125);
        assert!(target.url.ends_with("/builds/125/downloads/paper-1.21.4-125.jar"));
        assert_eq!(std::fs::read(&destination).unwrap(), JAR_BODY);
        assert!(!target.partial_path().exists());
    }

    #[tokio::test]
    async fn test_rejected_artifact_leaves_nothing_behind() {
        let base = test_server::serve(paper_router()).await;
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("paper-1.20.6.jar");

        let fetcher = ArtifactFetcher::new(PaperApi::new(base));
        let err = fetcher.fetch_artifact("1.20.6", &destination).await.unwrap_err();

        assert!(matches!(
            err,
            LaunchError::RemoteRejected {
                endpoint: RemoteEndpoint::Artifact,
                status: 403,
                ..
            }
        ));
        assert!(!destination.exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_partial_content_is_rejected() {
        let router = Router::new().route(
            "/versions/1.21.4/builds/125/downloads/paper-1.21.4-125.jar",
            get(|| async { (AxumStatus::PARTIAL_CONTENT, JAR_BODY) }),
        );
        let base = test_server::serve(router).await;
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("paper-1.21.4.jar");

        let downloader = PackageDownloader::new(PaperApi::new(base));
        let err = downloader
            .download(&version("1.21.4"), BuildNumber::new(125), &destination)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LaunchError::RemoteRejected {
                endpoint: RemoteEndpoint::Artifact,
                status: 206,
                ..
            }
        ));
        assert!(!destination.exists());
    }

    #[tokio::test]
    async fn test_truncated_body_removes_partial_file() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Promises 1000 bytes, sends 10, then hangs up.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n0123456789")
                .await;
            let _ = socket.shutdown().await;
        });

        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("paper-1.21.4.jar");
        let downloader = PackageDownloader::new(PaperApi::new(format!("http://{}", addr)));
        let err = downloader
            .download(&version("1.21.4"), BuildNumber::new(125), &destination)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LaunchError::Network {
                endpoint: RemoteEndpoint::Artifact,
                ..
            }
        ));
        let target = DownloadTarget::new(
            &PaperApi::new(format!("http://{}", addr)),
            &version("1.21.4"),
            BuildNumber::new(125),
            &destination,
        );
        assert!(!destination.exists());
        assert!(!target.partial_path().exists());
    }

    #[tokio::test]
    async fn test_invalid_version_fails_before_any_request() {
        let dir = TempDir::new().unwrap();
        // Nothing listens here; a request would surface as a network error.
        let fetcher = ArtifactFetcher::new(PaperApi::new("http://127.0.0.1:9"));

        let err = fetcher
            .fetch_artifact("1.2.3.4", &dir.path().join("paper.jar"))
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::InvalidVersion { .. }));
    }

    #[tokio::test]
    async fn test_unknown_version_is_not_found() {
        let base = test_server::serve(paper_router()).await;
        let dir = TempDir::new().unwrap();

        let fetcher = ArtifactFetcher::new(PaperApi::new(base));
        let err = fetcher
            .fetch_artifact("1.8.8", &dir.path().join("paper-1.8.8.jar"))
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_download_into_missing_dir_is_io_error() {
        let base = test_server::serve(paper_router()).await;
        let dir = TempDir::new().unwrap();
        let destination = dir.path().join("missing").join("paper-1.21.4.jar");

        let downloader = PackageDownloader::new(PaperApi::new(base));
        let err = downloader
            .download(&version("1.21.4"), BuildNumber::new(125), &destination)
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::Io { .. }));
    }
}
