//! VersionResolver - maps a server version to its newest published build.

use crate::api::{http_client, PaperApi};
use crate::local;
use mcw_common::{BuildNumber, LaunchError, LaunchResult, RemoteEndpoint, ServerVersion};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Queries build metadata and lists local artifacts.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    client: Client,
    api: PaperApi,
}

impl VersionResolver {
    pub fn new(api: PaperApi) -> Self {
        Self::with_client(http_client(), api)
    }

    pub fn with_client(client: Client, api: PaperApi) -> Self {
        Self { client, api }
    }

    /// Versions of the artifacts already in `dir`, newest first.
    pub fn list_local_versions(&self, dir: &Path) -> LaunchResult<Vec<ServerVersion>> {
        local::list_local_versions(dir)
    }

    /// Fetch the build list for `version` and return the highest build.
    ///
    /// Any status other than 200, or a document without a usable build,
    /// means the version is unknown (`NotFound`).
    pub async fn resolve_latest_build(&self, version: &ServerVersion) -> LaunchResult<BuildNumber> {
        let url = self.api.builds_url(version);
        debug!(%version, "Fetching build metadata from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LaunchError::network(RemoteEndpoint::Metadata, &url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LaunchError::not_found(
                version.as_str(),
                format!("build metadata returned HTTP {}", status.as_u16()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| LaunchError::network(RemoteEndpoint::Metadata, &url, e))?;
        let document: Value = serde_json::from_slice(&body).map_err(|e| {
            LaunchError::not_found(version.as_str(), format!("malformed build metadata: {}", e))
        })?;

        let build = latest_build(&document)
            .ok_or_else(|| LaunchError::not_found(version.as_str(), "no builds published"))?;

        info!(%version, %build, "Resolved latest build");
        Ok(build)
    }
}

/// Highest positive `build` number anywhere in a metadata document.
///
/// Entries whose `build` is not a positive integer are skipped.
pub fn latest_build(document: &Value) -> Option<BuildNumber> {
    let mut builds = Vec::new();
    collect_builds(document, &mut builds);
    builds
        .into_iter()
        .filter(|&build| build > 0)
        .max()
        .map(BuildNumber::new)
}

fn collect_builds(value: &Value, out: &mut Vec<u64>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "build" {
                    if let Some(build) = child.as_u64() {
                        out.push(build);
                        continue;
                    }
                }
                collect_builds(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_builds(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::Router;
    use serde_json::json;

    fn version(s: &str) -> ServerVersion {
        ServerVersion::parse(s).unwrap()
    }

    #[test]
    fn test_latest_build_takes_maximum() {
        let doc = json!({"builds": [{"build": 124}, {"build": 125}, {"build": 123}]});
        assert_eq!(latest_build(&doc), Some(BuildNumber::new(125)));
    }

    #[test]
    fn test_latest_build_empty_or_malformed() {
        assert_eq!(latest_build(&json!({"builds": []})), None);
        assert_eq!(latest_build(&json!({"builds": [{"build": "abc"}]})), None);
        assert_eq!(latest_build(&json!({"builds": [{"build": 0}]})), None);
        assert_eq!(latest_build(&json!({"builds": [{"build": -4}]})), None);
    }

    #[test]
    fn test_latest_build_skips_bad_entries() {
        let doc = json!({
            "project_id": "paper",
            "builds": [
                {"build": "x"},
                {"build": 7, "downloads": {"application": {"name": "paper-1.20-7.jar"}}},
                {"build": 3.5},
                {"nothing": true}
            ]
        });
        assert_eq!(latest_build(&doc), Some(BuildNumber::new(7)));
    }

    #[tokio::test]
    async fn test_resolve_latest_build() {
        let router = Router::new().route(
            "/versions/1.21.4/builds",
            get(|| async { r#"{"builds":[{"build":123},{"build":125},{"build":124}]}"# }),
        );
        let base = test_server::serve(router).await;

        let resolver = VersionResolver::new(PaperApi::new(base));
        let build = resolver.resolve_latest_build(&version("1.21.4")).await.unwrap();
        assert_eq!(build.get(), 125);
    }

    #[tokio::test]
    async fn test_resolve_unknown_version_is_not_found() {
        let base = test_server::serve(Router::new()).await;

        let resolver = VersionResolver::new(PaperApi::new(base));
        let err = resolver
            .resolve_latest_build(&version("9.99"))
            .await
            .unwrap_err();
        assert!(matches!(err, LaunchError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_without_builds_is_not_found() {
        let router = Router::new()
            .route("/versions/1.20/builds", get(|| async { r#"{"builds":[]}"# }))
            .route("/versions/1.19/builds", get(|| async { "<html>oops</html>" }));
        let base = test_server::serve(router).await;
        let resolver = VersionResolver::new(PaperApi::new(base));

        for v in ["1.20", "1.19"] {
            let err = resolver.resolve_latest_build(&version(v)).await.unwrap_err();
            assert!(matches!(err, LaunchError::NotFound { .. }), "{}: {}", v, err);
        }
    }

    #[tokio::test]
    async fn test_resolve_non_ok_status_is_not_found() {
        let router = Router::new()
            .route(
                "/versions/1.21/builds",
                get(|| async { (AxumStatus::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route(
                "/versions/1.20/builds",
                get(|| async { (AxumStatus::FORBIDDEN, "no") }),
            )
            .route(
                "/versions/1.19/builds",
                get(|| async { (AxumStatus::NO_CONTENT, "") }),
            );
        let base = test_server::serve(router).await;
        let resolver = VersionResolver::new(PaperApi::new(base));

        for v in ["1.21", "1.20", "1.19"] {
            let err = resolver.resolve_latest_build(&version(v)).await.unwrap_err();
            assert!(matches!(err, LaunchError::NotFound { .. }), "{}: {}", v, err);
        }
    }

    #[tokio::test]
    async fn test_resolve_unreachable_is_network_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let resolver = VersionResolver::new(PaperApi::new(format!("http://{}", addr)));
        let err = resolver.resolve_latest_build(&version("1.21")).await.unwrap_err();
        assert!(matches!(
            err,
            LaunchError::Network {
                endpoint: RemoteEndpoint::Metadata,
                ..
            }
        ));
    }
}
