//! URL layout of the Paper downloads API.

use mcw_common::{BuildNumber, ServerVersion};
use reqwest::Client;
use std::time::Duration;

/// Default project endpoint of the Paper downloads API.
pub const DEFAULT_BASE_URL: &str = "https://api.papermc.io/v2/projects/paper";

const USER_AGENT: &str = concat!("mc-launcher/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Builds metadata and artifact URLs under a configurable base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperApi {
    base_url: String,
}

impl Default for PaperApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl PaperApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/versions/{version}/builds`
    pub fn builds_url(&self, version: &ServerVersion) -> String {
        format!("{}/versions/{}/builds", self.base_url, version)
    }

    /// `{base}/versions/{version}/builds/{build}/downloads/paper-{version}-{build}.jar`
    pub fn download_url(&self, version: &ServerVersion, build: BuildNumber) -> String {
        format!(
            "{}/versions/{}/builds/{}/downloads/paper-{}-{}.jar",
            self.base_url, version, build, version, build
        )
    }
}

/// HTTP client shared by the resolver and the downloader.
///
/// Only the connect phase is bounded; a jar download may legitimately take
/// minutes on a slow link.
pub fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}
