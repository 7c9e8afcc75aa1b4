use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// Blob server used to obtain signed upload URLs
#[derive(Serialize, Deserialize, Clone)]
pub struct BlobstoreConfig {
    /// Base URL of the blob server; `/blobs` is appended for blob creation
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `Authorization: Bearer <token>` on blob creation
    #[serde(default)]
    pub bearer_token: String,

    /// Whole-request timeout for blob server and signed URL requests
    #[serde(default = "default_request_timeout_in_secs")]
    pub request_timeout_in_secs: u64,

    #[serde(default = "default_max_idle_conns_per_host")]
    pub max_idle_conns_per_host: usize,
}

impl std::fmt::Debug for BlobstoreConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("BlobstoreConfig")
            .field("base_url", &self.base_url)
            .field("request_timeout_in_secs", &self.request_timeout_in_secs)
            .field("max_idle_conns_per_host", &self.max_idle_conns_per_host)
            .finish_non_exhaustive()
    }
}

impl Default for BlobstoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bearer_token: String::new(),
            request_timeout_in_secs: default_request_timeout_in_secs(),
            max_idle_conns_per_host: default_max_idle_conns_per_host(),
        }
    }
}

impl BlobstoreConfig {
    pub fn validate(&self) -> Result<()> {
        self.parsed_base_url()?;

        if self.request_timeout_in_secs == 0 {
            return Err(invalid(
                "blobstore.request_timeout_in_secs must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses `base_url`, accepting only absolute http(s) URLs
    pub fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("bad blobstore.base_url '{}': {e}", self.base_url)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(invalid(format!(
                "blobstore.base_url '{}' has unsupported scheme '{scheme}'",
                self.base_url
            ))),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_in_secs)
    }
}

fn default_base_url() -> String {
    "http://localhost:9090".to_string()
}
fn default_request_timeout_in_secs() -> u64 {
    60
}
fn default_max_idle_conns_per_host() -> usize {
    50
}
