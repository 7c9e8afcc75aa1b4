use std::net::SocketAddr;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::Result;

/// HTTP surface of the gateway
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Address the API server binds to
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,

    /// Path segment of the trace signal endpoint
    #[serde(default = "default_signal_path")]
    pub signal_path: String,

    /// Path segment of the trace upload endpoint
    #[serde(default = "default_upload_path")]
    pub upload_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            signal_path: default_signal_path(),
            upload_path: default_upload_path(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        validate_segment("signal_path", &self.signal_path)?;
        validate_segment("upload_path", &self.upload_path)?;

        if self.signal_path == self.upload_path {
            return Err(invalid(format!(
                "signal_path and upload_path must differ, both are '{}'",
                self.signal_path
            )));
        }
        Ok(())
    }
}

/// Endpoint paths are mounted as a single warp path segment
fn validate_segment(
    name: &str,
    value: &str,
) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(format!("{name} cannot be empty")));
    }
    if value.contains('/') {
        return Err(invalid(format!(
            "{name} '{value}' must be a single path segment without '/'"
        )));
    }
    Ok(())
}

fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 9000))
}
fn default_signal_path() -> String {
    "tracesignals".to_string()
}
fn default_upload_path() -> String {
    "uploadtrace".to_string()
}
