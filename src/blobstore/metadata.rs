use serde::Deserialize;
use serde::Serialize;

use crate::constants::SESSION_ID_COMPONENTS;
use crate::constants::SESSION_ID_SEPARATOR;
use crate::RequestError;
use crate::Result;

/// Body of the blob creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobCreationMetadata {
    pub customer: String,
    pub environment: String,
    pub organization: String,
    pub tags: Vec<String>,
}

impl BlobCreationMetadata {
    /// Parses a debug session id of the form
    /// `customer__environment__app__revision__sessionTag`.
    ///
    /// The organization mirrors the customer; tags are the session tag and
    /// the full session id.
    pub fn from_session_id(session_id: &str) -> Result<Self> {
        let components: Vec<&str> = session_id.split(SESSION_ID_SEPARATOR).collect();
        if session_id.is_empty() || components.len() != SESSION_ID_COMPONENTS {
            return Err(RequestError::InvalidSessionId(session_id.to_string()).into());
        }

        Ok(Self {
            customer: components[0].to_string(),
            environment: components[1].to_string(),
            organization: components[0].to_string(),
            tags: vec![components[4].to_string(), session_id.to_string()],
        })
    }
}

/// Blob server answer to a blob creation request
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BlobServerResponse {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "signedurl")]
    pub signed_url: String,
}
