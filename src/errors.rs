//! Trace Gateway Error Hierarchy
//!
//! Defines the error types of the gateway, categorized by the layer that
//! produced them: client input, infrastructure (signal store, blob store,
//! serialization) and configuration.

use std::path::PathBuf;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Infrastructure-level failures (signal store, blob store, serialization)
    #[error(transparent)]
    System(#[from] SystemError),

    /// Configuration loading and validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed client input, rejected before any state is touched
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Blobstore(#[from] BlobstoreError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// HTTP listener could not be started
    #[error("Server start failed: {0}")]
    ServerStart(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No snapshot has been applied yet, so there is no database to query
    #[error("Signal store has no active database version")]
    VersionNotSet,

    /// The database backing a snapshot version could not be opened
    #[error("Failed to open database version {version} at {path}")]
    OpenVersion {
        version: String,
        path: PathBuf,
        #[source]
        source: sled::Error,
    },

    /// Embedded database errors
    #[error("Embedded database error: {0}")]
    DbError(#[from] sled::Error),

    /// A stored row could not be decoded
    #[error("Corrupt signal row for key {key}")]
    CorruptRow { key: String },

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum BlobstoreError {
    /// Configured or returned URL is malformed
    #[error("Invalid blobstore URL {0}")]
    InvalidUrl(String),

    /// Transport failure talking to the blob server or signed URL
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Blob server answered with a status other than 200/201
    #[error("Request to {uri} failed with status {status}")]
    UnexpectedStatus { uri: String, status: u16 },

    /// Blob server answered 2xx but the body was unusable
    #[error("Invalid response from blob server: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error(transparent)]
    Bincode(#[from] bincode::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("bad block value, must be number of seconds: {0}")]
    InvalidBlock(String),

    #[error("Bad value for required header X-Debug-Session-Id: {0}")]
    InvalidSessionId(String),
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::System(SystemError::Storage(e))
    }
}

impl From<sled::Error> for Error {
    fn from(e: sled::Error) -> Self {
        Error::System(SystemError::Storage(StorageError::DbError(e)))
    }
}

impl From<BlobstoreError> for Error {
    fn from(e: BlobstoreError) -> Self {
        Error::System(SystemError::Blobstore(e))
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::System(SystemError::Blobstore(BlobstoreError::Http(e)))
    }
}

impl From<SerializationError> for Error {
    fn from(e: SerializationError) -> Self {
        Error::System(SystemError::Serialization(e))
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::System(SystemError::Serialization(SerializationError::Bincode(e)))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::System(SystemError::Serialization(SerializationError::Json(e)))
    }
}
