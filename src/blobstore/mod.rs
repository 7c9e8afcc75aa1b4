//! Blob server access for the trace upload relay.
//!
//! An upload takes two requests: a blob is created on the blob server,
//! which answers with a signed URL, and the trace data is then `PUT` to
//! that URL as-is.

mod client;
mod metadata;
pub use client::*;
pub use metadata::*;


use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
#[cfg(test)]
use mockall::automock;

use crate::Result;

/// Request body relayed to the signed URL
pub type UploadBody = BoxStream<'static, io::Result<Bytes>>;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlobstoreClient: Send + Sync + 'static {
    /// Creates a blob described by `metadata` and returns its signed upload URL
    async fn get_signed_url(
        &self,
        metadata: &BlobCreationMetadata,
    ) -> Result<String>;

    /// Streams `body` to `signed_url`, returning the blob store's status code
    async fn upload(
        &self,
        signed_url: &str,
        body: UploadBody,
    ) -> Result<u16>;
}
