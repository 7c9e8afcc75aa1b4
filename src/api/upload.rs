use std::io;

use bytes::Buf;
use futures::Stream;
use futures::StreamExt;
use tracing::debug;
use tracing::error;
use warp::http::StatusCode;
use warp::reply::Response;

use super::error_reply;
use super::status_reply;
use super::ApiErrorCode;
use super::ApiManager;
use crate::blobstore::BlobCreationMetadata;
use crate::blobstore::UploadBody;
use crate::metrics::TRACE_UPLOADS_TOTAL;

impl ApiManager {
    /// Relays one trace upload: resolves a signed URL for the session and
    /// streams `body` to it.
    pub async fn upload_trace(
        &self,
        session_id: Option<&str>,
        body: UploadBody,
    ) -> Response {
        let response = self.relay(session_id.unwrap_or_default(), body).await;
        TRACE_UPLOADS_TOTAL
            .with_label_values(&[response.status().as_str()])
            .inc();
        response
    }

    async fn relay(
        &self,
        session_id: &str,
        body: UploadBody,
    ) -> Response {
        let metadata = match BlobCreationMetadata::from_session_id(session_id) {
            Ok(metadata) => metadata,
            Err(e) => {
                return error_reply(StatusCode::BAD_REQUEST, ApiErrorCode::BadDebugHeader, e.to_string());
            }
        };

        let signed_url = match self.blobstore.get_signed_url(&metadata).await {
            Ok(url) => url,
            Err(e) => {
                error!("Unable to fetch signed upload URL: {:?}", e);
                return error_reply(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::Blobstore,
                    "Unable to fetch signed upload URL",
                );
            }
        };

        match self.blobstore.upload(&signed_url, body).await {
            Ok(status) => {
                debug!(status, session_id, "Trace upload relayed");
                match StatusCode::from_u16(status) {
                    Ok(status) => status_reply(status),
                    Err(_) => error_reply(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorCode::Blobstore,
                        format!("Blob store answered invalid status {status}"),
                    ),
                }
            }
            Err(e) => {
                error!("Unable to use signed url for upload: {:?}", e);
                error_reply(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorCode::Blobstore,
                    "Unable to use signed url for upload",
                )
            }
        }
    }
}

/// Adapts a warp request body into an [`UploadBody`]
pub fn upload_body<S, B>(body: S) -> UploadBody
where
    S: Stream<Item = Result<B, warp::Error>> + Send + 'static,
    B: Buf,
{
    body.map(|chunk| {
        chunk
            .map(|mut buf| buf.copy_to_bytes(buf.remaining()))
            .map_err(io::Error::other)
    })
    .boxed()
}
