use async_trait::async_trait;
use reqwest::header;
use reqwest::redirect;
use reqwest::Client;
use reqwest::Method;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::Url;
use tracing::debug;
use tracing::warn;

use super::BlobCreationMetadata;
use super::BlobServerResponse;
use super::BlobstoreClient;
use super::UploadBody;
use crate::constants::BLOB_STORE_URI;
use crate::constants::MAX_BLOB_REDIRECTS;
use crate::BlobstoreConfig;
use crate::BlobstoreError;
use crate::Result;

const OCTET_STREAM: &str = "application/octet-stream";

/// [`BlobstoreClient`] over a pooled reqwest client
pub struct ReqwestBlobstoreClient {
    client: Client,
    blobs_url: Url,
    bearer_token: String,
}

impl ReqwestBlobstoreClient {
    pub fn new(config: &BlobstoreConfig) -> Result<Self> {
        let mut blobs_url = config.parsed_base_url()?;
        let path = format!("{}{}", blobs_url.path().trim_end_matches('/'), BLOB_STORE_URI);
        blobs_url.set_path(&path);

        // Blob creation redirects are followed in `create_blob`, with the bearer token
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .timeout(config.request_timeout())
            .pool_max_idle_per_host(config.max_idle_conns_per_host)
            .build()?;

        Ok(Self {
            client,
            blobs_url,
            bearer_token: config.bearer_token.clone(),
        })
    }

    /// Blob creation endpoint, `<base_url>/blobs`
    pub fn blobs_url(&self) -> &Url {
        &self.blobs_url
    }
}

impl ReqwestBlobstoreClient {
    /// Sends the blob creation request, re-sending it with the bearer token
    /// to every redirect target. Returns the final URL and its response.
    ///
    /// 307/308 replay the POST; 301/302/303 continue with a GET.
    async fn create_blob(
        &self,
        metadata: &BlobCreationMetadata,
    ) -> Result<(Url, Response)> {
        let mut url = self.blobs_url.clone();
        let mut method = Method::POST;

        for _ in 0..=MAX_BLOB_REDIRECTS {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .bearer_auth(&self.bearer_token);
            if method == Method::POST {
                request = request.json(metadata);
            }
            let response = request.send().await?;

            let status = response.status();
            if !status.is_redirection() {
                return Ok((url, response));
            }

            let next = redirect_target(&url, &response).ok_or_else(|| BlobstoreError::UnexpectedStatus {
                uri: url.to_string(),
                status: status.as_u16(),
            })?;
            debug!(from = %url, to = %next, status = status.as_u16(), "Following blob server redirect");

            if matches!(
                status,
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
            ) {
                method = Method::GET;
            }
            url = next;
        }

        warn!(uri = %self.blobs_url, "Too many blob server redirects");
        Err(BlobstoreError::InvalidResponse(format!(
            "{}: more than {MAX_BLOB_REDIRECTS} redirects",
            self.blobs_url
        ))
        .into())
    }
}

/// Resolves the `Location` of a redirect against the URL that answered it
fn redirect_target(
    from: &Url,
    response: &Response,
) -> Option<Url> {
    let location = response.headers().get(header::LOCATION)?.to_str().ok()?;
    from.join(location).ok()
}

fn is_accepted(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::CREATED
}

#[async_trait]
impl BlobstoreClient for ReqwestBlobstoreClient {
    async fn get_signed_url(
        &self,
        metadata: &BlobCreationMetadata,
    ) -> Result<String> {
        let (url, response) = self.create_blob(metadata).await?;
        let uri = url.as_str();

        let status = response.status();
        if !is_accepted(status) {
            warn!(uri, status = status.as_u16(), "Blob creation rejected");
            return Err(BlobstoreError::UnexpectedStatus {
                uri: uri.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await?;
        let blob: BlobServerResponse = serde_json::from_slice(&body).map_err(|e| {
            BlobstoreError::InvalidResponse(format!("{uri}: {e}"))
        })?;
        if blob.signed_url.is_empty() {
            return Err(BlobstoreError::InvalidResponse(format!("{uri}: empty signed url")).into());
        }

        debug!(uri, blob_id = %blob.id, "Blob created");
        Ok(blob.signed_url)
    }

    async fn upload(
        &self,
        signed_url: &str,
        body: UploadBody,
    ) -> Result<u16> {
        let url = Url::parse(signed_url)
            .map_err(|e| BlobstoreError::InvalidUrl(format!("{signed_url}: {e}")))?;

        let response = self
            .client
            .put(url)
            .header(header::CONTENT_TYPE, OCTET_STREAM)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!(status, "Trace data uploaded");
        Ok(status)
    }
}
