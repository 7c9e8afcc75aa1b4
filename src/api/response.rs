use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::error;
use warp::http::header::CONTENT_TYPE;
use warp::http::HeaderValue;
use warp::http::StatusCode;
use warp::hyper::Body;
use warp::reply::Response;
use warp::Reply;

/// `errorCode` values of error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorCode {
    BadBlock = 1,
    DbError = 2,
    BadDataMarshall = 3,
    BadDebugHeader = 4,
    Blobstore = 5,
}

/// Body of every 4xx/5xx answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: u8,
    pub reason: String,
}

pub fn error_reply(
    status: StatusCode,
    code: ApiErrorCode,
    reason: impl Into<String>,
) -> Response {
    let body = ErrorResponse {
        error_code: code as u8,
        reason: reason.into(),
    };
    debug!(status = status.as_u16(), reason = %body.reason, "Sending error to client");
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

/// `200` with `value` encoded as JSON, or a `500` when encoding fails
pub fn json_reply<T: Serialize>(value: &T) -> Response {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut response = Response::new(Body::from(body));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            error!("unable to marshal response: {:?}", e);
            error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorCode::BadDataMarshall,
                e.to_string(),
            )
        }
    }
}

/// Empty body answer
pub fn status_reply(status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply(), status).into_response()
}
