use std::sync::Arc;

use bytes::Buf;
use futures::Stream;
use warp::reply::Response;
use warp::Filter;
use warp::Rejection;

use super::upload::upload_body;
use super::ApiManager;
use super::SignalQuery;
use crate::constants::DEBUG_SESSION_HEADER;
use crate::constants::IF_NONE_MATCH_HEADER;

/// Assembles the signal and upload routes.
///
/// Path segments come from the validated [`crate::ServerConfig`].
pub fn routes(api: Arc<ApiManager>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    let signals = with_initialized_api(api.clone())
        .and(warp::get())
        .and(warp::path(api.server.signal_path.clone()))
        .and(warp::path::end())
        .and(warp::query::<SignalQuery>())
        .and(warp::header::optional::<String>(IF_NONE_MATCH_HEADER))
        .then(get_signals_handler);

    let upload = with_initialized_api(api.clone())
        .and(warp::post())
        .and(warp::path(api.server.upload_path.clone()))
        .and(warp::path::end())
        .and(warp::header::optional::<String>(DEBUG_SESSION_HEADER))
        .and(warp::body::stream())
        .then(upload_handler);

    signals.or(upload).unify()
}

/// Rejects with `404` until the API has been initialized
fn with_initialized_api(
    api: Arc<ApiManager>
) -> impl Filter<Extract = (Arc<ApiManager>,), Error = Rejection> + Clone {
    warp::any()
        .map(move || api.clone())
        .and_then(|api: Arc<ApiManager>| async move {
            if api.is_initialized() {
                Ok(api)
            } else {
                Err(warp::reject::not_found())
            }
        })
}

async fn get_signals_handler(
    api: Arc<ApiManager>,
    query: SignalQuery,
    if_none_match: Option<String>,
) -> Response {
    api.get_signals(query.block.as_deref(), if_none_match.as_deref())
        .await
}

async fn upload_handler<S, B>(
    api: Arc<ApiManager>,
    session_id: Option<String>,
    body: S,
) -> Response
where
    S: Stream<Item = Result<B, warp::Error>> + Send + 'static,
    B: Buf,
{
    api.upload_trace(session_id.as_deref(), upload_body(body)).await
}
