use serde::Deserialize;
use tracing::debug;
use tracing::error;
use warp::http::StatusCode;
use warp::reply::Response;

use super::error_reply;
use super::json_reply;
use super::status_reply;
use super::ApiErrorCode;
use super::ApiManager;
use crate::distributor::WaitOutcome;
use crate::metrics::outcome;
use crate::metrics::SIGNAL_REQUESTS_TOTAL;
use crate::signal::added_signals;
use crate::signal::is_stale;
use crate::signal::KnownIds;
use crate::signal::SignalSet;
use crate::RequestError;
use crate::ResponseMode;
use crate::Result;

/// Query string of the signal endpoint
#[derive(Debug, Default, Deserialize)]
pub struct SignalQuery {
    pub block: Option<String>,
}

/// Parses the `block` parameter in seconds. Absent or empty means no
/// blocking; anything but a non-negative integer is rejected.
pub fn parse_block(block: Option<&str>) -> Result<u64> {
    match block.map(str::trim) {
        None | Some("") => Ok(0),
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| RequestError::InvalidBlock(value.to_string()).into()),
    }
}

impl ApiManager {
    /// Answers one signal request.
    ///
    /// Without known ids the current set is returned immediately. With known
    /// ids a stale view is answered at once, a fresh one with `304` unless
    /// the caller asked to block, in which case the request waits for the
    /// next change or its deadline.
    pub async fn get_signals(
        &self,
        block: Option<&str>,
        if_none_match: Option<&str>,
    ) -> Response {
        let block_secs = match parse_block(block) {
            Ok(secs) => secs,
            Err(e) => {
                record(outcome::BAD_REQUEST);
                return error_reply(StatusCode::BAD_REQUEST, ApiErrorCode::BadBlock, e.to_string());
            }
        };

        let known = match if_none_match.map(str::trim).filter(|v| !v.is_empty()) {
            Some(header) => KnownIds::parse(header),
            None => {
                debug!("No known ids, sending current signals");
                return self.send_current().await;
            }
        };

        let current = match self.source.fetch_signals().await {
            Ok(set) => set,
            Err(e) => return fetch_failed(&e.to_string()),
        };

        if is_stale(&current, &known) {
            debug!(known = known.len(), current = current.signals.len(), "Client view is stale");
            return self.send_signals(&current, &known);
        }

        let timeout = self.long_poll.block_duration(block_secs);
        if timeout.is_zero() {
            return not_modified();
        }

        debug!(block_secs = timeout.as_secs(), "Blocking request, waiting for trace signals");
        match self.distributor.register().wait(timeout).await {
            WaitOutcome::Delivered(delivery) => match &delivery.error {
                Some(reason) => fetch_failed(reason),
                None => self.send_signals(&delivery, &known),
            },
            WaitOutcome::TimedOut => {
                debug!("Long-polling request timed out");
                not_modified()
            }
        }
    }

    async fn send_current(&self) -> Response {
        match self.source.fetch_signals().await {
            Ok(set) => {
                record(outcome::OK);
                json_reply(&set)
            }
            Err(e) => fetch_failed(&e.to_string()),
        }
    }

    fn send_signals(
        &self,
        set: &SignalSet,
        known: &KnownIds,
    ) -> Response {
        record(outcome::OK);
        match self.long_poll.response_mode {
            ResponseMode::Full => json_reply(set),
            ResponseMode::Delta => {
                let added = added_signals(set, known).into_iter().cloned().collect();
                json_reply(&SignalSet::new(added))
            }
        }
    }
}

fn not_modified() -> Response {
    record(outcome::NOT_MODIFIED);
    status_reply(StatusCode::NOT_MODIFIED)
}

fn fetch_failed(reason: &str) -> Response {
    error!("Fetching trace signals failed: {}", reason);
    record(outcome::ERROR);
    error_reply(StatusCode::INTERNAL_SERVER_ERROR, ApiErrorCode::DbError, reason)
}

fn record(outcome: &str) {
    SIGNAL_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
}
