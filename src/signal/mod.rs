//! Trace signal data model and staleness detection.
//!
//! A [`Signal`] describes one active debug capture session. Clients cache the
//! ids of the signals they know about and send them back as a comma separated
//! validator ([`KnownIds`]); [`is_stale`] decides whether that cached view
//! still matches the current [`SignalSet`].

mod diff;
pub use diff::*;


use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

/// One active trace/debug session. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub location: String,
    pub method: String,
}

impl Signal {
    pub fn new(
        id: impl Into<String>,
        location: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            location: location.into(),
            method: method.into(),
        }
    }
}

/// Snapshot of the signal table exchanged between the signal source, the
/// distributor and the HTTP layer.
///
/// A set with `error` populated is unusable and must never be read as
/// "no signals".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SignalSet {
    pub signals: Vec<Signal>,
    pub error: Option<String>,
}

impl SignalSet {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self {
            signals,
            error: None,
        }
    }

    /// A snapshot whose fetch failed
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            signals: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.signals.iter().map(|s| s.id.as_str()).collect()
    }
}

/// Signal ids a client already holds, parsed from its comma separated
/// cache validator.
///
/// Entries are trimmed; blank entries are skipped and duplicates collapse.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KnownIds(HashSet<String>);

impl KnownIds {
    pub fn parse(csv: &str) -> Self {
        Self(
            csv.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(
        &self,
        id: &str,
    ) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl std::str::FromStr for KnownIds {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}
