use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use super::invalid;
use crate::constants::MAX_BLOCK_SECS_LIMIT;
use crate::Result;

/// What a stale or refreshed answer carries in its `signals` field
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// The complete current signal set
    #[default]
    Full,
    /// Only the signals the client does not already know
    Delta,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LongPollConfig {
    /// Upper bound for the caller supplied `block` parameter, in seconds.
    /// Larger requests are clamped to this value.
    #[serde(default = "default_max_block_secs")]
    pub max_block_secs: u64,

    #[serde(default)]
    pub response_mode: ResponseMode,
}

impl Default for LongPollConfig {
    fn default() -> Self {
        Self {
            max_block_secs: default_max_block_secs(),
            response_mode: ResponseMode::default(),
        }
    }
}

impl LongPollConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_block_secs == 0 {
            return Err(invalid(
                "long_poll.max_block_secs must be > 0, long polling would be disabled".to_string(),
            ));
        }
        if self.max_block_secs > MAX_BLOCK_SECS_LIMIT {
            return Err(invalid(format!(
                "long_poll.max_block_secs must be <= {MAX_BLOCK_SECS_LIMIT}, got {}",
                self.max_block_secs
            )));
        }
        Ok(())
    }

    /// Clamps a requested block duration to `max_block_secs`
    pub fn block_duration(
        &self,
        requested_secs: u64,
    ) -> Duration {
        Duration::from_secs(requested_secs.min(self.max_block_secs))
    }
}

fn default_max_block_secs() -> u64 {
    600
}
