#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Poll {
    /// Poll cycle length in seconds.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub interval: Duration,

    /// Upper bound on a single device probe.
    #[serde_as(as = "serde_with::DurationSeconds")]
    pub probe_timeout: Duration,

    /// Maximum number of probes in flight per cycle.
    pub max_in_flight: usize,
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            probe_timeout: Duration::from_secs(5),
            max_in_flight: 20,
        }
    }
}
