#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::{path::PathBuf, time::Duration};

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Persistence {
    /// Optional path to the ledger snapshot file.
    ///
    /// `None` means the ledger is kept in memory only.
    pub state_path: Option<PathBuf>,

    /// Autosave interval in seconds (`None` disables periodic saves).
    #[serde_as(as = "Option<serde_with::DurationSeconds>")]
    pub autosave_interval: Option<Duration>,

    pub save_on_shutdown: bool,
}

impl Default for Persistence {
    fn default() -> Self {
        Self {
            state_path: None,
            autosave_interval: Some(Duration::from_secs(300)),
            save_on_shutdown: true,
        }
    }
}
